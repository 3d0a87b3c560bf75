use std::borrow::Cow;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{error::SchemaError, model::renderer_config::RendererConfig};

/// Opaque property bag handed to renderers.
pub type Properties = serde_json::Map<String, Value>;

/// A node in the UI tree.
///
/// Both `name`/`properties` and the older `type`/`props` spellings are accepted
/// when decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ComponentDescriptor {
    /// Symbolic component identity.
    #[serde(alias = "type")]
    pub name: String,
    /// Optional route key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Whether the node shows up in menus.
    #[serde(default)]
    pub is_menu_item: bool,
    /// Literal text payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Payload passed to the resolved renderer.
    #[serde(default, alias = "props", skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    /// Ordered child nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<UiNode>,
}

impl ComponentDescriptor {
    /// Create a bare descriptor with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_menu_item(mut self, is_menu_item: bool) -> Self {
        self.is_menu_item = is_menu_item;
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_child(mut self, child: impl Into<UiNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Look up a single property.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|p| p.get(key))
    }

    /// Alias declared at `properties.meta.component`, tried when `name` is not bound.
    pub fn fallback_component(&self) -> Option<&str> {
        self.property("meta")?.get("component")?.as_str()
    }
}

/// Metadata block of the legacy `component` + `meta` encoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LegacyMeta {
    /// Fallback component name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Renderer properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

/// Legacy encoding where the identity lives in `component` and the payload in `meta`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LegacyDescriptor {
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub is_menu_item: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<LegacyMeta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<UiNode>,
}

impl LegacyDescriptor {
    /// Convert into the canonical shape.
    ///
    /// `meta.properties` becomes `properties`; a `meta.component` alias is kept
    /// at `properties.meta.component` so registry fallback still sees it.
    pub fn normalize(&self) -> ComponentDescriptor {
        let meta = self.meta.clone().unwrap_or_default();
        let mut properties = meta.properties;

        if let Some(alias) = meta.component {
            let props = properties.get_or_insert_with(Properties::new);
            let slot = props
                .entry("meta")
                .or_insert_with(|| Value::Object(Properties::new()));
            if let Value::Object(m) = slot {
                m.insert("component".into(), Value::String(alias));
            }
        }

        ComponentDescriptor {
            name: self.component.clone(),
            path: self.path.clone(),
            is_menu_item: self.is_menu_item,
            content: self.content.clone(),
            properties,
            children: self.children.clone(),
        }
    }
}

/// Any node accepted by the composition engine.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum UiNode {
    /// Presentation wrapper around a nested node.
    Wrapper(Box<RendererConfig>),
    /// `component` + `meta` encoding.
    Legacy(LegacyDescriptor),
    /// Canonical descriptor.
    Descriptor(ComponentDescriptor),
}

impl UiNode {
    /// Canonical descriptor for this node.
    ///
    /// Wrappers are unwrapped until a descriptor is reached; legacy nodes are
    /// normalized.
    pub fn to_descriptor(&self) -> Cow<'_, ComponentDescriptor> {
        match self {
            UiNode::Wrapper(cfg) => cfg.component_detail.to_descriptor(),
            UiNode::Legacy(legacy) => Cow::Owned(legacy.normalize()),
            UiNode::Descriptor(d) => Cow::Borrowed(d),
        }
    }

    /// Decode a node from a JSON value, reporting errors against `path`.
    pub fn from_value(value: Value, path: &str) -> Result<Self, SchemaError> {
        let Value::Object(map) = &value else {
            return Err(SchemaError::TypeMismatch {
                path: path.to_string(),
                expected: "object".to_string(),
                actual: value.to_string(),
            });
        };

        let is_wrapper = map.contains_key("componentDetail");
        let is_legacy = map.contains_key("component");

        let node = if is_wrapper {
            UiNode::Wrapper(Box::new(
                serde_json::from_value(value).map_err(|e| SchemaError::decode(path, e))?,
            ))
        } else if is_legacy {
            UiNode::Legacy(serde_json::from_value(value).map_err(|e| SchemaError::decode(path, e))?)
        } else {
            UiNode::Descriptor(
                serde_json::from_value(value).map_err(|e| SchemaError::decode(path, e))?,
            )
        };
        Ok(node)
    }
}

impl<'de> Deserialize<'de> for UiNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        UiNode::from_value(value, "").map_err(serde::de::Error::custom)
    }
}

impl From<ComponentDescriptor> for UiNode {
    fn from(value: ComponentDescriptor) -> Self {
        UiNode::Descriptor(value)
    }
}

impl From<LegacyDescriptor> for UiNode {
    fn from(value: LegacyDescriptor) -> Self {
        UiNode::Legacy(value)
    }
}

impl From<RendererConfig> for UiNode {
    fn from(value: RendererConfig) -> Self {
        UiNode::Wrapper(Box::new(value))
    }
}
