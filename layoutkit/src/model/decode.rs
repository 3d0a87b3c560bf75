//! Document decoders.
//!
//! Documents are JSON or TOML, chosen by file extension. TOML content is
//! converted to JSON before decoding so both formats go through the same
//! serde model.

use std::{fs, path::Path};

use anyhow::Context;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    error::SchemaError,
    model::descriptor::{ComponentDescriptor, Properties, UiNode},
};

/// One region of a layout document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LayoutSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<UiNode>,
}

/// Content region, which must carry a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ContentSlot {
    pub meta: UiNode,
}

/// Page layout with optional header, sider and footer around a content node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LayoutDocument {
    /// Layout flavour, passed to the root node as `properties.type`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<LayoutSlot>,
    pub content: ContentSlot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sider: Option<LayoutSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<LayoutSlot>,
}

impl LayoutDocument {
    /// Flatten into a `layout` node with header, sider, content and footer children.
    pub fn into_root(self) -> ComponentDescriptor {
        let mut properties = Properties::new();
        properties.insert("type".into(), Value::String(self.kind));

        let mut root = ComponentDescriptor::new("layout").with_properties(properties);
        let slots = [
            self.header.and_then(|s| s.meta),
            self.sider.and_then(|s| s.meta),
            Some(self.content.meta),
            self.footer.and_then(|s| s.meta),
        ];
        root.children.extend(slots.into_iter().flatten());
        root
    }
}

/// Decode a root node from either a layout document or a bare node.
///
/// A value is treated as a layout document when it has a `type` key and an
/// object-valued `content` key.
pub fn decode_root(value: Value) -> Result<UiNode, SchemaError> {
    let is_layout_doc = value.get("type").is_some() && value.get("content").is_some_and(Value::is_object);
    if is_layout_doc {
        let doc: LayoutDocument =
            serde_json::from_value(value).map_err(|e| SchemaError::decode("layout", e))?;
        return Ok(UiNode::Descriptor(doc.into_root()));
    }
    UiNode::from_value(value, "root")
}

/// Parse document text into JSON according to `ext`.
pub fn parse_value(content: &str, ext: &str) -> Result<Value, SchemaError> {
    let value = match ext {
        "json" => serde_json::from_str(content)?,
        "toml" | "tml" => {
            let v: toml::Value = toml::from_str(content)?;
            serde_json::to_value(v)?
        }
        _ => {
            return Err(SchemaError::Unsupported {
                ext: ext.to_string(),
            });
        }
    };
    Ok(value)
}

/// Parse and decode document text.
pub fn from_str<T: DeserializeOwned>(content: &str, ext: &str) -> Result<T, SchemaError> {
    let value = parse_value(content, ext)?;
    serde_json::from_value(value).map_err(|e| SchemaError::decode("", e))
}

/// Read a document file as JSON.
pub fn read_value(path: impl AsRef<Path>) -> anyhow::Result<Value> {
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let value = parse_value(&content, ext).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(value)
}

/// Read and decode a document file.
pub fn load<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let value = read_value(path)?;
    let doc = serde_json::from_value(value)
        .with_context(|| format!("Invalid document {}", path.display()))?;
    Ok(doc)
}

/// Read a root node file, see [`decode_root`].
pub fn load_root(path: impl AsRef<Path>) -> anyhow::Result<UiNode> {
    let path = path.as_ref();
    let value = read_value(path)?;
    let node = decode_root(value).with_context(|| format!("Invalid layout {}", path.display()))?;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::field::FormSchema;

    #[test]
    fn test_layout_document_into_root() {
        let node = decode_root(json!({
            "type": "default",
            "header": {"meta": {"name": "header", "isMenuItem": false}},
            "content": {"meta": {"component": "Dashboard", "path": "/home"}},
            "footer": {}
        }))
        .unwrap();

        let root = node.to_descriptor();
        assert_eq!(root.name, "layout");
        assert_eq!(root.property("type"), Some(&json!("default")));
        let names: Vec<_> = root
            .children
            .iter()
            .map(|c| c.to_descriptor().name.clone())
            .collect();
        assert_eq!(names, ["header", "Dashboard"]);
    }

    #[test]
    fn test_layout_document_is_exact() {
        let err = decode_root(json!({
            "type": "default",
            "content": {"meta": {"name": "content"}},
            "aside": {}
        }));
        assert!(err.is_err());
    }

    #[test]
    fn test_bare_descriptor_with_string_content() {
        let node = decode_root(json!({"type": "text", "content": "hi"})).unwrap();
        assert_eq!(node.to_descriptor().content.as_deref(), Some("hi"));
    }

    #[test]
    fn test_toml_form() {
        let form: FormSchema = from_str(
            r#"
action = "/api/users"

[[fields]]
name = "email"
label = "Email"
inputType = "input"
required = true
"#,
            "toml",
        )
        .unwrap();
        assert_eq!(form.action, "/api/users");
        assert_eq!(form.fields[0].name, "email");
        assert!(form.fields[0].required);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = parse_value("x: 1", "yaml").unwrap_err();
        assert!(matches!(err, SchemaError::Unsupported { .. }));
    }
}
