use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::SchemaError, model::descriptor::Properties};

/// Input widget kind of a form field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Input,
    Password,
    Number,
    Select,
    TreeSelect,
    Switch,
    Date,
    Textarea,
    /// Nested group, fields under `properties.fields`.
    Object,
    /// Repeated group, item fields under `properties.itemFields`.
    #[serde(rename = "object[]")]
    ObjectArray,
    Checkbox,
    NestedCheckbox,
    Lookup,
    Button,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Input => "input",
            InputKind::Password => "password",
            InputKind::Number => "number",
            InputKind::Select => "select",
            InputKind::TreeSelect => "treeselect",
            InputKind::Switch => "switch",
            InputKind::Date => "date",
            InputKind::Textarea => "textarea",
            InputKind::Object => "object",
            InputKind::ObjectArray => "object[]",
            InputKind::Checkbox => "checkbox",
            InputKind::NestedCheckbox => "nestedcheckbox",
            InputKind::Lookup => "lookup",
            InputKind::Button => "button",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of one form or detail field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    /// Field name, addressable by dot-path inside nested groups.
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "inputType", alias = "inputKind", default)]
    pub input_kind: InputKind,
    #[serde(default)]
    pub required: bool,
    /// Sort key, `0` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
    /// Kind specific configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    /// Initial value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, input_kind: InputKind) -> Self {
        Self {
            name: name.into(),
            input_kind,
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn order_key(&self) -> f64 {
        self.order.unwrap_or(0.0)
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|p| p.get(key))
    }

    /// Decode the nested field list stored at `properties.<key>`.
    ///
    /// `path` is only used for error reporting.
    pub fn nested_fields(&self, key: &'static str, path: &str) -> Result<Vec<FieldSchema>, SchemaError> {
        let raw = self.property(key).ok_or_else(|| SchemaError::MissingNested {
            path: path.to_string(),
            key,
        })?;
        serde_json::from_value(raw.clone()).map_err(|e| SchemaError::decode(format!("{path}.{key}"), e))
    }
}

/// Stable ascending sort by `order`; ties keep their original position.
pub fn sort_by_order(fields: &mut [FieldSchema]) {
    fields.sort_by(|a, b| a.order_key().total_cmp(&b.order_key()));
}

/// Where to go after a successful submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedirectTarget {
    /// Registered component whose path is used as the template.
    pub component: String,
    /// Dot-path into the response used as the parameter source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_name_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dispatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success_redirect_to: Option<RedirectTarget>,
}

/// A form: its fields and the endpoint values are posted to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub fields: Vec<FieldSchema>,
    #[serde(default)]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<Dispatch>,
}
