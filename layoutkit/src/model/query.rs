use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One `field <operator> value` condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchCondition {
    pub field: String,
    pub operator: String,
    pub value: Value,
}

impl SearchCondition {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value,
        }
    }
}

/// Flat conjunction of conditions, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchQuery {
    #[serde(default)]
    pub and: Vec<SearchCondition>,
}

impl SearchQuery {
    pub fn condition(&self, field: &str) -> Option<&SearchCondition> {
        self.and.iter().find(|c| c.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.and.is_empty()
    }
}
