use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::field::InputKind;

/// Filter configuration of a table column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Filterable {
    #[serde(default)]
    pub apply: bool,
    /// Widget used in the search form, `input` when absent.
    #[serde(
        rename = "inputType",
        alias = "inputKind",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub input_kind: Option<InputKind>,
    /// Remote field name, `dataIndex` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_field_key: Option<String>,
    /// Comparison operator, `eq` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

/// One table column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    pub data_index: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filterable: Option<Filterable>,
}

impl ColumnSchema {
    pub fn new(data_index: impl Into<String>) -> Self {
        Self {
            data_index: data_index.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_filter(mut self, filterable: Filterable) -> Self {
        self.filterable = Some(filterable);
        self
    }

    /// Column key, falling back to `dataIndex`.
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.data_index)
    }

    /// Filter config when the column takes part in search.
    pub fn active_filter(&self) -> Option<&Filterable> {
        self.filterable.as_ref().filter(|f| f.apply)
    }
}

fn default_row_key() -> String {
    "id".to_string()
}

/// A remotely searched table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    /// Endpoint the search query is posted to.
    pub data_source_url: String,
    pub columns: Vec<ColumnSchema>,
    #[serde(default = "default_row_key")]
    pub row_key: String,
}
