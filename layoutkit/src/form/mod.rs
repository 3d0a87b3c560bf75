//! Form schema compiler.
//!
//! Turns a list of [`FieldSchema`] into a tree of [`CompiledField`]s bound to
//! dot-joined full names (`address.city`, `items.0.sku`), derives validation
//! rules, and handles value flattening and submission.
//!
//! ## Modules
//!
//! - [`path`] - Field paths
//! - [`rules`] - Validation rules
//! - [`compile`] - Field tree compilation
//! - [`submit`] - Posting values and resolving the success redirect

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    error::SchemaError,
    model::{Dispatch, FormSchema, Properties},
};

pub mod compile;
pub mod path;
pub mod rules;
pub mod submit;

pub use compile::{CompiledField, GroupField, LeafField, RepeatGroup};
pub use path::{FieldPath, PathSegment};
pub use rules::{ValidationRule, rules_for};
pub use submit::{SubmitError, SubmitOutcome};

/// Per-field messages from failed validation rules, keyed by full name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(pub BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Form values keyed by full field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Submission(BTreeMap<String, Value>);

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Submission {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Value at `path` inside a nested value object.
fn value_at<'a>(values: &'a Properties, path: &FieldPath) -> Option<&'a Value> {
    let (PathSegment::Key(first), rest) = path.segments().split_first()? else {
        return None;
    };
    rest.iter().try_fold(values.get(first)?, |v, seg| match seg {
        PathSegment::Key(k) => v.get(k.as_str()),
        PathSegment::Index(i) => v.get(*i),
    })
}

fn set_at(slot: &mut Value, segments: &[PathSegment], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *slot = value;
        return;
    };

    match head {
        PathSegment::Key(k) => {
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(m) = slot {
                set_at(m.entry(k.clone()).or_insert(Value::Null), rest, value);
            }
        }
        PathSegment::Index(i) => {
            if !slot.is_array() {
                *slot = Value::Array(Vec::new());
            }
            if let Value::Array(items) = slot {
                if items.len() <= *i {
                    items.resize(*i + 1, Value::Null);
                }
                set_at(&mut items[*i], rest, value);
            }
        }
    }
}

/// A compiled form ready for display, validation and submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledForm {
    pub fields: Vec<CompiledField>,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<Dispatch>,
}

impl CompiledForm {
    /// Compile `schema` using each field's own `value` as its initial value.
    pub fn compile(schema: &FormSchema) -> Result<Self, SchemaError> {
        Self::compile_with_values(schema, None)
    }

    /// Compile `schema` seeded with a nested value object.
    pub fn compile_with_values(schema: &FormSchema, values: Option<&Properties>) -> Result<Self, SchemaError> {
        Ok(Self {
            fields: compile::compile_with_values(&schema.fields, &FieldPath::root(), values)?,
            action: schema.action.clone(),
            dispatch: schema.dispatch.clone(),
        })
    }

    pub fn leaves(&self) -> Vec<&LeafField> {
        compile::leaves(&self.fields)
    }

    /// Leaf with the given full name.
    pub fn field(&self, full_name: &str) -> Option<&LeafField> {
        self.leaves().into_iter().find(|l| l.full_name() == full_name)
    }

    /// Repeat group with the given full name.
    pub fn repeat_mut(&mut self, full_name: &str) -> Option<&mut RepeatGroup> {
        compile::find_repeat_mut(&mut self.fields, full_name)
    }

    /// Initial values of every leaf that has one.
    pub fn initial_values(&self) -> Submission {
        self.leaves()
            .into_iter()
            .filter_map(|l| l.initial_value.clone().map(|v| (l.full_name(), v)))
            .collect()
    }

    /// Read each leaf's value from a nested value object.
    ///
    /// Values are looked up along the leaf paths, so an object held by a leaf
    /// (a lookup selection, say) stays whole. Repeat rows are those of the
    /// compiled form; values outside any leaf are ignored.
    pub fn values_from(&self, nested: &Properties) -> Submission {
        self.leaves()
            .into_iter()
            .filter_map(|l| value_at(nested, &l.path).map(|v| (l.full_name(), v.clone())))
            .collect()
    }

    /// Rebuild the nested value object from `values`, one leaf at a time.
    /// Names that match no leaf are dropped.
    pub fn to_nested(&self, values: &Submission) -> Value {
        let mut root = Value::Object(Map::new());
        for leaf in self.leaves() {
            if let Some(value) = values.get(&leaf.full_name()) {
                set_at(&mut root, leaf.path.segments(), value.clone());
            }
        }
        root
    }

    /// Run every leaf's rules against `values`.
    ///
    /// # Errors
    ///
    /// Returns all failing messages grouped by full name.
    pub fn validate(&self, values: &Submission) -> Result<(), ValidationErrors> {
        let mut errors = BTreeMap::new();
        for leaf in self.leaves() {
            let name = leaf.full_name();
            let value = values.get(&name);
            let messages: Vec<String> = leaf
                .rules
                .iter()
                .filter_map(|r| r.check(value).err())
                .map(str::to_string)
                .collect();
            if !messages.is_empty() {
                errors.insert(name, messages);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}
