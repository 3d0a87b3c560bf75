use serde::Serialize;
use serde_json::Value;

use crate::{
    error::SchemaError,
    form::{
        path::FieldPath,
        rules::{ValidationRule, rules_for},
    },
    model::{
        FieldSchema, InputKind, Properties,
        field::sort_by_order,
    },
};

/// A single input bound to a dot-joined full name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafField {
    pub path: FieldPath,
    pub name: String,
    pub label: String,
    pub input_kind: InputKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<ValidationRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

impl LeafField {
    pub fn full_name(&self) -> String {
        self.path.to_string()
    }
}

/// An `object` field: a fixed group of nested fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupField {
    pub path: FieldPath,
    pub name: String,
    pub label: String,
    pub fields: Vec<CompiledField>,
}

/// An `object[]` field: a list of repetitions of the same item fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatGroup {
    pub path: FieldPath,
    pub name: String,
    pub label: String,
    #[serde(skip)]
    item_fields: Vec<FieldSchema>,
    pub items: Vec<Vec<CompiledField>>,
}

impl RepeatGroup {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a repetition with no initial values and return its index.
    pub fn add(&mut self) -> Result<usize, SchemaError> {
        let index = self.items.len();
        let row = compile_fields(&self.item_fields, &self.path.child_index(index), &Seed::Empty)?;
        self.items.push(row);
        Ok(index)
    }

    /// Remove the repetition at `index`; later repetitions shift down so
    /// indices stay dense. Returns `false` if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.items.remove(index);

        let depth = self.path.len();
        for (i, row) in self.items.iter_mut().enumerate().skip(index) {
            reindex(row, depth, i);
        }
        true
    }
}

/// Compiled field tree node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CompiledField {
    Leaf(LeafField),
    Group(GroupField),
    Repeat(RepeatGroup),
}

impl CompiledField {
    pub fn path(&self) -> &FieldPath {
        match self {
            CompiledField::Leaf(f) => &f.path,
            CompiledField::Group(g) => &g.path,
            CompiledField::Repeat(r) => &r.path,
        }
    }

    fn path_mut(&mut self) -> &mut FieldPath {
        match self {
            CompiledField::Leaf(f) => &mut f.path,
            CompiledField::Group(g) => &mut g.path,
            CompiledField::Repeat(r) => &mut r.path,
        }
    }
}

fn reindex(fields: &mut [CompiledField], depth: usize, index: usize) {
    for field in fields {
        field.path_mut().set_index(depth, index);
        match field {
            CompiledField::Leaf(_) => {}
            CompiledField::Group(g) => reindex(&mut g.fields, depth, index),
            CompiledField::Repeat(r) => {
                for row in &mut r.items {
                    reindex(row, depth, index);
                }
            }
        }
    }
}

/// Source of initial values while compiling.
enum Seed<'a> {
    /// Use provided values, falling back to each field's own `value`.
    Values(Option<&'a Properties>),
    /// No initial values at all.
    Empty,
}

impl<'a> Seed<'a> {
    fn get(&self, field: &FieldSchema) -> Option<&'a Value> {
        match *self {
            Seed::Values(Some(values)) => values.get(&field.name),
            _ => None,
        }
    }

    fn initial(&self, field: &FieldSchema) -> Option<Value> {
        match self {
            Seed::Values(_) => self.get(field).or(field.value.as_ref()).cloned(),
            Seed::Empty => None,
        }
    }

    fn nested(&self, field: &FieldSchema) -> Seed<'a> {
        match self {
            Seed::Values(_) => Seed::Values(self.get(field).and_then(Value::as_object)),
            Seed::Empty => Seed::Empty,
        }
    }
}

/// Compile `fields` under `parent`, using each field's own `value` as its
/// initial value.
///
/// # Errors
///
/// Returns [`SchemaError`] if an `object` field lacks `properties.fields`, an
/// `object[]` field lacks `properties.itemFields`, or a nested list is malformed.
pub fn compile(fields: &[FieldSchema], parent: &FieldPath) -> Result<Vec<CompiledField>, SchemaError> {
    compile_fields(fields, parent, &Seed::Values(None))
}

/// Like [`compile`], but initial values are read from `values` (keyed by field
/// name at this level) before falling back to each field's own `value`.
/// `object[]` fields get one repetition per element of their value array.
pub fn compile_with_values(
    fields: &[FieldSchema],
    parent: &FieldPath,
    values: Option<&Properties>,
) -> Result<Vec<CompiledField>, SchemaError> {
    compile_fields(fields, parent, &Seed::Values(values))
}

fn compile_fields(fields: &[FieldSchema], parent: &FieldPath, seed: &Seed<'_>) -> Result<Vec<CompiledField>, SchemaError> {
    let mut sorted = fields.to_vec();
    sort_by_order(&mut sorted);

    sorted
        .iter()
        .map(|field| compile_field(field, parent, seed))
        .collect()
}

fn compile_field(field: &FieldSchema, parent: &FieldPath, seed: &Seed<'_>) -> Result<CompiledField, SchemaError> {
    let path = parent.child_key(&field.name);

    let compiled = match field.input_kind {
        InputKind::Object => {
            let nested = field.nested_fields("fields", &path.to_string())?;
            CompiledField::Group(GroupField {
                fields: compile_fields(&nested, &path, &seed.nested(field))?,
                path,
                name: field.name.clone(),
                label: field.label.clone(),
            })
        }
        InputKind::ObjectArray => {
            let mut item_fields = field.nested_fields("itemFields", &path.to_string())?;
            sort_by_order(&mut item_fields);

            let rows = match seed.initial(field) {
                Some(Value::Array(rows)) => rows,
                _ => Vec::new(),
            };
            let items = rows
                .iter()
                .enumerate()
                .map(|(i, row)| compile_fields(&item_fields, &path.child_index(i), &Seed::Values(row.as_object())))
                .collect::<Result<Vec<_>, _>>()?;

            CompiledField::Repeat(RepeatGroup {
                path,
                name: field.name.clone(),
                label: field.label.clone(),
                item_fields,
                items,
            })
        }
        _ => CompiledField::Leaf(LeafField {
            path,
            name: field.name.clone(),
            label: field.label.clone(),
            input_kind: field.input_kind,
            required: field.required,
            initial_value: seed.initial(field),
            rules: rules_for(field),
            properties: field.properties.clone(),
        }),
    };
    Ok(compiled)
}

/// Every leaf in the tree, depth-first in display order.
pub fn leaves(fields: &[CompiledField]) -> Vec<&LeafField> {
    let mut out = Vec::new();
    collect_leaves(fields, &mut out);
    out
}

fn collect_leaves<'a>(fields: &'a [CompiledField], out: &mut Vec<&'a LeafField>) {
    for field in fields {
        match field {
            CompiledField::Leaf(leaf) => out.push(leaf),
            CompiledField::Group(g) => collect_leaves(&g.fields, out),
            CompiledField::Repeat(r) => {
                for row in &r.items {
                    collect_leaves(row, out);
                }
            }
        }
    }
}

/// Find the repeat group whose full name is `name`.
pub fn find_repeat_mut<'a>(fields: &'a mut [CompiledField], name: &str) -> Option<&'a mut RepeatGroup> {
    for field in fields {
        match field {
            CompiledField::Leaf(_) => {}
            CompiledField::Group(g) => {
                if let Some(r) = find_repeat_mut(&mut g.fields, name) {
                    return Some(r);
                }
            }
            CompiledField::Repeat(r) => {
                if r.path.to_string() == name {
                    return Some(r);
                }
                for row in &mut r.items {
                    if let Some(found) = find_repeat_mut(row, name) {
                        return Some(found);
                    }
                }
            }
        }
    }
    None
}
