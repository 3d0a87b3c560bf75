//! Filter query compiler.
//!
//! Table columns that opt into filtering produce a search form. Edits from that
//! form are folded into a flat [`SearchQuery`]: one condition per remote field,
//! replaced on every edit and removed when the value is cleared.

use serde_json::Value;

use crate::{
    model::{ColumnSchema, FieldSchema, FormSchema, InputKind, Properties, SearchCondition, SearchQuery, TableSchema},
    transport::{self, Transport},
};

/// Operator used when a column does not declare one.
pub const DEFAULT_OPERATOR: &str = "eq";

/// One search field per filterable column, in column order.
pub fn derive_search_fields(columns: &[ColumnSchema]) -> Vec<FieldSchema> {
    columns
        .iter()
        .filter_map(|col| {
            let filter = col.active_filter()?;
            Some(
                FieldSchema::new(&col.data_index, filter.input_kind.unwrap_or(InputKind::Input))
                    .with_label(&col.title),
            )
        })
        .collect()
}

/// The search form shown above a table. It has no action of its own.
pub fn search_form(columns: &[ColumnSchema]) -> FormSchema {
    FormSchema {
        fields: derive_search_fields(columns),
        action: String::new(),
        dispatch: None,
    }
}

fn is_cleared(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Fold `changed` (search field name to new value) into `current`.
///
/// Keys that do not belong to a filterable column are ignored. For the others
/// the condition on `searchFieldKey` (or `dataIndex`) is replaced by the new
/// value with the column's operator, or removed when the value is null or an
/// empty string.
pub fn apply_change(current: &SearchQuery, changed: &Properties, columns: &[ColumnSchema]) -> SearchQuery {
    let mut conditions = current.and.clone();

    for (key, value) in changed {
        let Some((col, filter)) = columns
            .iter()
            .filter(|c| c.data_index == *key)
            .find_map(|c| c.active_filter().map(|f| (c, f)))
        else {
            continue;
        };

        let field = filter.search_field_key.as_deref().unwrap_or(&col.data_index);
        let operator = filter.operator.as_deref().unwrap_or(DEFAULT_OPERATOR);

        if let Some(idx) = conditions.iter().position(|c| c.field == field) {
            conditions.remove(idx);
        }
        if !is_cleared(value) {
            conditions.push(SearchCondition::new(field, operator, value.clone()));
        }
    }

    SearchQuery { and: conditions }
}

/// Live search state of one table.
#[derive(Debug, Clone)]
pub struct SearchSession {
    table: TableSchema,
    query: SearchQuery,
}

impl SearchSession {
    pub fn new(table: TableSchema) -> Self {
        Self {
            table,
            query: SearchQuery::default(),
        }
    }

    pub fn table(&self) -> &TableSchema {
        &self.table
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn search_fields(&self) -> Vec<FieldSchema> {
        derive_search_fields(&self.table.columns)
    }

    /// Apply an edit. Returns whether the query changed, i.e. whether rows
    /// need to be fetched again.
    pub fn apply(&mut self, changed: &Properties) -> bool {
        let next = apply_change(&self.query, changed, &self.table.columns);
        if next == self.query {
            return false;
        }
        self.query = next;
        true
    }

    pub fn reset(&mut self) {
        self.query = SearchQuery::default();
    }

    /// Post the current query to the table's data source. A failed search is
    /// logged and yields no rows.
    pub async fn search<X: Transport + ?Sized>(&self, transport: &X) -> Vec<Value> {
        match transport::post::<_, Vec<Value>, _>(transport, &self.table.data_source_url, &self.query).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("search on '{}' failed: {e}", self.table.data_source_url);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        model::Filterable,
        transport::{ErrorSet, testing::StubTransport},
    };

    fn props(v: Value) -> Properties {
        v.as_object().cloned().unwrap()
    }

    fn columns() -> Vec<ColumnSchema> {
        vec![
            ColumnSchema::new("name").with_title("Name").with_filter(Filterable {
                apply: true,
                ..Default::default()
            }),
            ColumnSchema::new("status").with_title("Status").with_filter(Filterable {
                apply: true,
                input_kind: Some(InputKind::Select),
                search_field_key: Some("state".into()),
                operator: Some("in".into()),
            }),
            ColumnSchema::new("email").with_filter(Filterable::default()),
            ColumnSchema::new("created"),
        ]
    }

    #[test]
    fn test_derive_search_fields() {
        let fields = derive_search_fields(&columns());
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "name");
        assert_eq!(fields[0].input_kind, InputKind::Input);
        assert_eq!(fields[1].label, "Status");
        assert_eq!(fields[1].input_kind, InputKind::Select);
        assert!(search_form(&columns()).action.is_empty());
    }

    #[test]
    fn test_end_to_end() {
        let cols: Vec<ColumnSchema> =
            serde_json::from_value(json!([{"dataIndex": "name", "filterable": {"apply": true}}])).unwrap();

        let q = apply_change(&SearchQuery::default(), &props(json!({"name": "john"})), &cols);
        assert_eq!(
            serde_json::to_value(&q).unwrap(),
            json!({"and": [{"field": "name", "operator": "eq", "value": "john"}]})
        );

        let q = apply_change(&q, &props(json!({"name": ""})), &cols);
        assert_eq!(serde_json::to_value(&q).unwrap(), json!({"and": []}));
    }

    #[test]
    fn test_replace_not_append() {
        let cols = columns();
        let q = apply_change(&SearchQuery::default(), &props(json!({"status": "active"})), &cols);
        let q = apply_change(&q, &props(json!({"status": "inactive"})), &cols);
        assert_eq!(q.and.len(), 1);
        let c = q.condition("state").unwrap();
        assert_eq!(c.value, json!("inactive"));
        assert_eq!(c.operator, "in");
    }

    #[test]
    fn test_unknown_and_inactive_keys_ignored() {
        let q = apply_change(
            &SearchQuery::default(),
            &props(json!({"email": "x@y.z", "created": "2024", "bogus": 1, "name": null})),
            &columns(),
        );
        assert!(q.is_empty());
    }

    #[test]
    fn test_session_reports_changes() {
        let table = TableSchema {
            data_source_url: "/users/search".into(),
            columns: columns(),
            row_key: "id".into(),
        };
        let mut session = SearchSession::new(table);
        assert!(session.apply(&props(json!({"name": "ann"}))));
        assert!(!session.apply(&props(json!({"name": "ann"}))));
        assert!(!session.apply(&props(json!({"email": "ignored"}))));
        assert_eq!(session.search_fields().len(), 2);

        session.reset();
        assert!(session.query().is_empty());
    }

    #[tokio::test]
    async fn test_session_search() {
        let table = TableSchema {
            data_source_url: "/users/search".into(),
            columns: columns(),
            row_key: "id".into(),
        };
        let mut session = SearchSession::new(table.clone());
        session.apply(&props(json!({"name": "ann"})));

        let t = StubTransport::new().on_post("/users/search", Ok(json!([{"id": 1, "name": "ann"}])));
        assert_eq!(session.search(&t).await.len(), 1);
        assert_eq!(
            t.calls()[0].2,
            Some(json!({"and": [{"field": "name", "operator": "eq", "value": "ann"}]}))
        );

        let failing = StubTransport::new().on_post("/users/search", Err(ErrorSet::single("err", "boom")));
        assert!(session.search(&failing).await.is_empty());
    }
}
