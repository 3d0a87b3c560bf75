use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use layoutkit::{
    Properties,
    filter::SearchSession,
    model::{TableSchema, decode},
};
use serde_json::Value;

use crate::{commands::to_pretty, ctx::AppContext};

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Table schema (.json or .toml)
    pub file: PathBuf,
    /// Search form change, applied in order. The value is read as JSON when it parses
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, Value)>,
    /// Post the resulting query to the table's data source
    #[arg(long)]
    pub fetch: bool,
}

/// Parse a `key=value` pair. `value` becomes a JSON value when it parses as
/// one, otherwise a string.
pub fn parse_assignment(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{s}`"));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Apply `changes` one by one, returning the keys that did not affect the query.
pub fn apply_all(session: &mut SearchSession, changes: &[(String, Value)]) -> Vec<String> {
    let mut ignored = Vec::new();
    for (key, value) in changes {
        let mut changed = Properties::new();
        changed.insert(key.clone(), value.clone());
        if !session.apply(&changed) {
            ignored.push(key.clone());
        }
    }
    ignored
}

pub async fn run(ctx: &AppContext, args: FilterArgs) -> anyhow::Result<()> {
    let table: TableSchema = decode::load(ctx.resolve(&args.file))?;
    let mut session = SearchSession::new(table);

    println!("{}", "Search fields".bold().green());
    for field in session.search_fields() {
        println!("  {} ({})", field.name.cyan(), field.input_kind);
    }

    for key in apply_all(&mut session, &args.set) {
        warn!("'{key}' left the query unchanged, not a filterable column?");
    }
    println!("{}", to_pretty(session.query())?);

    if args.fetch {
        let transport = ctx.transport()?;
        let rows = session.search(&transport).await;
        println!("{}", format!("{} rows", rows.len()).bold().green());
        println!("{}", to_pretty(&rows)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("name=ada").unwrap(), ("name".into(), json!("ada")));
        assert_eq!(parse_assignment("age=42").unwrap(), ("age".into(), json!(42)));
        assert_eq!(parse_assignment("active=true").unwrap(), ("active".into(), json!(true)));
        assert_eq!(parse_assignment("name=").unwrap(), ("name".into(), json!("")));
        assert_eq!(parse_assignment("q=a=b").unwrap(), ("q".into(), json!("a=b")));
        assert!(parse_assignment("name").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_apply_all() {
        let table: TableSchema = serde_json::from_value(json!({
            "dataSourceUrl": "/users/search",
            "columns": [
                {"dataIndex": "name", "title": "Name", "filterable": {"apply": true, "operator": "like"}},
                {"dataIndex": "email", "title": "Email"}
            ]
        }))
        .unwrap();
        let mut session = SearchSession::new(table);

        let ignored = apply_all(
            &mut session,
            &[("name".into(), json!("ada")), ("email".into(), json!("a@b.c"))],
        );
        assert_eq!(ignored, ["email"]);

        let condition = session.query().condition("name").unwrap();
        assert_eq!(condition.operator, "like");
        assert_eq!(condition.value, json!("ada"));

        apply_all(&mut session, &[("name".into(), json!(""))]);
        assert!(session.query().is_empty());
    }
}
