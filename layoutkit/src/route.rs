//! Route path helpers.
//!
//! Route templates use `:name` placeholders. Placeholder names may be dotted
//! (`:user.name`) to address nested response fields; router libraries that do
//! not accept dots get the slugged form (`:user_name`) from
//! [`safe_slugged_route`] and turn matched params back into a nested object
//! with [`nest_slugged_params`].

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::{Map, Value};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":([a-zA-Z0-9_.]+)").unwrap_or_else(|e| panic!("placeholder pattern: {e}"))
});

const SLUG_SEPARATOR: &str = "_";

/// Follow a dot-path through nested objects and arrays.
pub fn lookup<'a>(source: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(source, |cur, part| match cur {
        Value::Object(m) => m.get(part),
        Value::Array(a) => part.parse::<usize>().ok().and_then(|i| a.get(i)),
        _ => None,
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Substitute `:name` placeholders in `template` from `params`.
///
/// With `named_payload_path`, parameters are read from the value at that
/// dot-path inside `params` (the whole of `params` if the path is absent).
/// A placeholder is looked up first as a dot-path, then as a flat key.
/// Placeholders without a scalar value are left untouched.
pub fn resolve_dynamic_path(template: &str, params: &Value, named_payload_path: Option<&str>) -> String {
    let source = named_payload_path
        .and_then(|p| lookup(params, p))
        .unwrap_or(params);

    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            lookup(source, name)
                .or_else(|| source.get(name))
                .and_then(scalar_text)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Replace dots in placeholder names with underscores: `:user.name` → `:user_name`.
pub fn safe_slugged_route(route: &str) -> String {
    PLACEHOLDER
        .replace_all(route, |caps: &Captures<'_>| format!(":{}", caps[1].replace('.', SLUG_SEPARATOR)))
        .into_owned()
}

/// Turn slugged route params back into a nested object: `{user_name: x}` → `{user: {name: x}}`.
///
/// When a shorter key already holds a scalar where a deeper key needs an
/// object, the scalar is replaced.
pub fn nest_slugged_params(flat: &Map<String, Value>) -> Value {
    let mut nested = Map::new();
    for (key, value) in flat {
        let parts: Vec<&str> = key.split(SLUG_SEPARATOR).collect();
        insert_at(&mut nested, &parts, value.clone());
    }
    Value::Object(nested)
}

fn insert_at(root: &mut Map<String, Value>, keys: &[&str], value: Value) {
    let Some((last, parents)) = keys.split_last() else {
        return;
    };
    let mut cur = root;
    for part in parents {
        let slot = cur
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        cur = match slot {
            Value::Object(m) => m,
            _ => return,
        };
    }
    cur.insert(last.to_string(), value);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub title: String,
    pub path: String,
}

/// One crumb per path segment, titled with the capitalized segment.
pub fn breadcrumbs(path: &str) -> Vec<Breadcrumb> {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    (0..parts.len())
        .map(|i| {
            let part = parts[i];
            let mut chars = part.chars();
            let title = match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect(),
                None => String::new(),
            };
            Breadcrumb {
                title,
                path: format!("/{}", parts[..=i].join("/")),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_resolve_dynamic_path() {
        let res = json!({"data": {"id": 7, "user": {"name": "ann"}}});
        assert_eq!(
            resolve_dynamic_path("/users/:id/:user.name", &res, Some("data")),
            "/users/7/ann"
        );
        assert_eq!(resolve_dynamic_path("/users/:id", &json!({"id": "x"}), None), "/users/x");
        // missing params keep the placeholder
        assert_eq!(resolve_dynamic_path("/users/:id", &json!({}), None), "/users/:id");
        // unknown payload path falls back to the whole response
        assert_eq!(resolve_dynamic_path("/u/:id", &json!({"id": 1}), Some("nope")), "/u/1");
    }

    #[test]
    fn test_slugs() {
        assert_eq!(safe_slugged_route("/users/:user.name/edit"), "/users/:user_name/edit");

        let flat = json!({"user_name": "x", "user_id": 2, "page": "1"});
        assert_eq!(
            nest_slugged_params(flat.as_object().unwrap()),
            json!({"user": {"name": "x", "id": 2}, "page": "1"})
        );
    }

    #[test]
    fn test_breadcrumbs() {
        let crumbs = breadcrumbs("/admin/users/");
        assert_eq!(
            crumbs,
            vec![
                Breadcrumb {
                    title: "Admin".into(),
                    path: "/admin".into()
                },
                Breadcrumb {
                    title: "Users".into(),
                    path: "/admin/users".into()
                },
            ]
        );
        assert!(breadcrumbs("/").is_empty());
    }
}
