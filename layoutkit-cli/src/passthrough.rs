//! Built-in renderer that echoes its input.
//!
//! The CLI has no visual renderers; every bound component renders to
//! `{"component": <name>, "props": <properties>}` so composed trees can be
//! inspected as JSON.

use layoutkit::{ComponentMap, Properties, Renderer};
use serde_json::{Value, json};

use crate::config::AppConfig;

/// Component names bound out of the box.
pub const BUILTIN_COMPONENTS: &[&str] = &[
    // structural
    "layout",
    "header",
    "sidebar",
    "sider",
    "content",
    "footer",
    // generic
    "form",
    "table",
    "detail",
    "charts",
    "div",
    "button",
    "search",
    "switch",
    "badge",
    "dropdown",
    "avatar",
    "menu",
    "title",
    "card",
    "text",
    "link",
    // renderer components
    "ChartRenderer",
    "DetailRenderer",
    "FormRenderer",
    "TableRenderer",
    "TabRenderer",
    "PopupRenderer",
    "WrapperRenderer",
];

/// Renderer echoing `name` and the merged properties.
pub fn passthrough(name: &str) -> impl Renderer + 'static {
    let name = name.to_string();
    move |props: &Properties| json!({"component": name, "props": Value::Object(props.clone())})
}

/// Component map for `config`: built-ins, configured components, then aliases.
///
/// Aliases pointing at an unknown component are skipped with a warning.
pub fn component_map(config: &AppConfig) -> ComponentMap {
    let mut map = ComponentMap::new();
    let names = BUILTIN_COMPONENTS
        .iter()
        .copied()
        .chain(config.components.iter().map(String::as_str));
    for name in names {
        map.insert(name, passthrough(name));
    }

    for (alias, target) in &config.aliases {
        match map.get(target).cloned() {
            Some(handle) => {
                map.insert_handle(alias, handle);
            }
            None => warn!("alias '{alias}' points at unknown component '{target}'"),
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_map() {
        let mut config = AppConfig::default();
        config.components.push("UserList".into());
        config.aliases.insert("People".into(), "UserList".into());
        config.aliases.insert("Broken".into(), "Nope".into());

        let map = component_map(&config);
        assert!(map.contains("layout"));
        assert!(map.contains("UserList"));
        assert!(!map.contains("Broken"));

        let people = map.get("People").unwrap();
        assert!(people.same_as(map.get("UserList").unwrap()));

        let mut props = Properties::new();
        props.insert("a".into(), json!(1));
        assert_eq!(
            people.render(&props),
            json!({"component": "UserList", "props": {"a": 1}})
        );
    }
}
