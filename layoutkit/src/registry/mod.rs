//! Component registry.
//!
//! The registry binds symbolic component names to renderer capabilities and
//! keeps an ordered record of every registered descriptor, which is where
//! menus and routes are derived from.
//!
//! Resolution at registration time tries the descriptor `name` first, then the
//! alias declared at `properties.meta.component`. A total miss is a
//! configuration error. Lookups at render time never fail hard: a missing
//! entry is logged and reported as `None`.

use std::collections::HashMap;

use crate::{
    error::RegistryError,
    model::{ComponentDescriptor, Properties, UiNode},
};

/// Process-wide registry instance.
pub mod global;

/// Renderer capability and component map.
pub mod renderer;

pub use renderer::{ComponentMap, RenderedNode, Renderer, RendererHandle};

/// Returned by [`Registry::path_of`] for names without a path.
pub const NOT_FOUND: &str = "notFound";

/// A resolved binding between a descriptor and its renderer.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub name: String,
    pub path: Option<String>,
    pub is_menu_item: bool,
    pub content: Option<String>,
    pub properties: Option<Properties>,
    /// Renderer resolved once at registration.
    pub renderer: RendererHandle,
}

/// A routable descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Route<'a> {
    pub path: &'a str,
    pub descriptor: &'a ComponentDescriptor,
}

/// Name to renderer bindings plus the registration history.
#[derive(Debug, Default)]
pub struct Registry {
    component_map: ComponentMap,
    entries: HashMap<String, RegistryEntry>,
    all_registered: Vec<ComponentDescriptor>,
}

impl Registry {
    pub fn new(component_map: ComponentMap) -> Self {
        Self {
            component_map,
            entries: HashMap::new(),
            all_registered: Vec::new(),
        }
    }

    /// Register a descriptor and, recursively, its children in pre-order.
    ///
    /// Re-registering a name replaces the lookup entry; the earlier descriptor
    /// stays in the registration history.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unresolved`] if neither the name nor its
    /// fallback is bound. Children registered before the failure stay
    /// registered.
    pub fn register(&mut self, descriptor: &ComponentDescriptor) -> Result<(), RegistryError> {
        let renderer = self.resolve_renderer(descriptor)?;

        debug!("register component '{}'", descriptor.name);
        self.entries.insert(
            descriptor.name.clone(),
            RegistryEntry {
                name: descriptor.name.clone(),
                path: descriptor.path.clone(),
                is_menu_item: descriptor.is_menu_item,
                content: descriptor.content.clone(),
                properties: descriptor.properties.clone(),
                renderer,
            },
        );
        self.all_registered.push(descriptor.clone());

        for child in &descriptor.children {
            self.register(&child.to_descriptor())?;
        }
        Ok(())
    }

    /// Register any node shape, see [`UiNode::to_descriptor`].
    pub fn register_node(&mut self, node: &UiNode) -> Result<(), RegistryError> {
        self.register(&node.to_descriptor())
    }

    fn resolve_renderer(&self, descriptor: &ComponentDescriptor) -> Result<RendererHandle, RegistryError> {
        if let Some(r) = self.component_map.get(&descriptor.name) {
            return Ok(r.clone());
        }

        let fallback = descriptor.fallback_component();
        error!(
            "Component '{}' not found in component map, trying meta component {:?}",
            descriptor.name, fallback
        );

        fallback
            .and_then(|alias| self.component_map.get(alias))
            .cloned()
            .ok_or_else(|| RegistryError::Unresolved {
                name: descriptor.name.clone(),
                fallback: fallback.map(str::to_string),
            })
    }

    pub fn resolve(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Route path of `name`, or [`NOT_FOUND`].
    pub fn path_of(&self, name: &str) -> &str {
        self.entries
            .get(name)
            .and_then(|e| e.path.as_deref())
            .unwrap_or(NOT_FOUND)
    }

    /// Properties stored for `name` at registration.
    pub fn meta_of(&self, name: &str) -> Option<&Properties> {
        self.entries.get(name).and_then(|e| e.properties.as_ref())
    }

    /// Render `descriptor` through its bound renderer.
    ///
    /// `extra` is merged over the descriptor properties. Returns `None` and logs
    /// a warning when the name is not registered.
    pub fn render_node(
        &self,
        descriptor: &ComponentDescriptor,
        extra: Option<&Properties>,
    ) -> Option<RenderedNode> {
        let Some(entry) = self.entries.get(&descriptor.name) else {
            warn!("Component '{}' not found in registry", descriptor.name);
            return None;
        };

        let mut props = descriptor.properties.clone().unwrap_or_default();
        if let Some(extra) = extra {
            props.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        Some(RenderedNode {
            component: entry.name.clone(),
            output: entry.renderer.render(&props),
        })
    }

    /// Render each descriptor, skipping the ones that are not registered.
    pub fn render_tree(
        &self,
        descriptors: &[ComponentDescriptor],
        extra: Option<&Properties>,
    ) -> Vec<RenderedNode> {
        descriptors
            .iter()
            .filter_map(|d| self.render_node(d, extra))
            .collect()
    }

    /// Registered descriptors flagged as menu items, in registration order.
    pub fn menu_items(&self) -> Vec<&ComponentDescriptor> {
        self.all_registered.iter().filter(|d| d.is_menu_item).collect()
    }

    /// Registered descriptors that carry a path, in registration order.
    pub fn routes(&self) -> Vec<Route<'_>> {
        self.all_registered
            .iter()
            .filter_map(|d| {
                d.path.as_deref().map(|path| Route {
                    path,
                    descriptor: d,
                })
            })
            .collect()
    }

    /// First registered descriptor with the given path.
    pub fn component_by_path(&self, path: &str) -> Option<&ComponentDescriptor> {
        self.all_registered
            .iter()
            .find(|d| d.path.as_deref() == Some(path))
    }

    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    /// Every registered descriptor, duplicates included.
    pub fn all_registered(&self) -> &[ComponentDescriptor] {
        &self.all_registered
    }

    pub fn component_map(&self) -> &ComponentMap {
        &self.component_map
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn echo(tag: &'static str) -> impl Renderer {
        move |p: &Properties| json!({"tag": tag, "props": Value::Object(p.clone())})
    }

    fn props(v: Value) -> Properties {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    fn registry() -> Registry {
        Registry::new(
            ComponentMap::new()
                .with("layout", echo("layout"))
                .with("UserList", echo("user-list"))
                .with("TableRenderer", echo("table")),
        )
    }

    #[test]
    fn test_register_and_resolve() {
        let mut reg = registry();
        reg.register(&ComponentDescriptor::new("UserList").with_path("/users"))
            .unwrap();

        assert!(reg.has("UserList"));
        assert_eq!(reg.path_of("UserList"), "/users");
        assert_eq!(reg.path_of("Missing"), NOT_FOUND);
        assert_eq!(reg.resolve("UserList").unwrap().name, "UserList");
    }

    #[test]
    fn test_fallback_component() {
        let mut reg = registry();
        let d = ComponentDescriptor::new("UserGrid")
            .with_properties(props(json!({"meta": {"component": "TableRenderer"}})));
        reg.register(&d).unwrap();

        let expected = reg.component_map().get("TableRenderer").unwrap();
        assert!(reg.resolve("UserGrid").unwrap().renderer.same_as(expected));
    }

    #[test]
    fn test_unresolved_names_both() {
        let mut reg = registry();
        let d = ComponentDescriptor::new("Ghost")
            .with_properties(props(json!({"meta": {"component": "Phantom"}})));

        match reg.register(&d).unwrap_err() {
            RegistryError::Unresolved { name, fallback } => {
                assert_eq!(name, "Ghost");
                assert_eq!(fallback.as_deref(), Some("Phantom"));
            }
            e => panic!("unexpected error {e}"),
        }
        let msg = reg
            .register(&ComponentDescriptor::new("Ghost"))
            .unwrap_err()
            .to_string();
        assert!(msg.contains("Ghost"));
        assert!(msg.contains("<none>"));
    }

    #[test]
    fn test_children_registered_pre_order() {
        let mut reg = registry();
        let tree = ComponentDescriptor::new("layout")
            .with_child(ComponentDescriptor::new("UserList").with_path("/users").with_menu_item(true))
            .with_child(
                ComponentDescriptor::new("layout")
                    .with_path("/nested")
                    .with_child(ComponentDescriptor::new("TableRenderer")),
            );
        reg.register(&tree).unwrap();

        let order: Vec<_> = reg.all_registered().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(order, ["layout", "UserList", "layout", "TableRenderer"]);
        assert_eq!(reg.menu_items().len(), 1);
        assert_eq!(reg.component_by_path("/nested").unwrap().children.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_keeps_history() {
        let mut reg = registry();
        reg.register(&ComponentDescriptor::new("UserList").with_path("/users").with_menu_item(true))
            .unwrap();
        reg.register(&ComponentDescriptor::new("UserList").with_path("/people").with_menu_item(true))
            .unwrap();

        assert_eq!(reg.path_of("UserList"), "/people");
        let paths: Vec<_> = reg.routes().iter().map(|r| r.path).collect();
        assert_eq!(paths, ["/users", "/people"]);
        assert_eq!(reg.menu_items().len(), 2);
        assert_eq!(reg.entries().count(), 1);
    }

    #[test]
    fn test_render_node_merges_extra_properties() {
        let mut reg = registry();
        let d = ComponentDescriptor::new("UserList")
            .with_properties(props(json!({"rowKey": "id", "size": "large"})));
        reg.register(&d).unwrap();

        let extra = props(json!({"size": "small"}));
        let node = reg.render_node(&d, Some(&extra)).unwrap();
        assert_eq!(node.component, "UserList");
        assert_eq!(
            node.output,
            json!({"tag": "user-list", "props": {"rowKey": "id", "size": "small"}})
        );
    }

    #[test]
    fn test_render_tree_skips_missing() {
        let mut reg = registry();
        reg.register(&ComponentDescriptor::new("UserList")).unwrap();
        reg.register(&ComponentDescriptor::new("layout")).unwrap();

        let nodes = reg.render_tree(
            &[
                ComponentDescriptor::new("UserList"),
                ComponentDescriptor::new("Unknown"),
                ComponentDescriptor::new("layout"),
            ],
            None,
        );
        let names: Vec<_> = nodes.iter().map(|n| n.component.as_str()).collect();
        assert_eq!(names, ["UserList", "layout"]);
    }
}
