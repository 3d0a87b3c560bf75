//! Composition engine.
//!
//! Walks a node tree depth-first and resolves every node into a
//! [`ComposedNode`]:
//!
//! - presentation wrappers are unwrapped, their hints turned into inline style
//!   merged over the inherited style;
//! - legacy `component`/`meta` descriptors are normalized;
//! - structural kinds (`layout`, `header`, `sidebar`/`sider`, `content`,
//!   `footer`) recurse into their children;
//! - `form` and `table` nodes get their compiled form or search fields attached;
//! - everything else is rendered through the [`Registry`].
//!
//! A node that cannot be resolved becomes a placeholder. The walk never aborts.
//! Keys are a pure function of tree position: the root is `root`, the i-th
//! child of `k` is `k.i`.

use std::{fmt, str::FromStr};

use serde::Serialize;
use serde_json::Value;

use crate::{
    filter::derive_search_fields,
    form::CompiledForm,
    model::{
        ColumnSchema, ComponentDescriptor, FieldSchema, FormSchema, Properties, RendererConfig, UiNode,
        Viewport, renderer_config::AccessibilityHints,
    },
    registry::Registry,
};

pub mod style;

pub use style::StyleHints;

/// Key of the root node.
pub const ROOT_KEY: &str = "root";

const UNKNOWN_COMPONENT: &str = "Unknown component";
const NO_FORM: &str = "No form configuration provided";
const NO_TABLE: &str = "No table configuration provided";

/// Layout scaffolding kinds handled by the composer itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StructuralKind {
    Layout,
    Header,
    Sidebar,
    Content,
    Footer,
}

impl FromStr for StructuralKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "layout" => Ok(Self::Layout),
            "header" => Ok(Self::Header),
            "sidebar" | "sider" => Ok(Self::Sidebar),
            "content" => Ok(Self::Content),
            "footer" => Ok(Self::Footer),
            _ => Err(()),
        }
    }
}

impl fmt::Display for StructuralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Layout => "layout",
            Self::Header => "header",
            Self::Sidebar => "sidebar",
            Self::Content => "content",
            Self::Footer => "footer",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Structural(StructuralKind),
    /// Rendered through the registry.
    Component,
    Form,
    Table,
    /// Diagnostic stand-in for a node that could not be resolved.
    Placeholder,
    /// Hidden on the current viewport.
    Hidden,
}

/// One resolved node of the composed tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedNode {
    pub key: String,
    pub name: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "StyleHints::is_empty")]
    pub style: StyleHints,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub css_classes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<AccessibilityHints>,
    /// Literal text, or the diagnostic message of a placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Renderer output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<CompiledForm>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub search_fields: Vec<FieldSchema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ComposedNode>,
}

impl ComposedNode {
    fn new(key: String, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            key,
            name: name.into(),
            kind,
            style: StyleHints::new(),
            css_classes: Vec::new(),
            accessibility: None,
            content: None,
            output: None,
            form: None,
            search_fields: Vec::new(),
            children: Vec::new(),
        }
    }

    fn placeholder(key: String, name: impl Into<String>, message: impl Into<String>) -> Self {
        let mut node = Self::new(key, name, NodeKind::Placeholder);
        node.content = Some(message.into());
        node
    }

    /// Pre-order traversal of this node and its descendants.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Node with the given key.
    pub fn find(&self, key: &str) -> Option<&ComposedNode> {
        self.iter().find(|n| n.key == key)
    }
}

pub struct Iter<'a> {
    stack: Vec<&'a ComposedNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a ComposedNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Presentation carried from a wrapper down to the node it wraps.
#[derive(Default)]
struct Frame {
    style: StyleHints,
    css_classes: Vec<String>,
    accessibility: Option<AccessibilityHints>,
}

impl Frame {
    /// Frame for children: style is inherited, classes and accessibility are not.
    fn inherited(&self) -> Frame {
        Frame {
            style: self.style.clone(),
            ..Default::default()
        }
    }

    fn apply(self, node: &mut ComposedNode) {
        node.style = self.style;
        node.css_classes = self.css_classes;
        node.accessibility = self.accessibility;
    }
}

/// Extra renderer properties carrying the inline style, if any.
fn style_props(style: &StyleHints) -> Option<Properties> {
    (!style.is_empty()).then(|| {
        let mut p = Properties::new();
        p.insert("style".to_string(), Value::Object(style.to_properties()));
        p
    })
}

/// Resolves node trees against a registry.
pub struct Composer<'r> {
    registry: &'r Registry,
    viewport: Option<Viewport>,
}

impl<'r> Composer<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            viewport: None,
        }
    }

    /// Apply responsive hints for `viewport`.
    pub fn with_viewport(mut self, viewport: Option<Viewport>) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn compose(&self, node: &UiNode) -> ComposedNode {
        self.compose_node(node, ROOT_KEY.to_string(), Frame::default())
    }

    fn compose_node(&self, node: &UiNode, key: String, frame: Frame) -> ComposedNode {
        match node {
            UiNode::Wrapper(cfg) => self.compose_wrapper(cfg, key, frame),
            UiNode::Legacy(legacy) => self.compose_descriptor(&legacy.normalize(), key, frame),
            UiNode::Descriptor(d) => self.compose_descriptor(d, key, frame),
        }
    }

    fn compose_wrapper(&self, cfg: &RendererConfig, key: String, frame: Frame) -> ComposedNode {
        if let Some(v) = self.viewport.filter(|v| cfg.hidden_on(*v)) {
            let name = cfg.component_detail.to_descriptor().name.clone();
            debug!("node '{key}' ({name}) hidden on {v}");
            return ComposedNode::new(key, name, NodeKind::Hidden);
        }

        let (layout, display) = cfg.effective_hints(self.viewport);
        let own = StyleHints::from_config(layout.as_ref(), display.as_ref(), &cfg.custom_styles);

        let mut css_classes = frame.css_classes;
        css_classes.extend(cfg.css_classes.iter().cloned());

        let inner = Frame {
            style: frame.style.merged(&own),
            css_classes,
            accessibility: cfg.accessibility.clone().or(frame.accessibility),
        };
        self.compose_node(&cfg.component_detail, key, inner)
    }

    fn compose_descriptor(&self, d: &ComponentDescriptor, key: String, frame: Frame) -> ComposedNode {
        let mut node = if let Ok(kind) = d.name.parse::<StructuralKind>() {
            ComposedNode::new(key, &d.name, NodeKind::Structural(kind))
        } else {
            match d.name.as_str() {
                "form" => self.compose_form(d, key, &frame.style),
                "table" => self.compose_table(d, key, &frame.style),
                _ => self.compose_component(d, key, &frame.style),
            }
        };

        if node.kind != NodeKind::Placeholder {
            if node.content.is_none() {
                node.content = d.content.clone();
            }
            node.children = d
                .children
                .iter()
                .enumerate()
                .map(|(i, child)| self.compose_node(child, format!("{}.{i}", node.key), frame.inherited()))
                .collect();
        }

        frame.apply(&mut node);
        node
    }

    fn compose_component(&self, d: &ComponentDescriptor, key: String, style: &StyleHints) -> ComposedNode {
        match self.registry.render_node(d, style_props(style).as_ref()) {
            Some(rendered) => {
                let mut node = ComposedNode::new(key, rendered.component, NodeKind::Component);
                node.output = Some(rendered.output);
                node
            }
            None => ComposedNode::placeholder(
                key,
                &d.name,
                d.content.as_deref().unwrap_or(UNKNOWN_COMPONENT),
            ),
        }
    }

    /// Registry output for form/table nodes that also have a renderer bound.
    fn optional_output(&self, d: &ComponentDescriptor, style: &StyleHints) -> Option<Value> {
        self.registry
            .has(&d.name)
            .then(|| self.registry.render_node(d, style_props(style).as_ref()))
            .flatten()
            .map(|r| r.output)
    }

    fn compose_form(&self, d: &ComponentDescriptor, key: String, style: &StyleHints) -> ComposedNode {
        let Some(props) = d.properties.as_ref().filter(|p| p.contains_key("fields")) else {
            return ComposedNode::placeholder(key, &d.name, NO_FORM);
        };

        let compiled = serde_json::from_value::<FormSchema>(Value::Object(props.clone()))
            .map_err(|e| e.to_string())
            .and_then(|schema| CompiledForm::compile(&schema).map_err(|e| e.to_string()));

        match compiled {
            Ok(form) => {
                let mut node = ComposedNode::new(key, &d.name, NodeKind::Form);
                node.form = Some(form);
                node.output = self.optional_output(d, style);
                node
            }
            Err(e) => {
                warn!("form at '{key}' could not be compiled: {e}");
                ComposedNode::placeholder(key, &d.name, format!("Invalid form configuration: {e}"))
            }
        }
    }

    fn compose_table(&self, d: &ComponentDescriptor, key: String, style: &StyleHints) -> ComposedNode {
        let Some(columns) = d.property("columns") else {
            return ComposedNode::placeholder(key, &d.name, NO_TABLE);
        };

        match serde_json::from_value::<Vec<ColumnSchema>>(columns.clone()) {
            Ok(columns) => {
                let mut node = ComposedNode::new(key, &d.name, NodeKind::Table);
                node.search_fields = derive_search_fields(&columns);
                node.output = self.optional_output(d, style);
                node
            }
            Err(e) => {
                warn!("table at '{key}' has invalid columns: {e}");
                ComposedNode::placeholder(key, &d.name, format!("Invalid table configuration: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        model::{Properties, decode::decode_root},
        registry::ComponentMap,
    };

    fn registry() -> Registry {
        let echo = |p: &Properties| Value::Object(p.clone());
        let mut r = Registry::new(
            ComponentMap::new()
                .with("UserList", echo)
                .with("text", |p: &Properties| json!({"text": p.get("text")}))
                .with("table", echo),
        );
        r.register(&ComponentDescriptor::new("UserList")).unwrap();
        r.register(&ComponentDescriptor::new("text")).unwrap();
        r.register(&ComponentDescriptor::new("table")).unwrap();
        r
    }

    fn tree() -> UiNode {
        decode_root(json!({
            "componentDetail": {
                "name": "layout",
                "children": [
                    {"name": "header", "content": "Admin"},
                    {"name": "sider"},
                    {"name": "content", "children": [
                        {"name": "UserList", "properties": {"rowKey": "id"}},
                        {"name": "Mystery", "content": "fallback text"},
                        {"name": "Ghost"},
                        {"name": "text", "properties": {"text": "hi"}}
                    ]},
                    {"name": "footer"}
                ]
            },
            "display": {"showBorder": true},
            "cssClasses": ["shell"]
        }))
        .unwrap()
    }

    #[test]
    fn test_structure_and_keys() {
        let reg = registry();
        let root = Composer::new(&reg).compose(&tree());

        assert_eq!(root.key, ROOT_KEY);
        assert_eq!(root.kind, NodeKind::Structural(StructuralKind::Layout));
        assert_eq!(root.css_classes, ["shell"]);
        assert_eq!(root.children[1].kind, NodeKind::Structural(StructuralKind::Sidebar));
        assert_eq!(root.children[0].content.as_deref(), Some("Admin"));

        let keys: Vec<_> = root.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(
            keys,
            [
                "root", "root.0", "root.1", "root.2", "root.2.0", "root.2.1", "root.2.2", "root.2.3",
                "root.3"
            ]
        );
    }

    #[test]
    fn test_deterministic() {
        let reg = registry();
        let composer = Composer::new(&reg);
        assert_eq!(composer.compose(&tree()), composer.compose(&tree()));
    }

    #[test]
    fn test_unknown_nodes_do_not_abort_siblings() {
        let reg = registry();
        let root = Composer::new(&reg).compose(&tree());

        let mystery = root.find("root.2.1").unwrap();
        assert_eq!(mystery.kind, NodeKind::Placeholder);
        assert_eq!(mystery.content.as_deref(), Some("fallback text"));
        assert_eq!(root.find("root.2.2").unwrap().content.as_deref(), Some(UNKNOWN_COMPONENT));

        let text = root.find("root.2.3").unwrap();
        assert_eq!(text.kind, NodeKind::Component);
        assert_eq!(text.output, Some(json!({"text": "hi"})));
    }

    #[test]
    fn test_style_flows_to_descendants() {
        let reg = registry();
        let root = Composer::new(&reg).compose(&tree());

        let list = root.find("root.2.0").unwrap();
        assert_eq!(list.style.get("border"), Some(&json!("1px solid #d9d9d9")));
        assert!(list.css_classes.is_empty());
        assert_eq!(
            list.output,
            Some(json!({"rowKey": "id", "style": {"border": "1px solid #d9d9d9"}}))
        );
    }

    #[test]
    fn test_nested_wrapper_merges_not_accumulates() {
        let reg = registry();
        let node = decode_root(json!({
            "componentDetail": {"name": "content", "children": [
                {"componentDetail": {"name": "UserList"}, "display": {"textColor": "red"}, "customStyles": {"border": "none"}}
            ]},
            "display": {"showBorder": true, "textColor": "blue"}
        }))
        .unwrap();

        let root = Composer::new(&reg).compose(&node);
        let inner = root.find("root.0").unwrap();
        assert_eq!(inner.style.get("color"), Some(&json!("red")));
        assert_eq!(inner.style.get("border"), Some(&json!("none")));
        assert_eq!(root.style.get("color"), Some(&json!("blue")));
    }

    #[test]
    fn test_hidden_on_viewport() {
        let reg = registry();
        let node = decode_root(json!({
            "componentDetail": {"name": "layout", "children": [
                {"componentDetail": {"name": "sidebar", "children": [{"name": "UserList"}]},
                 "responsive": {"hiddenOn": ["mobile"]}}
            ]}
        }))
        .unwrap();

        let mobile = Composer::new(&reg).with_viewport(Some(Viewport::Mobile)).compose(&node);
        let sider = mobile.find("root.0").unwrap();
        assert_eq!(sider.kind, NodeKind::Hidden);
        assert!(sider.children.is_empty());

        let desktop = Composer::new(&reg).with_viewport(Some(Viewport::Desktop)).compose(&node);
        assert_eq!(desktop.iter().count(), 3);
    }

    #[test]
    fn test_legacy_node_normalized() {
        let reg = registry();
        let node = decode_root(json!({"component": "UserList", "meta": {"properties": {"size": "small"}}})).unwrap();
        let root = Composer::new(&reg).compose(&node);
        assert_eq!(root.kind, NodeKind::Component);
        assert_eq!(root.output.unwrap()["size"], json!("small"));
    }

    #[test]
    fn test_form_and_table_nodes() {
        let reg = registry();
        let node = decode_root(json!({"name": "content", "children": [
            {"name": "form", "properties": {"action": "/u", "fields": [
                {"name": "a", "inputType": "object", "properties": {"fields": [{"name": "b"}]}}
            ]}},
            {"name": "form"},
            {"name": "table", "properties": {"columns": [
                {"dataIndex": "name", "title": "Name", "filterable": {"apply": true}},
                {"dataIndex": "age"}
            ]}},
            {"name": "table", "properties": {}}
        ]}))
        .unwrap();

        let root = Composer::new(&reg).compose(&node);

        let form = root.find("root.0").unwrap();
        assert_eq!(form.kind, NodeKind::Form);
        assert_eq!(form.form.as_ref().unwrap().leaves()[0].full_name(), "a.b");
        assert_eq!(root.find("root.1").unwrap().content.as_deref(), Some(NO_FORM));

        let table = root.find("root.2").unwrap();
        assert_eq!(table.kind, NodeKind::Table);
        assert_eq!(table.search_fields.len(), 1);
        assert!(table.output.is_some());
        assert_eq!(root.find("root.3").unwrap().content.as_deref(), Some(NO_TABLE));
    }

    #[test]
    fn test_table_output_gets_inherited_style() {
        let reg = registry();
        let node = decode_root(json!({
            "componentDetail": {"name": "content", "children": [
                {"name": "table", "properties": {"columns": [{"dataIndex": "name"}]}}
            ]},
            "display": {"showBorder": true}
        }))
        .unwrap();

        let root = Composer::new(&reg).compose(&node);
        let table = root.find("root.0").unwrap();
        assert_eq!(table.kind, NodeKind::Table);
        assert_eq!(table.style.get("border"), Some(&json!("1px solid #d9d9d9")));
        assert_eq!(
            table.output.as_ref().unwrap()["style"],
            json!({"border": "1px solid #d9d9d9"})
        );
    }
}
