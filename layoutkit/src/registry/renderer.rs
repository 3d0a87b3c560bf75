use std::{collections::HashMap, fmt, sync::Arc};

use serde::Serialize;
use serde_json::Value;

use crate::model::Properties;

/// Renderer capability bound to a component name.
///
/// Implementations turn the merged property bag into an opaque rendered value.
/// Closures of the shape `Fn(&Properties) -> Value` implement this trait.
pub trait Renderer: Send + Sync {
    fn render(&self, properties: &Properties) -> Value;
}

impl<F> Renderer for F
where
    F: Fn(&Properties) -> Value + Send + Sync,
{
    fn render(&self, properties: &Properties) -> Value {
        self(properties)
    }
}

/// Shared handle to a renderer.
#[derive(Clone)]
pub struct RendererHandle(Arc<dyn Renderer>);

impl RendererHandle {
    pub fn new(renderer: impl Renderer + 'static) -> Self {
        Self(Arc::new(renderer))
    }

    pub fn render(&self, properties: &Properties) -> Value {
        self.0.render(properties)
    }

    /// Whether both handles point at the same renderer.
    pub fn same_as(&self, other: &RendererHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for RendererHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RendererHandle(..)")
    }
}

/// Name to renderer table supplied when the registry is created.
#[derive(Debug, Clone, Default)]
pub struct ComponentMap {
    renderers: HashMap<String, RendererHandle>,
}

impl ComponentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `renderer`, replacing any previous binding.
    pub fn insert(&mut self, name: impl Into<String>, renderer: impl Renderer + 'static) -> &mut Self {
        self.renderers.insert(name.into(), RendererHandle::new(renderer));
        self
    }

    /// Bind `name` to an existing handle.
    pub fn insert_handle(&mut self, name: impl Into<String>, handle: RendererHandle) -> &mut Self {
        self.renderers.insert(name.into(), handle);
        self
    }

    pub fn with(mut self, name: impl Into<String>, renderer: impl Renderer + 'static) -> Self {
        self.insert(name, renderer);
        self
    }

    pub fn get(&self, name: &str) -> Option<&RendererHandle> {
        self.renderers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.renderers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    /// Overlay `other` on top of `self`; entries in `other` win.
    pub fn extend(&mut self, other: ComponentMap) {
        self.renderers.extend(other.renderers);
    }
}

/// Output of a registry render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedNode {
    /// Name the descriptor was rendered under.
    pub component: String,
    /// Value produced by the renderer.
    pub output: Value,
}
