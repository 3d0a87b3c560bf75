//! # layoutkit
//!
//! Metadata-driven UI composition.
//!
//! Applications describe their screens as serializable descriptor trees and
//! bind symbolic component names to renderer capabilities. layoutkit resolves
//! those trees, compiles form and filter schemas, and keeps the I/O needed by
//! forms, lookups and searchable tables behind a single [`Transport`] seam.
//!
//! ## Features
//!
//! - Component registry with name → renderer binding, `meta.component`
//!   fallback, menu and route indexing
//! - Composition engine with structural kinds, presentation wrappers,
//!   responsive hints and per-node placeholders for unresolved components
//! - Form schema compiler: nested `object` / repeatable `object[]` groups,
//!   dot-path names, validation rules, submission with redirect resolution
//! - Filter query compiler: one AND condition per field, live edits replace
//!   or clear conditions
//! - Lookup/checkbox option sources with debounced search
//! - JSON and TOML document decoding
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use layoutkit::{ComponentMap, Composer, Properties, Registry, model::decode};
//! use serde_json::Value;
//!
//! let map = ComponentMap::new().with("UserList", |p: &Properties| Value::Object(p.clone()));
//! let mut registry = Registry::new(map);
//!
//! let root = decode::load_root("layout.json").unwrap();
//! registry.register_node(&root).unwrap();
//!
//! let composed = Composer::new(&registry).compose(&root);
//! println!("{}", serde_json::to_string_pretty(&composed).unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`model`] - Descriptors, field/column schemas, document decoding
//! - [`registry`] - Component registry and the process-wide instance
//! - [`compose`] - Composition engine
//! - [`form`] - Form schema compiler and submission
//! - [`filter`] - Filter query compiler and table search session
//! - [`lookup`] - Remote option sources
//! - [`route`] - Route template helpers
//! - [`transport`] - Remote I/O capability

#[macro_use]
extern crate log;

/// Error types.
pub mod error;

/// Data model and document decoding.
pub mod model;

/// Component registry.
pub mod registry;

/// Composition engine.
pub mod compose;

/// Form schema compiler.
pub mod form;

/// Filter query compiler.
pub mod filter;

/// Lookup and checkbox option sources.
pub mod lookup;

/// Route template helpers.
pub mod route;

/// Remote I/O boundary.
pub mod transport;

pub use compose::{ComposedNode, Composer, NodeKind};
pub use error::{RegistryError, SchemaError};
pub use form::{CompiledForm, Submission, ValidationErrors};
pub use model::{ComponentDescriptor, Properties, UiNode};
pub use registry::{ComponentMap, Registry, Renderer};
pub use transport::{ErrorSet, Transport, TransportError};
