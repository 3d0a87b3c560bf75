//! Data model shared by the registry, composer and compilers.
//!
//! ## Architecture
//!
//! - [`descriptor`] - Component descriptors and the node shapes accepted by the composer
//! - [`renderer_config`] - Presentation wrapper and its layout/display hints
//! - [`field`] - Form field schema
//! - [`column`] - Table column schema
//! - [`query`] - Structured search query
//! - [`decode`] - JSON/TOML document decoding

/// Component descriptors.
pub mod descriptor;

/// Presentation wrapper configuration.
pub mod renderer_config;

/// Form field schema.
pub mod field;

/// Table column schema.
pub mod column;

/// Structured search query.
pub mod query;

/// JSON and TOML document decoding.
pub mod decode;

pub use column::{ColumnSchema, Filterable, TableSchema};
pub use descriptor::{ComponentDescriptor, LegacyDescriptor, LegacyMeta, Properties, UiNode};
pub use field::{Dispatch, FieldSchema, FormSchema, InputKind, RedirectTarget};
pub use query::{SearchCondition, SearchQuery};
pub use renderer_config::{RendererConfig, Viewport};
