//! Error types shared across the crate.
//!
//! Configuration mistakes (an unknown component at registration time, a second
//! registry initialization) are reported through [`RegistryError`] and are meant
//! to abort startup. Malformed documents surface as [`SchemaError`].

use thiserror::Error;

/// Errors raised while building or accessing the component registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Neither the descriptor name nor its declared fallback is bound to a renderer.
    #[error("component '{name}' not found in component map (fallback: {})", fallback.as_deref().unwrap_or("<none>"))]
    Unresolved {
        /// Name requested by the descriptor.
        name: String,
        /// Fallback taken from `properties.meta.component`, if any.
        fallback: Option<String>,
    },
    /// The process-wide registry was initialized twice without a reset.
    #[error("component registry is already initialized")]
    AlreadyInitialized,
    /// The process-wide registry was used before initialization.
    #[error("component registry is not initialized")]
    NotInitialized,
}

/// Errors raised while decoding descriptors, field or column schemas.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A value could not be decoded into the expected shape.
    #[error("invalid schema at '{path}': {source}")]
    Decode {
        /// Dot-path of the offending value.
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// A value had the wrong JSON type.
    #[error("type mismatch at '{path}': expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },
    /// A nested field kind is missing its nested field list.
    #[error("field '{path}' requires a '{key}' list in its properties")]
    MissingNested { path: String, key: &'static str },
    /// Document file extension is neither `json` nor `toml`.
    #[error("unsupported document extension: {ext:?}")]
    Unsupported { ext: String },
    /// TOML document failed to parse.
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    /// JSON document failed to parse.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    pub(crate) fn decode(path: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            path: path.into(),
            source,
        }
    }
}
