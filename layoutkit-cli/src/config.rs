//! CLI configuration types.
//!
//! Configuration is read from `.layoutkit.toml` in the working directory
//! unless another file is given with `--config`. JSON is accepted as well,
//! chosen by extension.
//!
//! # Configuration File Format
//!
//! ```toml
//! components = ["UserList", "UserDetail"]
//! viewport = "desktop"
//!
//! [api]
//! base_url = "http://localhost:3000/api"
//! token = "secret"
//!
//! [lookup]
//! debounce_ms = 300
//!
//! [aliases]
//! UserGrid = "TableRenderer"
//! ```

use std::collections::BTreeMap;

use layoutkit::{lookup::DEFAULT_DEBOUNCE_MS, model::Viewport};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".layoutkit.toml";

/// Root configuration structure.
#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Remote API used for form submits, lookups and table searches.
    pub api: ApiConfig,
    /// Lookup field behaviour.
    pub lookup: LookupConfig,
    /// Component names bound to the passthrough renderer, in addition to the
    /// built-in set.
    pub components: Vec<String>,
    /// Extra names bound to the renderer of an existing component.
    pub aliases: BTreeMap<String, String>,
    /// Viewport used to evaluate responsive hints.
    pub viewport: Option<Viewport>,
}

/// Remote API settings.
#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Prefix for relative endpoint paths.
    pub base_url: Option<String>,
    /// Sent as `Authorization: Token <token>`.
    pub token: Option<String>,
}

/// Lookup field settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct LookupConfig {
    /// Debounce window for lookup searches, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}
