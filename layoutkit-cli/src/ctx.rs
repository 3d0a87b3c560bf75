//! Application context and state management.
//!
//! This module provides the [`AppContext`] type which holds the state shared
//! by every subcommand: the workspace directory, the loaded configuration and
//! the path it came from.

use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;
use layoutkit::{model::decode, registry::global};

use crate::{
    config::{AppConfig, CONFIG_FILE},
    http::HttpTransport,
    passthrough,
};

/// The main application context holding all state.
#[derive(Default, Clone)]
pub struct AppContext {
    /// Directory relative paths are resolved against.
    pub workspace: PathBuf,
    /// Loaded configuration.
    pub config: AppConfig,
    /// Path the configuration was read from, if the file existed.
    pub config_path: Option<PathBuf>,
}

impl AppContext {
    /// Creates a context rooted at `workspace` with the default configuration.
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            ..Default::default()
        }
    }

    /// Loads the configuration.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Optional path to the configuration file. Defaults to
    ///   `.layoutkit.toml` in the workspace directory.
    ///
    /// A missing default file falls back to the built-in defaults; a missing
    /// explicit file is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_config(&mut self, config_path: Option<PathBuf>) -> anyhow::Result<&AppConfig> {
        let explicit = config_path.is_some();
        let path = match config_path {
            Some(p) => self.resolve(p),
            None => self.workspace.join(CONFIG_FILE),
        };

        if !path.exists() {
            if explicit {
                bail!("Config file not found: {}", path.display());
            }
            debug!("no {} in {}, using defaults", CONFIG_FILE, self.workspace.display());
            return Ok(&self.config);
        }

        self.config = decode::load(&path).with_context(|| format!("Failed to load config {}", path.display()))?;
        info!("loaded config from {}", path.display());
        self.config_path = Some(path);
        Ok(&self.config)
    }

    /// Resolves `path` against the workspace, after variable substitution.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = PathBuf::from(self.value_replace_with_var(path.as_ref().as_os_str()));
        if path.is_absolute() {
            path
        } else {
            self.workspace.join(path)
        }
    }

    /// Replaces variable placeholders in a string.
    ///
    /// Currently supports `${workspaceFolder}` which is replaced with the
    /// workspace directory path.
    pub fn value_replace_with_var<S>(&self, value: S) -> String
    where
        S: AsRef<std::ffi::OsStr>,
    {
        let raw = value.as_ref().to_string_lossy();
        raw.replace(
            "${workspaceFolder}",
            format!("{}", self.workspace.display()).as_ref(),
        )
    }

    /// Initializes the process-wide registry with the configured components.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry was already initialized.
    pub fn init_registry(&self) -> anyhow::Result<()> {
        let map = passthrough::component_map(&self.config);
        println!(
            "{}",
            format!("Registering {} component renderers", map.len()).bold().purple()
        );
        global::initialize(map)?;
        Ok(())
    }

    /// Creates the HTTP transport for the configured API.
    ///
    /// # Errors
    ///
    /// Returns an error if no `api.base_url` is configured or the client
    /// cannot be built.
    pub fn transport(&self) -> anyhow::Result<HttpTransport> {
        if self.config.api.base_url.is_none() {
            bail!("api.base_url is not configured");
        }
        HttpTransport::new(&self.config.api)
    }
}
