//! # layoutkit-cli
//!
//! Command line driver for `layoutkit` documents.
//!
//! Every component renders through a pass-through renderer, so composed
//! layouts, compiled forms and search queries can be inspected as JSON and
//! exercised against a live API.
//!
//! ## Features
//!
//! - **Render**: compose a layout document and list its routes and menu
//! - **Form**: compile a form, validate values and submit them
//! - **Filter**: build a table search query from `key=value` edits
//! - **Lookup**: fetch and search lookup options with debouncing
//! - **Schema**: print the JSON Schema of every document kind
//!
//! ## Modules
//!
//! - [`commands`] - Subcommand implementations
//! - [`config`] - `.layoutkit.toml` configuration
//! - [`ctx`] - Application context and state management
//! - [`http`] - `reqwest` backed transport
//! - [`passthrough`] - Built-in echo renderers

pub mod commands;

/// Configuration file format.
pub mod config;

/// Application context and state management.
pub mod ctx;

/// HTTP transport for form submission, lookups and searches.
pub mod http;

pub mod passthrough;

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;
