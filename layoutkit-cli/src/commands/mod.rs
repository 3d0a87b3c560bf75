//! Subcommand implementations.

use serde::Serialize;

/// `layoutkit filter`: search query building and table search.
pub mod filter;

/// `layoutkit form`: form compilation, validation and submission.
pub mod form;

/// `layoutkit lookup`: lookup option fetching.
pub mod lookup;

/// `layoutkit render`: layout composition.
pub mod render;

/// `layoutkit schema`: JSON Schema output.
pub mod schema;

/// Pretty-printed JSON for `value`.
pub(crate) fn to_pretty<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
