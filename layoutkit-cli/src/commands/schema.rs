use clap::{Args, ValueEnum};
use layoutkit::{
    UiNode,
    model::{FormSchema, TableSchema, decode::LayoutDocument},
};
use schemars::{Schema, schema_for};

use crate::{commands::to_pretty, config::AppConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemaKind {
    /// `.layoutkit.toml`
    Config,
    /// Page layout document
    Layout,
    /// Bare component node
    Node,
    /// Form schema
    Form,
    /// Table schema
    Table,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Document kind
    #[arg(value_enum)]
    pub kind: SchemaKind,
}

pub fn schema(kind: SchemaKind) -> Schema {
    match kind {
        SchemaKind::Config => schema_for!(AppConfig),
        SchemaKind::Layout => schema_for!(LayoutDocument),
        SchemaKind::Node => schema_for!(UiNode),
        SchemaKind::Form => schema_for!(FormSchema),
        SchemaKind::Table => schema_for!(TableSchema),
    }
}

pub fn run(args: SchemaArgs) -> anyhow::Result<()> {
    println!("{}", to_pretty(&schema(args.kind))?);
    Ok(())
}
