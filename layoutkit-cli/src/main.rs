use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use layoutkit_cli::{
    commands::{filter, form, lookup, render, schema},
    ctx::AppContext,
};

/// Inspect and exercise layoutkit documents
#[derive(Parser)]
#[command(name = "layoutkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Configuration file (default: .layoutkit.toml in the workspace)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Workspace directory relative paths resolve against (default: current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a layout document and list its routes and menu
    Render(render::RenderArgs),
    /// Compile a form, validate its values and optionally submit them
    Form(form::FormArgs),
    /// Build a table search query and optionally run it
    Filter(filter::FilterArgs),
    /// Fetch or search the options of a lookup endpoint
    Lookup(lookup::LookupArgs),
    /// Print the JSON Schema of a document kind
    Schema(schema::SchemaArgs),
}

fn context(workspace: Option<PathBuf>, config: Option<PathBuf>) -> Result<AppContext> {
    let workspace = match workspace {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let mut ctx = AppContext::new(workspace);
    ctx.load_config(config)?;
    Ok(ctx)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let Cli {
        config,
        workspace,
        command,
    } = Cli::parse();

    match command {
        Commands::Render(args) => render::run(&context(workspace, config)?, args),
        Commands::Form(args) => form::run(&context(workspace, config)?, args).await,
        Commands::Filter(args) => filter::run(&context(workspace, config)?, args).await,
        Commands::Lookup(args) => lookup::run(&context(workspace, config)?, args).await,
        Commands::Schema(args) => schema::run(args),
    }
}
