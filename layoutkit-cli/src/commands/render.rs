use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use layoutkit::{
    ComposedNode, Composer, Registry, UiNode,
    model::{Viewport, decode},
    registry::global,
};
use serde::Serialize;

use crate::{commands::to_pretty, ctx::AppContext};

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Layout document (.json or .toml)
    pub file: PathBuf,
    /// Viewport for responsive hints, overrides the configured one
    #[arg(long)]
    pub viewport: Option<Viewport>,
}

#[derive(Debug, Serialize)]
pub struct RouteLine {
    pub path: String,
    pub component: String,
}

/// Composed tree plus the route and menu indexes of the registry.
#[derive(Debug, Serialize)]
pub struct RenderReport {
    pub tree: ComposedNode,
    pub routes: Vec<RouteLine>,
    pub menu: Vec<String>,
}

/// Compose `root` against `registry`.
pub fn report(registry: &Registry, root: &UiNode, viewport: Option<Viewport>) -> RenderReport {
    let tree = Composer::new(registry).with_viewport(viewport).compose(root);
    let routes = registry
        .routes()
        .into_iter()
        .map(|r| RouteLine {
            path: r.path.to_string(),
            component: r.descriptor.name.clone(),
        })
        .collect();
    let menu = registry
        .menu_items()
        .into_iter()
        .map(|d| d.name.clone())
        .collect();
    RenderReport { tree, routes, menu }
}

pub fn run(ctx: &AppContext, args: RenderArgs) -> anyhow::Result<()> {
    let path = ctx.resolve(&args.file);
    let root = decode::load_root(&path)?;

    ctx.init_registry()?;
    global::register(&root.to_descriptor())?;

    let viewport = args.viewport.or(ctx.config.viewport);
    let report = global::with(|r| report(r, &root, viewport))?;

    println!("{}", to_pretty(&report.tree)?);

    println!("{}", "Routes".bold().green());
    for route in &report.routes {
        println!("  {} -> {}", route.path.cyan(), route.component);
    }
    println!("{}", "Menu".bold().green());
    for item in &report.menu {
        println!("  {item}");
    }
    Ok(())
}
