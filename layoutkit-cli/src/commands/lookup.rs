use clap::Args;
use colored::Colorize;
use layoutkit::lookup::{LookupOption, LookupProperties, LookupSource, ResultMap};

use crate::{commands::to_pretty, config::LookupConfig, ctx::AppContext};

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Endpoint options are fetched from
    pub fetch_action: String,
    /// Query parameter used for searches
    #[arg(long, default_value = "q")]
    pub search_field: String,
    /// Response keys holding label and value, tried in order
    #[arg(long = "map", value_name = "LABEL=VALUE", value_parser = parse_result_map)]
    pub result_map: Vec<ResultMap>,
    /// Search text; without it the unfiltered list is fetched
    #[arg(long)]
    pub query: Option<String>,
    /// Create an option with this label through `--create-action`
    #[arg(long, requires = "create_action")]
    pub add: Option<String>,
    /// Endpoint new options are posted to
    #[arg(long)]
    pub create_action: Option<String>,
}

pub fn parse_result_map(s: &str) -> Result<ResultMap, String> {
    match s.split_once('=') {
        Some((label, value)) if !label.is_empty() && !value.is_empty() => Ok(ResultMap {
            label: label.to_string(),
            value: value.to_string(),
        }),
        _ => Err(format!("invalid LABEL=VALUE: `{s}`")),
    }
}

/// Lookup properties for `args`, debounced per `config`.
pub fn properties(config: &LookupConfig, args: &LookupArgs) -> LookupProperties {
    let mut props = LookupProperties::new(args.fetch_action.clone());
    props.search_field = args.search_field.clone();
    props.result_map = args.result_map.clone();
    props.allow_search = args.query.is_some();
    props.allow_add_new = args.create_action.is_some();
    props.create_action = args.create_action.clone();
    props.debounce = config.debounce_ms;
    props
}

fn print_options(options: &[LookupOption]) {
    println!("{}", format!("{} options", options.len()).bold().green());
    for option in options {
        println!("  {} = {}", option.value.cyan(), option.label);
    }
}

pub async fn run(ctx: &AppContext, args: LookupArgs) -> anyhow::Result<()> {
    let transport = ctx.transport()?;
    let mut source = LookupSource::new(properties(&ctx.config.lookup, &args));

    match &args.query {
        Some(query) => {
            if let Some(options) = source.search(&transport, query).await {
                source.set_options(options);
            }
        }
        None => {
            source.load(&transport).await;
        }
    }
    print_options(source.options());

    if let Some(label) = &args.add {
        match source.add_new(&transport, label).await {
            Some(option) => println!("{} {}", "Created".bold().green(), to_pretty(&option)?),
            None => bail!("could not create option '{label}'"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_result_map() {
        let map = parse_result_map("name=id").unwrap();
        assert_eq!(map.label, "name");
        assert_eq!(map.value, "id");
        assert!(parse_result_map("name").is_err());
        assert!(parse_result_map("name=").is_err());
    }

    #[test]
    fn test_properties() {
        let args = LookupArgs {
            fetch_action: "/users".into(),
            search_field: "search".into(),
            result_map: vec![parse_result_map("name=id").unwrap()],
            query: Some("ada".into()),
            add: None,
            create_action: None,
        };
        let props = properties(&LookupConfig { debounce_ms: 50 }, &args);
        assert_eq!(props.fetch_action, "/users");
        assert_eq!(props.search_field, "search");
        assert_eq!(props.debounce, 50);
        assert!(props.allow_search);
        assert!(!props.allow_add_new);
    }
}
