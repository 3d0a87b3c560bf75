use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use layoutkit::{
    CompiledForm, Properties, Submission,
    form::SubmitError,
    model::{FormSchema, decode},
    registry::global,
};

use crate::{commands::to_pretty, ctx::AppContext};

#[derive(Debug, Args)]
pub struct FormArgs {
    /// Form schema (.json or .toml)
    pub file: PathBuf,
    /// Initial values as a nested object
    #[arg(long)]
    pub values: Option<PathBuf>,
    /// Layout document registered before submitting, for redirect paths
    #[arg(long)]
    pub layout: Option<PathBuf>,
    /// Post the values to the form action
    #[arg(long)]
    pub submit: bool,
}

/// Compile `schema` and collect the values to check, preferring `values`
/// over the schema's own initial values.
pub fn prepare(schema: &FormSchema, values: Option<&Properties>) -> anyhow::Result<(CompiledForm, Submission)> {
    let form = CompiledForm::compile_with_values(schema, values)?;
    let submission = match values {
        Some(v) => form.values_from(v),
        None => form.initial_values(),
    };
    Ok((form, submission))
}

pub async fn run(ctx: &AppContext, args: FormArgs) -> anyhow::Result<()> {
    let schema: FormSchema = decode::load(ctx.resolve(&args.file))?;
    let values: Option<Properties> = args
        .values
        .as_ref()
        .map(|p| decode::load(ctx.resolve(p)))
        .transpose()?;

    let (form, submission) = prepare(&schema, values.as_ref())?;
    println!("{}", to_pretty(&form.fields)?);

    println!("{}", "Values".bold().green());
    for (name, value) in submission.iter() {
        println!("  {} = {value}", name.cyan());
    }

    match form.validate(&submission) {
        Ok(()) => println!("{}", "valid".bold().green()),
        Err(errors) => {
            for (name, messages) in &errors.0 {
                for message in messages {
                    println!("  {}: {}", name.red(), message);
                }
            }
            if args.submit {
                bail!("refusing to submit invalid values");
            }
            return Ok(());
        }
    }

    if !args.submit {
        return Ok(());
    }

    ctx.init_registry()?;
    if let Some(layout) = &args.layout {
        let root = decode::load_root(ctx.resolve(layout))?;
        global::register(&root.to_descriptor())?;
    }

    let transport = ctx.transport()?;
    match form.submit(&transport, &submission, None).await {
        Ok(outcome) => {
            println!("{}", to_pretty(&outcome.response)?);
            if let Some(redirect) = outcome.redirect {
                println!("{} {}", "Redirect".bold().green(), redirect);
            }
            Ok(())
        }
        Err(SubmitError::Remote(errors)) => {
            for (field, message) in &errors.0 {
                println!("  {}: {}", field.red(), message);
            }
            bail!("submission to '{}' was rejected", form.action)
        }
        Err(e) => Err(e.into()),
    }
}
