/*!

This is the command line interface for driving AWS resources to a desired state. Desired
configurations and state documents are plain JSON (or YAML) files; each subcommand works on a
single resource instance.

!*/

mod apply;
mod data;
mod delete;
mod files;
mod import;
mod plan;
mod read;
mod types;
mod validate;

use anyhow::{Context, Result};
use clap::Parser;
use log::{warn, LevelFilter};
use provider_utils::config::ProviderConfig;
use provider_utils::init_logger;
use resource_adapter::CancellationToken;
use std::path::PathBuf;

/// Plan, apply, import and destroy AWS resources one instance at a time.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[clap(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    /// Path to the provider configuration file. `AWS_PROVIDER_*` environment variables override
    /// its values.
    #[clap(long = "config")]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// List the registered resource and data source types.
    Types(types::Types),
    /// Check a desired configuration without calling any API.
    Validate(validate::Validate),
    /// Show what applying a desired configuration would do.
    Plan(plan::Plan),
    /// Create, update or replace a resource so that it matches a desired configuration.
    Apply(apply::Apply),
    /// Read a tracked resource again.
    Read(read::Read),
    /// Start tracking an existing resource by its ID.
    Import(import::Import),
    /// Delete a tracked resource.
    Delete(delete::Delete),
    /// Look up an object through a data source.
    Data(data::Data),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(env!("CARGO_CRATE_NAME"), Some(args.log_level));
    if let Err(e) = run(args).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = ProviderConfig::load(args.config.as_ref())
        .context("Unable to load the provider configuration")?;
    match args.command {
        Command::Types(types) => types.run(&config).await,
        Command::Validate(validate) => validate.run(&config).await,
        Command::Plan(plan) => plan.run(&config).await,
        Command::Apply(apply) => apply.run(&config, cancel_on_interrupt()).await,
        Command::Read(read) => read.run(&config, cancel_on_interrupt()).await,
        Command::Import(import) => import.run(&config, cancel_on_interrupt()).await,
        Command::Delete(delete) => delete.run(&config, cancel_on_interrupt()).await,
        Command::Data(data) => data.run(&config, cancel_on_interrupt()).await,
    }
}

/// A token that is cancelled when the process receives Ctrl-C. The call in flight is abandoned
/// and no further calls are made.
fn cancel_on_interrupt() -> CancellationToken {
    let cancel = CancellationToken::new();
    let child = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            child.cancel();
        }
    });
    cancel
}
