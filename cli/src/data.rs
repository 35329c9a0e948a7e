use crate::files::{data_source, online_clients, read_value};
use anyhow::{Context, Result};
use clap::{value_parser, Parser};
use provider_utils::config::ProviderConfig;
use provider_utils::json_display;
use resource_adapter::CancellationToken;
use std::path::PathBuf;

/// Look up an object that is not managed here.
#[derive(Debug, Parser)]
pub(crate) struct Data {
    /// The data source type, e.g. `aws_elasticache_user`.
    #[clap(long = "type")]
    type_name: String,

    /// Path to the data source arguments.
    #[clap(long, value_parser = value_parser!(PathBuf))]
    file: PathBuf,
}

impl Data {
    pub(crate) async fn run(self, config: &ProviderConfig, cancel: CancellationToken) -> Result<()> {
        let args = read_value(&self.file).await?;
        let clients = online_clients(config).await?;
        let output = data_source(&clients, &self.type_name)?
            .read(cancel, &args)
            .await
            .context(format!("Unable to read {}", self.type_name))?;
        println!("{}", json_display(&output));
        Ok(())
    }
}
