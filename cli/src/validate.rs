use crate::files::{read_value, resource};
use anyhow::{Context, Result};
use aws_services::AwsClients;
use clap::{value_parser, Parser};
use provider_utils::config::ProviderConfig;
use std::path::PathBuf;

/// Check a desired configuration: enum members, block counts, exclusive groups, lengths and
/// ranges. Nothing is sent to AWS.
#[derive(Debug, Parser)]
pub(crate) struct Validate {
    /// The resource type, e.g. `aws_appmesh_virtual_gateway`.
    #[clap(long = "type")]
    type_name: String,

    /// Path to the desired configuration.
    #[clap(long, value_parser = value_parser!(PathBuf))]
    file: PathBuf,
}

impl Validate {
    pub(crate) async fn run(self, config: &ProviderConfig) -> Result<()> {
        let clients = AwsClients::offline(config).await;
        let resource = resource(&clients, &self.type_name)?;
        let desired = read_value(&self.file).await?;
        resource
            .validate(&desired)
            .context(format!("'{}' is not valid", self.file.display()))?;
        println!("'{}' is a valid {}.", self.file.display(), self.type_name);
        Ok(())
    }
}
