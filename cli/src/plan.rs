use crate::files::{read_state, read_value, resource};
use anyhow::{Context, Result};
use aws_services::AwsClients;
use clap::{value_parser, Parser};
use provider_utils::config::ProviderConfig;
use provider_utils::json_display;
use std::path::PathBuf;

/// Compare the tracked state with a desired configuration without calling AWS.
#[derive(Debug, Parser)]
pub(crate) struct Plan {
    /// The resource type, e.g. `aws_appmesh_virtual_gateway`.
    #[clap(long = "type")]
    type_name: String,

    /// Path to the desired configuration. Without it the plan is to delete the resource.
    #[clap(long, value_parser = value_parser!(PathBuf))]
    file: Option<PathBuf>,

    /// Path to the state document. A missing file means nothing is tracked.
    #[clap(long, value_parser = value_parser!(PathBuf))]
    state: Option<PathBuf>,

    /// Output the plan in JSON format.
    #[clap(long = "json")]
    json: bool,
}

impl Plan {
    pub(crate) async fn run(self, config: &ProviderConfig) -> Result<()> {
        let clients = AwsClients::offline(config).await;
        let resource = resource(&clients, &self.type_name)?;
        let prior = match &self.state {
            Some(path) => read_state(path).await?,
            None => None,
        };
        let desired = match &self.file {
            Some(path) => Some(read_value(path).await?),
            None => None,
        };
        let plan = resource
            .plan(prior.as_ref(), desired.as_ref())
            .context("Unable to plan")?;
        if self.json {
            println!("{}", json_display(&plan));
        } else {
            println!("{}: {}", self.type_name, plan);
        }
        Ok(())
    }
}
