use crate::files::{online_clients, read_state, resource, write_state};
use anyhow::{Context, Error, Result};
use clap::{value_parser, Parser};
use provider_utils::config::ProviderConfig;
use provider_utils::json_display;
use resource_adapter::CancellationToken;
use std::path::PathBuf;

/// Start tracking an existing resource. The state document holds exactly what a read returns.
#[derive(Debug, Parser)]
pub(crate) struct Import {
    /// The resource type, e.g. `aws_appmesh_virtual_gateway`.
    #[clap(long = "type")]
    type_name: String,

    /// The resource's ID, e.g. `mesh-name/virtual-gateway-name`.
    #[clap(long)]
    id: String,

    /// Path to write the state document to. It must not already track a resource.
    #[clap(long, value_parser = value_parser!(PathBuf))]
    state: PathBuf,
}

impl Import {
    pub(crate) async fn run(self, config: &ProviderConfig, cancel: CancellationToken) -> Result<()> {
        if let Some(existing) = read_state(&self.state).await? {
            return Err(Error::msg(format!(
                "'{}' already tracks {} '{}'",
                self.state.display(),
                existing.type_name,
                existing.id
            )));
        }
        let clients = online_clients(config).await?;
        let resource = resource(&clients, &self.type_name)?;
        let document = resource
            .import(cancel, &self.id)
            .await
            .context(format!("Unable to import {} '{}'", self.type_name, self.id))?;
        write_state(&self.state, Some(&document)).await?;
        println!("{}", json_display(&document));
        Ok(())
    }
}
