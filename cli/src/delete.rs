use crate::files::{online_clients, read_state, resource, write_state};
use anyhow::{Context, Result};
use clap::{value_parser, Parser};
use provider_utils::config::ProviderConfig;
use resource_adapter::CancellationToken;
use std::path::PathBuf;

/// Delete a tracked resource and remove its state document. A resource that is already gone is
/// not an error.
#[derive(Debug, Parser)]
pub(crate) struct Delete {
    /// Path to the state document.
    #[clap(long, value_parser = value_parser!(PathBuf))]
    state: PathBuf,
}

impl Delete {
    pub(crate) async fn run(self, config: &ProviderConfig, cancel: CancellationToken) -> Result<()> {
        let prior = match read_state(&self.state).await? {
            Some(prior) => prior,
            None => {
                println!("Nothing is tracked in '{}'.", self.state.display());
                return Ok(());
            }
        };
        let clients = online_clients(config).await?;
        let resource = resource(&clients, &prior.type_name)?;
        resource
            .destroy(cancel, &prior)
            .await
            .context(format!("Unable to delete {} '{}'", prior.type_name, prior.id))?;
        write_state(&self.state, None).await?;
        println!("Deleted {} '{}'.", prior.type_name, prior.id);
        Ok(())
    }
}
