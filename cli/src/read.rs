use crate::files::{online_clients, read_state, resource, write_state};
use anyhow::{Context, Result};
use clap::{value_parser, Parser};
use provider_utils::config::ProviderConfig;
use provider_utils::json_display;
use resource_adapter::CancellationToken;
use std::path::PathBuf;

/// Read a tracked resource again and update its state document. The document is removed if the
/// resource no longer exists.
#[derive(Debug, Parser)]
pub(crate) struct Read {
    /// Path to the state document.
    #[clap(long, value_parser = value_parser!(PathBuf))]
    state: PathBuf,
}

impl Read {
    pub(crate) async fn run(self, config: &ProviderConfig, cancel: CancellationToken) -> Result<()> {
        let prior = read_state(&self.state)
            .await?
            .context(format!("'{}' does not exist", self.state.display()))?;
        let clients = online_clients(config).await?;
        let resource = resource(&clients, &prior.type_name)?;
        let document = resource
            .refresh(cancel, &prior)
            .await
            .context(format!("Unable to refresh {} '{}'", prior.type_name, prior.id))?;
        write_state(&self.state, document.as_ref()).await?;
        match document {
            Some(document) => println!("{}", json_display(&document)),
            None => println!("{} '{}' no longer exists.", prior.type_name, prior.id),
        }
        Ok(())
    }
}
