use crate::files::{online_clients, read_state, read_value, resource, write_state};
use anyhow::{Error, Result};
use clap::{value_parser, Parser};
use log::info;
use provider_utils::config::ProviderConfig;
use provider_utils::json_display;
use resource_adapter::CancellationToken;
use std::path::PathBuf;

/// Make a resource match a desired configuration, then record what was read back.
#[derive(Debug, Parser)]
pub(crate) struct Apply {
    /// The resource type, e.g. `aws_appmesh_virtual_gateway`.
    #[clap(long = "type")]
    type_name: String,

    /// Path to the desired configuration.
    #[clap(long, value_parser = value_parser!(PathBuf))]
    file: PathBuf,

    /// Path to the state document. It is read before and written after the apply, including an
    /// apply that fails part way.
    #[clap(long, value_parser = value_parser!(PathBuf))]
    state: PathBuf,
}

impl Apply {
    pub(crate) async fn run(self, config: &ProviderConfig, cancel: CancellationToken) -> Result<()> {
        let desired = read_value(&self.file).await?;
        let prior = read_state(&self.state).await?;
        let clients = online_clients(config).await?;
        let resource = resource(&clients, &self.type_name)?;

        let applied = match resource.apply(cancel, prior.as_ref(), &desired).await {
            Ok(applied) => applied,
            Err(failure) => {
                // A failed apply can still have created or deleted something.
                write_state(&self.state, failure.document.as_ref()).await?;
                return Err(Error::new(failure)
                    .context(format!("Unable to apply '{}'", self.file.display())));
            }
        };
        info!("{}: {} ({})", self.type_name, applied.plan, applied.state);
        write_state(&self.state, applied.document.as_ref()).await?;
        println!("{}", json_display(&applied));
        Ok(())
    }
}
