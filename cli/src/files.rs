use anyhow::{Context, Error, Result};
use aws_services::{registry, AwsClients};
use provider_utils::config::ProviderConfig;
use resource_adapter::{DynDataSource, DynResource, StateDocument};
use serde_json::Value;
use std::path::Path;

/// Read an attribute tree from a JSON or YAML file.
pub(crate) async fn read_value(path: &Path) -> Result<Value> {
    let text = tokio::fs::read_to_string(path)
        .await
        .context(format!("Unable to read '{}'", path.display()))?;
    serde_yaml::from_str(&text).context(format!("Unable to parse '{}'", path.display()))
}

/// Read a state document. A file that does not exist means nothing is tracked.
pub(crate) async fn read_state(path: &Path) -> Result<Option<StateDocument>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = tokio::fs::read_to_string(path)
        .await
        .context(format!("Unable to read state '{}'", path.display()))?;
    let document = serde_json::from_str(&text)
        .context(format!("Unable to parse state '{}'", path.display()))?;
    Ok(Some(document))
}

/// Write a state document, or remove the file when nothing is tracked any more.
pub(crate) async fn write_state(path: &Path, document: Option<&StateDocument>) -> Result<()> {
    match document {
        Some(document) => {
            let json = serde_json::to_string_pretty(document)
                .context("Unable to serialize state")?;
            tokio::fs::write(path, json)
                .await
                .context(format!("Unable to write state '{}'", path.display()))
        }
        None if path.exists() => tokio::fs::remove_file(path)
            .await
            .context(format!("Unable to remove state '{}'", path.display())),
        None => Ok(()),
    }
}

pub(crate) fn resource(clients: &AwsClients, type_name: &str) -> Result<Box<dyn DynResource>> {
    let registry = registry().map_err(|e| Error::msg(e.to_string()))?;
    let registration = registry
        .resource(type_name)
        .context("Unable to find the resource type")?;
    Ok(registration.instantiate(clients))
}

pub(crate) fn data_source(
    clients: &AwsClients,
    type_name: &str,
) -> Result<Box<dyn DynDataSource>> {
    let registry = registry().map_err(|e| Error::msg(e.to_string()))?;
    let registration = registry
        .data_source(type_name)
        .context("Unable to find the data source type")?;
    Ok(registration.instantiate(clients))
}

pub(crate) async fn online_clients(config: &ProviderConfig) -> Result<AwsClients> {
    AwsClients::new(config)
        .await
        .context("Unable to create the AWS clients")
}
