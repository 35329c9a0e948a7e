use anyhow::{Error, Result};
use aws_services::{registry, AwsClients};
use clap::Parser;
use provider_utils::config::ProviderConfig;
use provider_utils::json_display;
use serde_json::json;

/// List every registered resource and data source type.
#[derive(Debug, Parser)]
pub(crate) struct Types {
    /// Output the types in JSON format, including the attributes that force replacement and the
    /// write-only attributes of each resource.
    #[clap(long = "json")]
    json: bool,
}

impl Types {
    pub(crate) async fn run(self, config: &ProviderConfig) -> Result<()> {
        let registry = registry().map_err(|e| Error::msg(e.to_string()))?;
        if self.json {
            let clients = AwsClients::offline(config).await;
            let resources: Vec<_> = registry
                .resources()
                .map(|(package, registration)| {
                    let schema = registration.instantiate(&clients).schema();
                    json!({
                        "type_name": registration.type_name,
                        "name": registration.name,
                        "package": package,
                        "tags": registration.tags.map(|tags| tags.identifier_attribute),
                        "force_new": schema.force_new_attributes().collect::<Vec<_>>(),
                        "write_only": schema.write_only_attributes().collect::<Vec<_>>(),
                    })
                })
                .collect();
            let data_sources: Vec<_> = registry
                .data_sources()
                .map(|(package, registration)| {
                    json!({
                        "type_name": registration.type_name,
                        "name": registration.name,
                        "package": package,
                    })
                })
                .collect();
            println!(
                "{}",
                json_display(json!({"resources": resources, "data_sources": data_sources}))
            );
            return Ok(());
        }

        println!("{:<8} {:<36} {:<12} NAME", "KIND", "TYPE", "PACKAGE");
        for (package, registration) in registry.resources() {
            println!(
                "{:<8} {:<36} {:<12} {}",
                "resource", registration.type_name, package, registration.name
            );
        }
        for (package, registration) in registry.data_sources() {
            println!(
                "{:<8} {:<36} {:<12} {}",
                "data", registration.type_name, package, registration.name
            );
        }
        Ok(())
    }
}
