use super::{expand_spec, flatten_spec, AppMeshApi, VirtualGatewayId};
use crate::clients::AwsClients;
use crate::tagging::{read_tags, update_tags};
use async_trait::async_trait;
use aws_resource_types::appmesh::VirtualGatewayConfig;
use aws_smithy_types::date_time::Format;
use aws_smithy_types::DateTime;
use log::{debug, info};
use provider_model::tags::merge_defaults;
use provider_model::Tags;
use resource_adapter::{
    Create, Delete, ErrorKind, IntoProviderError, ProviderResult, Read, ResourceType, Schema,
    Spec, Update,
};
use std::sync::Arc;

/// `aws_appmesh_virtual_gateway`. The whole `spec` block is sent on every create and update.
pub struct VirtualGateway {
    api: Arc<dyn AppMeshApi>,
    default_tags: Tags,
}

impl VirtualGateway {
    pub fn new(clients: &AwsClients) -> Self {
        Self {
            api: clients.appmesh.clone(),
            default_tags: clients.default_tags.clone(),
        }
    }
}

fn date(value: Option<&DateTime>) -> Option<String> {
    value.and_then(|date| date.fmt(Format::DateTime).ok())
}

impl ResourceType for VirtualGateway {
    const TYPE_NAME: &'static str = "aws_appmesh_virtual_gateway";
    type Config = VirtualGatewayConfig;
    type Id = VirtualGatewayId;

    fn schema() -> Schema {
        Schema::new()
            .force_new("name")
            .force_new("mesh_name")
            .optional_computed("mesh_owner")
            .force_new("mesh_owner")
            .computed("arn")
            .computed("created_date")
            .computed("last_updated_date")
            .computed("resource_owner")
    }
}

#[async_trait]
impl Create for VirtualGateway {
    async fn create(
        &self,
        spec: &Spec<VirtualGatewayConfig>,
    ) -> ProviderResult<VirtualGatewayId> {
        let config = &spec.configuration;
        let id = VirtualGatewayId::new(
            &config.mesh_name,
            config.mesh_owner.clone(),
            &config.name,
        );
        info!("Creating virtual gateway '{}'", id);
        let tags = merge_defaults(&self.default_tags, &spec.tags);
        self.api
            .create_virtual_gateway(&id, expand_spec(&config.spec), &tags)
            .await?;
        Ok(id)
    }
}

#[async_trait]
impl Read for VirtualGateway {
    async fn read(&self, id: &VirtualGatewayId) -> ProviderResult<Spec<VirtualGatewayConfig>> {
        let data = self.api.describe_virtual_gateway(id).await?;
        let metadata = data.metadata();
        let arn = metadata
            .and_then(|metadata| metadata.arn())
            .context(
                ErrorKind::Api,
                format!("Virtual gateway '{}' was described without an ARN", id),
            )?
            .to_string();
        let (tags, tags_all) = read_tags(&*self.api, &arn, &self.default_tags).await?;

        let configuration = VirtualGatewayConfig {
            name: data.virtual_gateway_name().unwrap_or(&id.name).to_string(),
            mesh_name: data.mesh_name().unwrap_or(&id.mesh_name).to_string(),
            mesh_owner: metadata
                .and_then(|metadata| metadata.mesh_owner())
                .map(str::to_string),
            spec: data.spec().map(flatten_spec).unwrap_or_default(),
            arn: Some(arn),
            created_date: date(metadata.and_then(|metadata| metadata.created_at())),
            last_updated_date: date(metadata.and_then(|metadata| metadata.last_updated_at())),
            resource_owner: metadata
                .and_then(|metadata| metadata.resource_owner())
                .map(str::to_string),
        };
        Ok(Spec {
            configuration,
            tags,
            tags_all,
        })
    }
}

#[async_trait]
impl Update for VirtualGateway {
    async fn update(
        &self,
        id: &VirtualGatewayId,
        prior: &Spec<VirtualGatewayConfig>,
        planned: &Spec<VirtualGatewayConfig>,
    ) -> ProviderResult<()> {
        if prior.configuration.spec != planned.configuration.spec {
            debug!("Updating the spec of virtual gateway '{}'", id);
            self.api
                .update_virtual_gateway(id, expand_spec(&planned.configuration.spec))
                .await?;
        }
        let arn = prior.configuration.arn.as_deref().context(
            ErrorKind::Internal,
            format!("The state of virtual gateway '{}' has no ARN", id),
        )?;
        let tags = merge_defaults(&self.default_tags, &planned.tags);
        update_tags(&*self.api, arn, &prior.tags_all, &tags).await
    }
}

#[async_trait]
impl Delete for VirtualGateway {
    async fn delete(&self, id: &VirtualGatewayId) -> ProviderResult<()> {
        info!("Deleting virtual gateway '{}'", id);
        self.api.delete_virtual_gateway(id).await
    }
}
