use super::{AppMeshApi, VirtualGatewayId};
use crate::error::{never, sdk_error};
use crate::tagging::TaggingApi;
use async_trait::async_trait;
use aws_sdk_appmesh::error::{
    DeleteVirtualGatewayError, DescribeVirtualGatewayError, ListTagsForResourceError,
    TagResourceError, UntagResourceError, UpdateVirtualGatewayError,
};
use aws_sdk_appmesh::model::{TagRef, VirtualGatewayData, VirtualGatewaySpec};
use aws_types::SdkConfig;
use log::trace;
use provider_model::Tags;
use resource_adapter::{ErrorKind, IntoProviderError, ProviderError, ProviderResult};

/// [`AppMeshApi`] over the AWS SDK.
pub struct SdkAppMesh {
    client: aws_sdk_appmesh::Client,
}

impl SdkAppMesh {
    pub fn new(config: &SdkConfig, endpoint: Option<&str>) -> Self {
        let mut builder = aws_sdk_appmesh::config::Builder::from(config);
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        Self {
            client: aws_sdk_appmesh::Client::from_conf(builder.build()),
        }
    }
}

fn tag_refs(tags: &Tags) -> Option<Vec<TagRef>> {
    if tags.is_empty() {
        return None;
    }
    Some(
        tags.iter()
            .map(|(key, value)| TagRef::builder().key(key).value(value).build())
            .collect(),
    )
}

fn gateway(
    data: Option<&VirtualGatewayData>,
    id: &VirtualGatewayId,
) -> ProviderResult<VirtualGatewayData> {
    data.cloned().context(
        ErrorKind::Api,
        format!("The response for virtual gateway '{}' was empty", id),
    )
}

#[async_trait]
impl AppMeshApi for SdkAppMesh {
    async fn create_virtual_gateway(
        &self,
        id: &VirtualGatewayId,
        spec: VirtualGatewaySpec,
        tags: &Tags,
    ) -> ProviderResult<VirtualGatewayData> {
        let output = self
            .client
            .create_virtual_gateway()
            .mesh_name(&id.mesh_name)
            .set_mesh_owner(id.mesh_owner.clone())
            .virtual_gateway_name(&id.name)
            .spec(spec)
            .set_tags(tag_refs(tags))
            .send()
            .await
            .map_err(|e| {
                sdk_error(e, never, format!("Unable to create virtual gateway '{}'", id))
            })?;
        gateway(output.virtual_gateway(), id)
    }

    async fn describe_virtual_gateway(
        &self,
        id: &VirtualGatewayId,
    ) -> ProviderResult<VirtualGatewayData> {
        let output = self
            .client
            .describe_virtual_gateway()
            .mesh_name(&id.mesh_name)
            .set_mesh_owner(id.mesh_owner.clone())
            .virtual_gateway_name(&id.name)
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    DescribeVirtualGatewayError::is_not_found_exception,
                    format!("Unable to describe virtual gateway '{}'", id),
                )
            })?;
        let data = gateway(output.virtual_gateway(), id)?;

        // Deleted gateways are still described for a while.
        let status = data
            .status()
            .and_then(|status| status.status())
            .map(|code| code.as_str().to_string());
        trace!("Virtual gateway '{}' has status {:?}", id, status);
        if status.as_deref() == Some("DELETED") {
            return Err(ProviderError::new_with_context(
                ErrorKind::NotFound,
                format!("Virtual gateway '{}' has been deleted", id),
            ));
        }
        Ok(data)
    }

    async fn update_virtual_gateway(
        &self,
        id: &VirtualGatewayId,
        spec: VirtualGatewaySpec,
    ) -> ProviderResult<VirtualGatewayData> {
        let output = self
            .client
            .update_virtual_gateway()
            .mesh_name(&id.mesh_name)
            .set_mesh_owner(id.mesh_owner.clone())
            .virtual_gateway_name(&id.name)
            .spec(spec)
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    UpdateVirtualGatewayError::is_not_found_exception,
                    format!("Unable to update virtual gateway '{}'", id),
                )
            })?;
        gateway(output.virtual_gateway(), id)
    }

    async fn delete_virtual_gateway(&self, id: &VirtualGatewayId) -> ProviderResult<()> {
        self.client
            .delete_virtual_gateway()
            .mesh_name(&id.mesh_name)
            .set_mesh_owner(id.mesh_owner.clone())
            .virtual_gateway_name(&id.name)
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    DeleteVirtualGatewayError::is_not_found_exception,
                    format!("Unable to delete virtual gateway '{}'", id),
                )
            })?;
        Ok(())
    }
}

#[async_trait]
impl TaggingApi for SdkAppMesh {
    async fn list_tags(&self, arn: &str) -> ProviderResult<Tags> {
        let mut tags = Tags::new();
        let mut next_token = None;
        loop {
            let output = self
                .client
                .list_tags_for_resource()
                .resource_arn(arn)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| {
                    sdk_error(
                        e,
                        ListTagsForResourceError::is_not_found_exception,
                        format!("Unable to list tags for '{}'", arn),
                    )
                })?;
            tags.extend(output.tags().unwrap_or_default().iter().map(|tag| {
                (
                    tag.key().unwrap_or_default().to_string(),
                    tag.value().unwrap_or_default().to_string(),
                )
            }));
            next_token = output.next_token().map(str::to_string);
            if next_token.is_none() {
                return Ok(tags);
            }
        }
    }

    async fn tag_resource(&self, arn: &str, tags: &Tags) -> ProviderResult<()> {
        self.client
            .tag_resource()
            .resource_arn(arn)
            .set_tags(tag_refs(tags))
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    TagResourceError::is_not_found_exception,
                    format!("Unable to tag '{}'", arn),
                )
            })?;
        Ok(())
    }

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> ProviderResult<()> {
        self.client
            .untag_resource()
            .resource_arn(arn)
            .set_tag_keys(Some(keys.to_vec()))
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    UntagResourceError::is_not_found_exception,
                    format!("Unable to untag '{}'", arn),
                )
            })?;
        Ok(())
    }
}
