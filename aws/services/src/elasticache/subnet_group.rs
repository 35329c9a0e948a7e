use super::ElastiCacheApi;
use crate::clients::AwsClients;
use crate::convert::string;
use crate::tagging::{read_tags, update_tags};
use async_trait::async_trait;
use aws_resource_types::elasticache::SubnetGroupConfig;
use aws_sdk_elasticache::model::CacheSubnetGroup;
use log::{debug, info};
use provider_model::tags::merge_defaults;
use provider_model::{OpaqueId, Tags};
use resource_adapter::{
    Create, Delete, ErrorKind, IntoProviderError, ProviderResult, Read, ResourceType, Schema,
    Spec, Update,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// `aws_elasticache_subnet_group`, identified by its lowercase name.
pub struct SubnetGroup {
    api: Arc<dyn ElastiCacheApi>,
    default_tags: Tags,
}

impl SubnetGroup {
    pub fn new(clients: &AwsClients) -> Self {
        Self {
            api: clients.elasticache.clone(),
            default_tags: clients.default_tags.clone(),
        }
    }
}

pub(super) fn subnet_ids(group: &CacheSubnetGroup) -> BTreeSet<String> {
    group
        .subnets()
        .unwrap_or_default()
        .iter()
        .filter_map(|subnet| subnet.subnet_identifier())
        .map(str::to_string)
        .collect()
}

impl ResourceType for SubnetGroup {
    const TYPE_NAME: &'static str = "aws_elasticache_subnet_group";
    type Config = SubnetGroupConfig;
    type Id = OpaqueId;

    fn schema() -> Schema {
        Schema::new()
            .force_new("name")
            .computed("arn")
            .computed("vpc_id")
    }
}

#[async_trait]
impl Create for SubnetGroup {
    async fn create(&self, spec: &Spec<SubnetGroupConfig>) -> ProviderResult<OpaqueId> {
        let config = &spec.configuration;
        info!("Creating subnet group '{}'", config.name);
        let tags = merge_defaults(&self.default_tags, &spec.tags);
        self.api.create_cache_subnet_group(config, &tags).await?;
        Ok(OpaqueId::new(config.name.clone()))
    }
}

#[async_trait]
impl Read for SubnetGroup {
    async fn read(&self, id: &OpaqueId) -> ProviderResult<Spec<SubnetGroupConfig>> {
        let group = self.api.describe_cache_subnet_group(id.as_str()).await?;
        let arn = group.arn().map(str::to_string).context(
            ErrorKind::Api,
            format!("Subnet group '{}' was described without an ARN", id),
        )?;
        let (tags, tags_all) = read_tags(&*self.api, &arn, &self.default_tags).await?;
        Ok(Spec {
            configuration: SubnetGroupConfig {
                name: string(group.cache_subnet_group_name()),
                description: string(group.cache_subnet_group_description()),
                subnet_ids: subnet_ids(&group),
                arn: Some(arn),
                vpc_id: group.vpc_id().map(str::to_string),
            },
            tags,
            tags_all,
        })
    }
}

#[async_trait]
impl Update for SubnetGroup {
    async fn update(
        &self,
        id: &OpaqueId,
        prior: &Spec<SubnetGroupConfig>,
        planned: &Spec<SubnetGroupConfig>,
    ) -> ProviderResult<()> {
        let (old, new) = (&prior.configuration, &planned.configuration);
        if old.description != new.description || old.subnet_ids != new.subnet_ids {
            debug!("Modifying subnet group '{}'", id);
            self.api.modify_cache_subnet_group(new).await?;
        }
        let arn = old.arn.as_deref().context(
            ErrorKind::Internal,
            format!("The state of subnet group '{}' has no ARN", id),
        )?;
        let tags = merge_defaults(&self.default_tags, &planned.tags);
        update_tags(&*self.api, arn, &prior.tags_all, &tags).await
    }
}

#[async_trait]
impl Delete for SubnetGroup {
    async fn delete(&self, id: &OpaqueId) -> ProviderResult<()> {
        info!("Deleting subnet group '{}'", id);
        self.api.delete_cache_subnet_group(id.as_str()).await
    }
}
