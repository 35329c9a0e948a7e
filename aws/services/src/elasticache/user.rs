use super::{ElastiCacheApi, UserChanges};
use crate::clients::AwsClients;
use crate::convert::string;
use crate::tagging::{read_tags, update_tags};
use async_trait::async_trait;
use aws_resource_types::elasticache::{UserConfig, UserEngine};
use aws_sdk_elasticache::model;
use log::{debug, info};
use provider_model::tags::merge_defaults;
use provider_model::{OpaqueId, Tags};
use resource_adapter::{
    Create, Delete, ErrorKind, IntoProviderError, ProviderResult, Read, ResourceType, Schema,
    Spec, Update,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// `aws_elasticache_user`. Passwords are sent but never returned, so they are write-only.
pub struct User {
    api: Arc<dyn ElastiCacheApi>,
    default_tags: Tags,
}

impl User {
    pub fn new(clients: &AwsClients) -> Self {
        Self {
            api: clients.elasticache.clone(),
            default_tags: clients.default_tags.clone(),
        }
    }
}

pub(super) fn engine(user: &model::User) -> UserEngine {
    user.engine()
        .and_then(|engine| engine.parse().ok())
        .unwrap_or_default()
}

pub(super) fn no_password_required(user: &model::User) -> bool {
    user.authentication()
        .and_then(|authentication| authentication.r#type())
        .map(|kind| kind.as_str() == "no-password")
        .unwrap_or(false)
}

impl ResourceType for User {
    const TYPE_NAME: &'static str = "aws_elasticache_user";
    type Config = UserConfig;
    type Id = OpaqueId;

    fn schema() -> Schema {
        Schema::new()
            .force_new("user_id")
            .force_new("user_name")
            .force_new("engine")
            .write_only("passwords")
            .computed("arn")
    }
}

#[async_trait]
impl Create for User {
    async fn create(&self, spec: &Spec<UserConfig>) -> ProviderResult<OpaqueId> {
        let config = &spec.configuration;
        info!("Creating user '{}'", config.user_id);
        let tags = merge_defaults(&self.default_tags, &spec.tags);
        self.api.create_user(config, &tags).await?;
        Ok(OpaqueId::new(config.user_id.clone()))
    }
}

#[async_trait]
impl Read for User {
    async fn read(&self, id: &OpaqueId) -> ProviderResult<Spec<UserConfig>> {
        let user = self.api.describe_user(id.as_str()).await?;
        let arn = user.arn().map(str::to_string).context(
            ErrorKind::Api,
            format!("User '{}' was described without an ARN", id),
        )?;
        let (tags, tags_all) = read_tags(&*self.api, &arn, &self.default_tags).await?;
        Ok(Spec {
            configuration: UserConfig {
                user_id: string(user.user_id()),
                user_name: string(user.user_name()),
                engine: engine(&user),
                access_string: string(user.access_string()),
                no_password_required: no_password_required(&user),
                passwords: BTreeSet::new(),
                arn: Some(arn),
            },
            tags,
            tags_all,
        })
    }
}

#[async_trait]
impl Update for User {
    async fn update(
        &self,
        id: &OpaqueId,
        prior: &Spec<UserConfig>,
        planned: &Spec<UserConfig>,
    ) -> ProviderResult<()> {
        let changes = UserChanges::new(&prior.configuration, &planned.configuration);
        if !changes.is_empty() {
            debug!("Modifying user '{}'", id);
            self.api.modify_user(id.as_str(), &changes).await?;
        }
        let arn = prior.configuration.arn.as_deref().context(
            ErrorKind::Internal,
            format!("The state of user '{}' has no ARN", id),
        )?;
        let tags = merge_defaults(&self.default_tags, &planned.tags);
        update_tags(&*self.api, arn, &prior.tags_all, &tags).await
    }
}

#[async_trait]
impl Delete for User {
    async fn delete(&self, id: &OpaqueId) -> ProviderResult<()> {
        info!("Deleting user '{}'", id);
        self.api.delete_user(id.as_str()).await
    }
}
