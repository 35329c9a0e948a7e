use super::{ElastiCacheApi, UserChanges};
use crate::error::{never, sdk_error};
use crate::tagging::TaggingApi;
use async_trait::async_trait;
use aws_resource_types::elasticache::{SubnetGroupConfig, UserConfig};
use aws_sdk_elasticache::error::{
    AddTagsToResourceError, DeleteCacheSubnetGroupError, DeleteUserError,
    DescribeCacheSubnetGroupsError, DescribeUsersError, ListTagsForResourceError,
    ModifyCacheSubnetGroupError, ModifyUserError, RemoveTagsFromResourceError,
};
use aws_sdk_elasticache::model::{CacheSubnetGroup, Tag, User};
use aws_types::SdkConfig;
use provider_model::Tags;
use resource_adapter::{ErrorKind, IntoProviderError, ProviderError, ProviderResult};

/// [`ElastiCacheApi`] over the AWS SDK.
pub struct SdkElastiCache {
    client: aws_sdk_elasticache::Client,
}

impl SdkElastiCache {
    pub fn new(config: &SdkConfig, endpoint: Option<&str>) -> Self {
        let mut builder = aws_sdk_elasticache::config::Builder::from(config);
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        Self {
            client: aws_sdk_elasticache::Client::from_conf(builder.build()),
        }
    }
}

fn tag_list(tags: &Tags) -> Option<Vec<Tag>> {
    if tags.is_empty() {
        return None;
    }
    Some(
        tags.iter()
            .map(|(key, value)| Tag::builder().key(key).value(value).build())
            .collect(),
    )
}

fn subnet_group(
    group: Option<&CacheSubnetGroup>,
    name: &str,
) -> ProviderResult<CacheSubnetGroup> {
    group.cloned().context(
        ErrorKind::Api,
        format!("The response for subnet group '{}' was empty", name),
    )
}

// The tagging calls name the missing object by its own fault.
fn list_tags_not_found(error: &ListTagsForResourceError) -> bool {
    error.is_cache_subnet_group_not_found_fault() || error.is_user_not_found_fault()
}

fn add_tags_not_found(error: &AddTagsToResourceError) -> bool {
    error.is_cache_subnet_group_not_found_fault() || error.is_user_not_found_fault()
}

fn remove_tags_not_found(error: &RemoveTagsFromResourceError) -> bool {
    error.is_cache_subnet_group_not_found_fault() || error.is_user_not_found_fault()
}

#[async_trait]
impl ElastiCacheApi for SdkElastiCache {
    async fn create_cache_subnet_group(
        &self,
        group: &SubnetGroupConfig,
        tags: &Tags,
    ) -> ProviderResult<CacheSubnetGroup> {
        let output = self
            .client
            .create_cache_subnet_group()
            .cache_subnet_group_name(&group.name)
            .cache_subnet_group_description(&group.description)
            .set_subnet_ids(Some(group.subnet_ids.iter().cloned().collect()))
            .set_tags(tag_list(tags))
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    never,
                    format!("Unable to create subnet group '{}'", group.name),
                )
            })?;
        subnet_group(output.cache_subnet_group(), &group.name)
    }

    async fn describe_cache_subnet_group(&self, name: &str) -> ProviderResult<CacheSubnetGroup> {
        let output = self
            .client
            .describe_cache_subnet_groups()
            .cache_subnet_group_name(name)
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    DescribeCacheSubnetGroupsError::is_cache_subnet_group_not_found_fault,
                    format!("Unable to describe subnet group '{}'", name),
                )
            })?;
        output
            .cache_subnet_groups()
            .unwrap_or_default()
            .iter()
            .find(|group| {
                group
                    .cache_subnet_group_name()
                    .map(|found| found.eq_ignore_ascii_case(name))
                    .unwrap_or(false)
            })
            .cloned()
            .context(
                ErrorKind::NotFound,
                format!("Subnet group '{}' was not returned", name),
            )
    }

    async fn modify_cache_subnet_group(
        &self,
        group: &SubnetGroupConfig,
    ) -> ProviderResult<CacheSubnetGroup> {
        let output = self
            .client
            .modify_cache_subnet_group()
            .cache_subnet_group_name(&group.name)
            .cache_subnet_group_description(&group.description)
            .set_subnet_ids(Some(group.subnet_ids.iter().cloned().collect()))
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    ModifyCacheSubnetGroupError::is_cache_subnet_group_not_found_fault,
                    format!("Unable to modify subnet group '{}'", group.name),
                )
            })?;
        subnet_group(output.cache_subnet_group(), &group.name)
    }

    async fn delete_cache_subnet_group(&self, name: &str) -> ProviderResult<()> {
        self.client
            .delete_cache_subnet_group()
            .cache_subnet_group_name(name)
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    DeleteCacheSubnetGroupError::is_cache_subnet_group_not_found_fault,
                    format!("Unable to delete subnet group '{}'", name),
                )
            })?;
        Ok(())
    }

    async fn create_user(&self, user: &UserConfig, tags: &Tags) -> ProviderResult<()> {
        let passwords = (!user.passwords.is_empty())
            .then(|| user.passwords.iter().cloned().collect());
        self.client
            .create_user()
            .user_id(&user.user_id)
            .user_name(&user.user_name)
            .engine(user.engine.to_string().to_lowercase())
            .access_string(&user.access_string)
            .no_password_required(user.no_password_required)
            .set_passwords(passwords)
            .set_tags(tag_list(tags))
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    never,
                    format!("Unable to create user '{}'", user.user_id),
                )
            })?;
        Ok(())
    }

    async fn describe_user(&self, user_id: &str) -> ProviderResult<User> {
        let output = self
            .client
            .describe_users()
            .user_id(user_id)
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    DescribeUsersError::is_user_not_found_fault,
                    format!("Unable to describe user '{}'", user_id),
                )
            })?;
        let user = output
            .users()
            .unwrap_or_default()
            .iter()
            .find(|user| user.user_id() == Some(user_id))
            .cloned()
            .context(
                ErrorKind::NotFound,
                format!("User '{}' was not returned", user_id),
            )?;
        if user.status() == Some("deleting") {
            return Err(ProviderError::new_with_context(
                ErrorKind::NotFound,
                format!("User '{}' is being deleted", user_id),
            ));
        }
        Ok(user)
    }

    async fn modify_user(&self, user_id: &str, changes: &UserChanges) -> ProviderResult<()> {
        self.client
            .modify_user()
            .user_id(user_id)
            .set_access_string(changes.access_string.clone())
            .set_passwords(changes.passwords.clone())
            .set_no_password_required(changes.no_password_required)
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    ModifyUserError::is_user_not_found_fault,
                    format!("Unable to modify user '{}'", user_id),
                )
            })?;
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> ProviderResult<()> {
        self.client
            .delete_user()
            .user_id(user_id)
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    DeleteUserError::is_user_not_found_fault,
                    format!("Unable to delete user '{}'", user_id),
                )
            })?;
        Ok(())
    }
}

#[async_trait]
impl TaggingApi for SdkElastiCache {
    async fn list_tags(&self, arn: &str) -> ProviderResult<Tags> {
        let output = self
            .client
            .list_tags_for_resource()
            .resource_name(arn)
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    list_tags_not_found,
                    format!("Unable to list tags for '{}'", arn),
                )
            })?;
        Ok(output
            .tag_list()
            .unwrap_or_default()
            .iter()
            .map(|tag| {
                (
                    tag.key().unwrap_or_default().to_string(),
                    tag.value().unwrap_or_default().to_string(),
                )
            })
            .collect())
    }

    async fn tag_resource(&self, arn: &str, tags: &Tags) -> ProviderResult<()> {
        self.client
            .add_tags_to_resource()
            .resource_name(arn)
            .set_tags(tag_list(tags))
            .send()
            .await
            .map_err(|e| sdk_error(e, add_tags_not_found, format!("Unable to tag '{}'", arn)))?;
        Ok(())
    }

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> ProviderResult<()> {
        self.client
            .remove_tags_from_resource()
            .resource_name(arn)
            .set_tag_keys(Some(keys.to_vec()))
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    remove_tags_not_found,
                    format!("Unable to untag '{}'", arn),
                )
            })?;
        Ok(())
    }
}
