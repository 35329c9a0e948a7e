use super::subnet_group::subnet_ids;
use super::user::{engine, no_password_required};
use super::ElastiCacheApi;
use crate::clients::AwsClients;
use crate::convert::string;
use async_trait::async_trait;
use aws_resource_types::elasticache::{SubnetGroupData, SubnetGroupLookup, UserData, UserLookup};
use log::debug;
use resource_adapter::{DataSource, ProviderResult};
use std::sync::Arc;

/// Looks up a subnet group that is not managed here.
pub struct SubnetGroupDataSource {
    api: Arc<dyn ElastiCacheApi>,
}

impl SubnetGroupDataSource {
    pub fn new(clients: &AwsClients) -> Self {
        Self {
            api: clients.elasticache.clone(),
        }
    }
}

#[async_trait]
impl DataSource for SubnetGroupDataSource {
    const TYPE_NAME: &'static str = "aws_elasticache_subnet_group";
    type Args = SubnetGroupLookup;
    type Output = SubnetGroupData;

    async fn read(&self, args: &SubnetGroupLookup) -> ProviderResult<SubnetGroupData> {
        let name = args.name.to_lowercase();
        debug!("Looking up subnet group '{}'", name);
        let group = self.api.describe_cache_subnet_group(&name).await?;
        let arn = string(group.arn());
        let tags = self.api.list_tags(&arn).await?;
        Ok(SubnetGroupData {
            name: string(group.cache_subnet_group_name()),
            description: string(group.cache_subnet_group_description()),
            subnet_ids: subnet_ids(&group),
            arn,
            vpc_id: string(group.vpc_id()),
            tags,
        })
    }
}

/// Looks up a user that is not managed here.
pub struct UserDataSource {
    api: Arc<dyn ElastiCacheApi>,
}

impl UserDataSource {
    pub fn new(clients: &AwsClients) -> Self {
        Self {
            api: clients.elasticache.clone(),
        }
    }
}

#[async_trait]
impl DataSource for UserDataSource {
    const TYPE_NAME: &'static str = "aws_elasticache_user";
    type Args = UserLookup;
    type Output = UserData;

    async fn read(&self, args: &UserLookup) -> ProviderResult<UserData> {
        debug!("Looking up user '{}'", args.user_id);
        let user = self.api.describe_user(&args.user_id).await?;
        Ok(UserData {
            user_id: string(user.user_id()),
            user_name: string(user.user_name()),
            engine: engine(&user),
            access_string: string(user.access_string()),
            no_password_required: no_password_required(&user),
            arn: string(user.arn()),
        })
    }
}
