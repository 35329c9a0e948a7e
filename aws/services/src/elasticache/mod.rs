/*!

ElastiCache: the `aws_elasticache_subnet_group` and `aws_elasticache_user` resources and the data
sources of the same names.

!*/

mod data_sources;
mod sdk;
mod subnet_group;
mod user;

pub use data_sources::{SubnetGroupDataSource, UserDataSource};
pub use sdk::SdkElastiCache;
pub use subnet_group::SubnetGroup;
pub use user::User;

use crate::clients::AwsClients;
use crate::tagging::TaggingApi;
use async_trait::async_trait;
use aws_resource_types::elasticache::{SubnetGroupConfig, UserConfig};
use aws_sdk_elasticache::model::{self, CacheSubnetGroup};
use provider_model::Tags;
use resource_adapter::{
    Adapter, DataSourceAdapter, DataSourceRegistration, ProviderResult, ResourceRegistration,
    ServicePackage, TagsConfig,
};

/// The ElastiCache calls the subnet group and user adapters make.
#[async_trait]
pub trait ElastiCacheApi: TaggingApi {
    async fn create_cache_subnet_group(
        &self,
        group: &SubnetGroupConfig,
        tags: &Tags,
    ) -> ProviderResult<CacheSubnetGroup>;

    /// Returns an error of kind `NotFound` if the subnet group does not exist.
    async fn describe_cache_subnet_group(&self, name: &str) -> ProviderResult<CacheSubnetGroup>;

    /// Sends the description and the full set of subnets.
    async fn modify_cache_subnet_group(
        &self,
        group: &SubnetGroupConfig,
    ) -> ProviderResult<CacheSubnetGroup>;

    async fn delete_cache_subnet_group(&self, name: &str) -> ProviderResult<()>;

    async fn create_user(&self, user: &UserConfig, tags: &Tags) -> ProviderResult<()>;

    /// Returns an error of kind `NotFound` if the user does not exist or is being deleted.
    async fn describe_user(&self, user_id: &str) -> ProviderResult<model::User>;

    async fn modify_user(&self, user_id: &str, changes: &UserChanges) -> ProviderResult<()>;

    async fn delete_user(&self, user_id: &str) -> ProviderResult<()>;
}

/// The fields of a user that changed. Only these are sent.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserChanges {
    pub access_string: Option<String>,
    pub passwords: Option<Vec<String>>,
    pub no_password_required: Option<bool>,
}

impl UserChanges {
    pub fn new(old: &UserConfig, new: &UserConfig) -> Self {
        let authentication_changed = old.passwords != new.passwords
            || old.no_password_required != new.no_password_required;
        Self {
            access_string: (old.access_string != new.access_string)
                .then(|| new.access_string.clone()),
            passwords: (authentication_changed && !new.passwords.is_empty())
                .then(|| new.passwords.iter().cloned().collect()),
            no_password_required: authentication_changed.then(|| new.no_password_required),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

pub struct ElastiCachePackage;

impl ServicePackage<AwsClients> for ElastiCachePackage {
    fn name(&self) -> &'static str {
        "elasticache"
    }

    fn resources(&self) -> Vec<ResourceRegistration<AwsClients>> {
        vec![
            ResourceRegistration {
                type_name: "aws_elasticache_subnet_group",
                name: "Subnet Group",
                tags: Some(TagsConfig {
                    identifier_attribute: "arn",
                }),
                factory: |clients: &AwsClients| Adapter::boxed(SubnetGroup::new(clients)),
            },
            ResourceRegistration {
                type_name: "aws_elasticache_user",
                name: "User",
                tags: Some(TagsConfig {
                    identifier_attribute: "arn",
                }),
                factory: |clients: &AwsClients| Adapter::boxed(User::new(clients)),
            },
        ]
    }

    fn data_sources(&self) -> Vec<DataSourceRegistration<AwsClients>> {
        vec![
            DataSourceRegistration {
                type_name: "aws_elasticache_subnet_group",
                name: "Subnet Group",
                factory: |clients: &AwsClients| {
                    DataSourceAdapter::boxed(SubnetGroupDataSource::new(clients))
                },
            },
            DataSourceRegistration {
                type_name: "aws_elasticache_user",
                name: "User",
                factory: |clients: &AwsClients| {
                    DataSourceAdapter::boxed(UserDataSource::new(clients))
                },
            },
        ]
    }
}
