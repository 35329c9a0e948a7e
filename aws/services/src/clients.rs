use crate::appmesh::{AppMeshApi, SdkAppMesh};
use crate::elasticache::{ElastiCacheApi, SdkElastiCache};
use crate::error::{self, never, sdk_error, Result};
use crate::wafregional::{SdkWafRegional, WafRegionalApi};
use aws_types::SdkConfig;
use log::info;
use provider_model::Tags;
use provider_utils::aws::aws_config;
use provider_utils::config::ProviderConfig;
use snafu::{OptionExt, ResultExt};
use std::sync::Arc;

/// The account, partition and region that ARNs are built for.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccountInfo {
    pub account_id: String,
    pub partition: String,
    pub region: String,
}

impl AccountInfo {
    /// `arn:{partition}:{service}:{region}:{account}:{resource}`
    pub fn arn(&self, service: &str, resource: &str) -> String {
        format!(
            "arn:{}:{}:{}:{}:{}",
            self.partition, service, self.region, self.account_id, resource
        )
    }
}

/// Everything a resource or data source constructor needs: one client per service, the account
/// they act in and the provider's default tags.
#[derive(Clone)]
pub struct AwsClients {
    pub account: AccountInfo,
    pub default_tags: Tags,
    pub appmesh: Arc<dyn AppMeshApi>,
    pub elasticache: Arc<dyn ElastiCacheApi>,
    pub wafregional: Arc<dyn WafRegionalApi>,
}

impl AwsClients {
    /// Build the SDK clients for `config` and look up the caller's account.
    pub async fn new(config: &ProviderConfig) -> Result<Self> {
        let sdk_config = aws_config(config).await;
        let account = caller_account(config, &sdk_config).await?;
        info!(
            "Acting as account '{}' in partition '{}'",
            account.account_id, account.partition
        );
        Ok(Self::from_sdk_config(config, &sdk_config, account))
    }

    /// Clients that have not looked up the caller's account. Validating and planning make no API
    /// calls, so this is all they need.
    pub async fn offline(config: &ProviderConfig) -> Self {
        let sdk_config = aws_config(config).await;
        let account = AccountInfo {
            region: config.region().to_string(),
            ..AccountInfo::default()
        };
        Self::from_sdk_config(config, &sdk_config, account)
    }

    fn from_sdk_config(
        config: &ProviderConfig,
        sdk_config: &SdkConfig,
        account: AccountInfo,
    ) -> Self {
        Self {
            account,
            default_tags: config.default_tags.clone(),
            appmesh: Arc::new(SdkAppMesh::new(sdk_config, config.endpoint("appmesh"))),
            elasticache: Arc::new(SdkElastiCache::new(
                sdk_config,
                config.endpoint("elasticache"),
            )),
            wafregional: Arc::new(SdkWafRegional::new(
                sdk_config,
                config.endpoint("wafregional"),
            )),
        }
    }
}

async fn caller_account(config: &ProviderConfig, sdk_config: &SdkConfig) -> Result<AccountInfo> {
    let mut sts_config = aws_sdk_sts::config::Builder::from(sdk_config);
    if let Some(endpoint) = config.endpoint("sts") {
        sts_config = sts_config.endpoint_url(endpoint);
    }
    let identity = aws_sdk_sts::Client::from_conf(sts_config.build())
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| sdk_error(e, never, "Unable to call sts:GetCallerIdentity"))
        .context(error::CallerIdentitySnafu)?;
    let account_id = identity
        .account()
        .context(error::MissingIdentitySnafu { what: "account" })?;
    let arn = identity
        .arn()
        .context(error::MissingIdentitySnafu { what: "ARN" })?;
    let partition = partition(arn).context(error::IdentityArnSnafu { arn })?;
    Ok(AccountInfo {
        account_id: account_id.to_string(),
        partition: partition.to_string(),
        region: config.region().to_string(),
    })
}

fn partition(arn: &str) -> Option<&str> {
    let mut parts = arn.split(':');
    match (parts.next(), parts.next()) {
        (Some("arn"), Some(partition)) if !partition.is_empty() => Some(partition),
        _ => None,
    }
}
