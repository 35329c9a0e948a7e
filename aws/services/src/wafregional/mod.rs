/*!

WAF Regional: the `aws_wafregional_rule_group` resource.

Every write to WAF Classic must carry a change token that has not been used before, so the adapter
asks for a fresh one immediately before each create, update and delete call.

!*/

mod rule_group;
mod sdk;

pub use rule_group::{rule_updates, RuleGroup};
pub use sdk::SdkWafRegional;

use crate::clients::AwsClients;
use crate::tagging::TaggingApi;
use async_trait::async_trait;
use aws_sdk_wafregional::model::{self, ActivatedRule, RuleGroupUpdate};
use provider_model::Tags;
use resource_adapter::{Adapter, ProviderResult, ResourceRegistration, ServicePackage, TagsConfig};

/// The WAF Regional calls the rule group adapter makes.
#[async_trait]
pub trait WafRegionalApi: TaggingApi {
    async fn get_change_token(&self) -> ProviderResult<String>;

    async fn create_rule_group(
        &self,
        name: &str,
        metric_name: &str,
        change_token: &str,
        tags: &Tags,
    ) -> ProviderResult<model::RuleGroup>;

    /// Returns an error of kind `NotFound` if the rule group does not exist.
    async fn get_rule_group(&self, id: &str) -> ProviderResult<model::RuleGroup>;

    /// Every rule in the group, across all pages.
    async fn list_activated_rules(&self, id: &str) -> ProviderResult<Vec<ActivatedRule>>;

    async fn update_rule_group(
        &self,
        id: &str,
        updates: Vec<RuleGroupUpdate>,
        change_token: &str,
    ) -> ProviderResult<()>;

    async fn delete_rule_group(&self, id: &str, change_token: &str) -> ProviderResult<()>;
}

pub struct WafRegionalPackage;

impl ServicePackage<AwsClients> for WafRegionalPackage {
    fn name(&self) -> &'static str {
        "wafregional"
    }

    fn resources(&self) -> Vec<ResourceRegistration<AwsClients>> {
        vec![ResourceRegistration {
            type_name: "aws_wafregional_rule_group",
            name: "Rule Group",
            tags: Some(TagsConfig {
                identifier_attribute: "arn",
            }),
            factory: |clients: &AwsClients| Adapter::boxed(RuleGroup::new(clients)),
        }]
    }
}
