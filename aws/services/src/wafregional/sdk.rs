use super::WafRegionalApi;
use crate::error::{never, sdk_error};
use crate::tagging::TaggingApi;
use async_trait::async_trait;
use aws_sdk_wafregional::error::{
    DeleteRuleGroupError, GetRuleGroupError, ListActivatedRulesInRuleGroupError,
    ListTagsForResourceError, TagResourceError, UntagResourceError, UpdateRuleGroupError,
};
use aws_sdk_wafregional::model::{ActivatedRule, RuleGroup, RuleGroupUpdate, Tag};
use aws_types::SdkConfig;
use provider_model::Tags;
use resource_adapter::{ErrorKind, IntoProviderError, ProviderResult};

const PAGE_SIZE: i32 = 100;

/// [`WafRegionalApi`] over the AWS SDK.
pub struct SdkWafRegional {
    client: aws_sdk_wafregional::Client,
}

impl SdkWafRegional {
    pub fn new(config: &SdkConfig, endpoint: Option<&str>) -> Self {
        let mut builder = aws_sdk_wafregional::config::Builder::from(config);
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        Self {
            client: aws_sdk_wafregional::Client::from_conf(builder.build()),
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

#[async_trait]
impl WafRegionalApi for SdkWafRegional {
    async fn get_change_token(&self) -> ProviderResult<String> {
        let output = self
            .client
            .get_change_token()
            .send()
            .await
            .map_err(|e| sdk_error(e, never, "Unable to get a change token"))?;
        output
            .change_token()
            .map(str::to_string)
            .context(ErrorKind::Api, "The change token response was empty")
    }

    async fn create_rule_group(
        &self,
        name: &str,
        metric_name: &str,
        change_token: &str,
        tags: &Tags,
    ) -> ProviderResult<RuleGroup> {
        let output = self
            .client
            .create_rule_group()
            .name(name)
            .metric_name(metric_name)
            .change_token(change_token)
            .set_tags(tag_list(tags))
            .send()
            .await
            .map_err(|e| sdk_error(e, never, format!("Unable to create rule group '{}'", name)))?;
        output.rule_group().cloned().context(
            ErrorKind::Api,
            format!("The response for rule group '{}' was empty", name),
        )
    }

    async fn get_rule_group(&self, id: &str) -> ProviderResult<RuleGroup> {
        let output = self
            .client
            .get_rule_group()
            .rule_group_id(id)
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    GetRuleGroupError::is_waf_nonexistent_item_exception,
                    format!("Unable to get rule group '{}'", id),
                )
            })?;
        output.rule_group().cloned().context(
            ErrorKind::NotFound,
            format!("Rule group '{}' was not returned", id),
        )
    }

    async fn list_activated_rules(&self, id: &str) -> ProviderResult<Vec<ActivatedRule>> {
        let mut rules = Vec::new();
        let mut next_marker = None;
        loop {
            let output = self
                .client
                .list_activated_rules_in_rule_group()
                .rule_group_id(id)
                .limit(PAGE_SIZE)
                .set_next_marker(next_marker)
                .send()
                .await
                .map_err(|e| {
                    sdk_error(
                        e,
                        ListActivatedRulesInRuleGroupError::is_waf_nonexistent_item_exception,
                        format!("Unable to list the rules of rule group '{}'", id),
                    )
                })?;
            rules.extend(output.activated_rules().unwrap_or_default().iter().cloned());
            next_marker = output.next_marker().map(str::to_string);
            if next_marker.is_none() {
                return Ok(rules);
            }
        }
    }

    async fn update_rule_group(
        &self,
        id: &str,
        updates: Vec<RuleGroupUpdate>,
        change_token: &str,
    ) -> ProviderResult<()> {
        self.client
            .update_rule_group()
            .rule_group_id(id)
            .set_updates(Some(updates))
            .change_token(change_token)
            .send()
            .await
            .map_err(|e| {
                // Also raised for a rule that does not exist; the caller checks the group.
                sdk_error(
                    e,
                    UpdateRuleGroupError::is_waf_nonexistent_item_exception,
                    format!("Unable to update rule group '{}'", id),
                )
            })?;
        Ok(())
    }

    async fn delete_rule_group(&self, id: &str, change_token: &str) -> ProviderResult<()> {
        self.client
            .delete_rule_group()
            .rule_group_id(id)
            .change_token(change_token)
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    DeleteRuleGroupError::is_waf_nonexistent_item_exception,
                    format!("Unable to delete rule group '{}'", id),
                )
            })?;
        Ok(())
    }
}

#[async_trait]
impl TaggingApi for SdkWafRegional {
    async fn list_tags(&self, arn: &str) -> ProviderResult<Tags> {
        let mut tags = Tags::new();
        let mut next_marker = None;
        loop {
            let output = self
                .client
                .list_tags_for_resource()
                .resource_arn(arn)
                .limit(PAGE_SIZE)
                .set_next_marker(next_marker)
                .send()
                .await
                .map_err(|e| {
                    sdk_error(
                        e,
                        ListTagsForResourceError::is_waf_nonexistent_item_exception,
                        format!("Unable to list tags for '{}'", arn),
                    )
                })?;
            let tag_list = output
                .tag_info_for_resource()
                .and_then(|info| info.tag_list())
                .unwrap_or_default();
            tags.extend(tag_list.iter().map(|tag| {
                (
                    tag.key().unwrap_or_default().to_string(),
                    tag.value().unwrap_or_default().to_string(),
                )
            }));
            next_marker = output.next_marker().map(str::to_string);
            if next_marker.is_none() {
                return Ok(tags);
            }
        }
    }

    async fn tag_resource(&self, arn: &str, tags: &Tags) -> ProviderResult<()> {
        self.client
            .tag_resource()
            .resource_arn(arn)
            .set_tags(tag_list(tags))
            .send()
            .await
            .map_err(|e| {
                sdk_error(
                    e,
                    TagResourceError::is_waf_nonexistent_item_exception,
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
                    UntagResourceError::is_waf_nonexistent_item_exception,
                    format!("Unable to untag '{}'", arn),
                )
            })?;
        Ok(())
    }
}
