use super::WafRegionalApi;
use crate::clients::{AccountInfo, AwsClients};
use crate::convert::{number, string};
use crate::tagging::{read_tags, update_tags};
use async_trait::async_trait;
use aws_resource_types::wafregional::{ActivatedRule, RuleAction, RuleGroupConfig};
use aws_sdk_wafregional::model::{self, ChangeAction, RuleGroupUpdate};
use log::{debug, info};
use provider_model::tags::merge_defaults;
use provider_model::{OpaqueId, Tags};
use resource_adapter::{
    Create, Delete, ErrorKind, IntoProviderError, ProviderError, ProviderResult, Read,
    ResourceType, Schema, Spec, Update,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// `aws_wafregional_rule_group`.
pub struct RuleGroup {
    api: Arc<dyn WafRegionalApi>,
    account: AccountInfo,
    default_tags: Tags,
}

impl RuleGroup {
    pub fn new(clients: &AwsClients) -> Self {
        Self {
            api: clients.wafregional.clone(),
            account: clients.account.clone(),
            default_tags: clients.default_tags.clone(),
        }
    }

    fn arn(&self, id: &OpaqueId) -> String {
        self.account.arn("waf-regional", &format!("rulegroup/{}", id))
    }

    async fn apply_updates(
        &self,
        id: &OpaqueId,
        updates: Vec<RuleGroupUpdate>,
    ) -> ProviderResult<()> {
        if updates.is_empty() {
            return Ok(());
        }
        debug!("Sending {} rule changes to rule group '{}'", updates.len(), id);
        let token = self.api.get_change_token().await?;
        match self.api.update_rule_group(id.as_str(), updates, &token).await {
            // The API reports a missing rule the same way as a missing group.
            Err(e) if e.is_not_found() => {
                self.api.get_rule_group(id.as_str()).await?;
                Err(ProviderError::new_with_source_and_context(
                    ErrorKind::Api,
                    format!("A rule in the changes to rule group '{}' does not exist", id),
                    e,
                ))
            }
            result => result,
        }
    }
}

fn expand_rule(rule: &ActivatedRule) -> model::ActivatedRule {
    model::ActivatedRule::builder()
        .action(
            model::WafAction::builder()
                .r#type(model::WafActionType::from(
                    rule.action.action_type.to_string().as_str(),
                ))
                .build(),
        )
        .priority(rule.priority)
        .rule_id(&rule.rule_id)
        .r#type(model::WafRuleType::from(rule.rule_type.to_string().as_str()))
        .build()
}

/// Rules with an action type this provider does not know are dropped.
fn flatten_rule(rule: &model::ActivatedRule) -> Option<ActivatedRule> {
    let action_type = rule
        .action()
        .and_then(|action| action.r#type())
        .and_then(|action_type| action_type.as_str().parse().ok())?;
    Some(ActivatedRule {
        action: RuleAction { action_type },
        priority: number::<i32>(rule.priority()).unwrap_or_default(),
        rule_id: string(rule.rule_id()),
        rule_type: rule
            .r#type()
            .and_then(|rule_type| rule_type.as_str().parse().ok())
            .unwrap_or_default(),
    })
}

fn rule_update(action: ChangeAction, rule: model::ActivatedRule) -> RuleGroupUpdate {
    RuleGroupUpdate::builder()
        .action(action)
        .activated_rule(rule)
        .build()
}

/// The updates that turn the `old` set of rules into the `new` one: removed rules are deleted
/// first, then added rules are inserted. A rule whose priority or action changed is both.
pub fn rule_updates(
    old: &BTreeSet<ActivatedRule>,
    new: &BTreeSet<ActivatedRule>,
) -> Vec<RuleGroupUpdate> {
    let deletes = old
        .difference(new)
        .map(|rule| rule_update(ChangeAction::Delete, expand_rule(rule)));
    let inserts = new
        .difference(old)
        .map(|rule| rule_update(ChangeAction::Insert, expand_rule(rule)));
    deletes.chain(inserts).collect()
}

impl ResourceType for RuleGroup {
    const TYPE_NAME: &'static str = "aws_wafregional_rule_group";
    type Config = RuleGroupConfig;
    type Id = OpaqueId;

    fn schema() -> Schema {
        Schema::new()
            .force_new("name")
            .force_new("metric_name")
            .computed("arn")
    }
}

#[async_trait]
impl Create for RuleGroup {
    async fn create(&self, spec: &Spec<RuleGroupConfig>) -> ProviderResult<OpaqueId> {
        let config = &spec.configuration;
        info!("Creating rule group '{}'", config.name);
        let tags = merge_defaults(&self.default_tags, &spec.tags);
        let token = self.api.get_change_token().await?;
        let group = self
            .api
            .create_rule_group(&config.name, &config.metric_name, &token, &tags)
            .await?;
        let id = group
            .rule_group_id()
            .map(OpaqueId::new)
            .context(
                ErrorKind::Api,
                format!("Rule group '{}' was created without an ID", config.name),
            )?;
        self.apply_updates(&id, rule_updates(&BTreeSet::new(), &config.activated_rule))
            .await
            .map_err(|e| e.with_remaining(&id))?;
        Ok(id)
    }
}

#[async_trait]
impl Read for RuleGroup {
    async fn read(&self, id: &OpaqueId) -> ProviderResult<Spec<RuleGroupConfig>> {
        let group = self.api.get_rule_group(id.as_str()).await?;
        let rules = self.api.list_activated_rules(id.as_str()).await?;
        let arn = self.arn(id);
        let (tags, tags_all) = read_tags(&*self.api, &arn, &self.default_tags).await?;
        Ok(Spec {
            configuration: RuleGroupConfig {
                name: string(group.name()),
                metric_name: string(group.metric_name()),
                activated_rule: rules.iter().filter_map(flatten_rule).collect(),
                arn: Some(arn),
            },
            tags,
            tags_all,
        })
    }
}

#[async_trait]
impl Update for RuleGroup {
    async fn update(
        &self,
        id: &OpaqueId,
        prior: &Spec<RuleGroupConfig>,
        planned: &Spec<RuleGroupConfig>,
    ) -> ProviderResult<()> {
        let updates = rule_updates(
            &prior.configuration.activated_rule,
            &planned.configuration.activated_rule,
        );
        self.apply_updates(id, updates).await?;
        let tags = merge_defaults(&self.default_tags, &planned.tags);
        update_tags(&*self.api, &self.arn(id), &prior.tags_all, &tags).await
    }
}

#[async_trait]
impl Delete for RuleGroup {
    /// A group that still holds rules cannot be deleted, so its rules are removed first.
    async fn delete(&self, id: &OpaqueId) -> ProviderResult<()> {
        info!("Deleting rule group '{}'", id);
        let rules = self.api.list_activated_rules(id.as_str()).await?;
        let updates = rules
            .into_iter()
            .map(|rule| rule_update(ChangeAction::Delete, rule))
            .collect();
        self.apply_updates(id, updates).await?;
        let token = self.api.get_change_token().await?;
        self.api.delete_rule_group(id.as_str(), &token).await
    }
}
