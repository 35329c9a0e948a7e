/*!

Configuration of `aws_wafregional_rule_group`: a named, reusable group of rules that a web ACL can
reference as a single unit.

!*/

use configuration_derive::Configuration;
use provider_model::validation::{length, matches};
use provider_model::{block, AttributePath, Result, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_plain::{derive_display_from_serialize, derive_fromstr_from_deserialize};
use std::collections::BTreeSet;

lazy_static::lazy_static! {
    static ref METRIC_NAME: Regex = Regex::new("^[0-9A-Za-z]+$").unwrap();
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Configuration)]
pub struct RuleGroupConfig {
    pub name: String,
    pub metric_name: String,
    /// The rules in the group. Order does not matter; `priority` decides evaluation order.
    #[serde(default)]
    pub activated_rule: BTreeSet<ActivatedRule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
}

impl Validate for RuleGroupConfig {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        length(&path.attr("name"), &self.name, 1, 128)?;
        length(&path.attr("metric_name"), &self.metric_name, 1, 128)?;
        matches(
            &path.attr("metric_name"),
            &self.metric_name,
            &METRIC_NAME,
            "must contain only alphanumeric characters",
        )?;
        for (i, rule) in self.activated_rule.iter().enumerate() {
            rule.validate_at(&path.attr("activated_rule").index(i))?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ActivatedRule {
    #[serde(with = "block::required")]
    pub action: RuleAction,
    pub priority: i32,
    pub rule_id: String,
    #[serde(rename = "type", default)]
    pub rule_type: WafRuleType,
}

impl Validate for ActivatedRule {
    fn validate_at(&self, path: &AttributePath) -> Result<()> {
        length(&path.attr("rule_id"), &self.rule_id, 1, 128)
    }
}

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct RuleAction {
    #[serde(rename = "type")]
    pub action_type: WafActionType,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WafActionType {
    Block,
    Allow,
    Count,
}

impl Default for WafActionType {
    fn default() -> Self {
        Self::Block
    }
}

derive_display_from_serialize!(WafActionType);
derive_fromstr_from_deserialize!(WafActionType);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WafRuleType {
    Regular,
    RateBased,
    Group,
}

impl Default for WafRuleType {
    fn default() -> Self {
        Self::Regular
    }
}

derive_display_from_serialize!(WafRuleType);
derive_fromstr_from_deserialize!(WafRuleType);
