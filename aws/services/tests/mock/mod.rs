/*!

In-memory App Mesh, ElastiCache and WAF Regional services. Each fake keeps its objects and their
tags behind a `Mutex`, records the calls it receives, and builds its responses with the SDK's own
builders so that the adapters' mapping code runs unchanged.

!*/

#![allow(dead_code)]

use async_trait::async_trait;
use aws_resource_types::elasticache::{SubnetGroupConfig, UserConfig};
use aws_sdk_appmesh::model::{
    ResourceMetadata, VirtualGatewayData, VirtualGatewaySpec, VirtualGatewayStatus,
    VirtualGatewayStatusCode,
};
use aws_sdk_elasticache::model::{
    Authentication, AuthenticationType, CacheSubnetGroup, Subnet, User,
};
use aws_sdk_wafregional::model::{ActivatedRule, ChangeAction, RuleGroup, RuleGroupUpdate};
use aws_services::appmesh::{AppMeshApi, VirtualGatewayId};
use aws_services::elasticache::{ElastiCacheApi, UserChanges};
use aws_services::tagging::TaggingApi;
use aws_services::wafregional::WafRegionalApi;
use aws_services::{AccountInfo, AwsClients};
use aws_smithy_types::DateTime;
use provider_model::Tags;
use resource_adapter::{CancellationToken, ErrorKind, ProviderError, ProviderResult};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ACCOUNT_ID: &str = "123456789012";
pub const REGION: &str = "us-west-2";
pub const VPC_ID: &str = "vpc-0a1b2c3d";

fn not_found<S: Into<String>>(what: S) -> ProviderError {
    ProviderError::new_with_context(ErrorKind::NotFound, what)
}

fn api_error<S: Into<String>>(what: S) -> ProviderError {
    ProviderError::new_with_context(ErrorKind::Api, what)
}

/// The call log every fake keeps.
#[derive(Debug, Default)]
pub struct Calls(Mutex<Vec<String>>);

impl Calls {
    fn record(&self, call: &str) {
        self.0.lock().unwrap().push(call.to_string());
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.all().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// Tags by ARN. An ARN is only known while its object exists.
#[derive(Debug, Default)]
pub struct TagStore(Mutex<BTreeMap<String, Tags>>);

impl TagStore {
    fn insert(&self, arn: &str, tags: &Tags) {
        self.0.lock().unwrap().insert(arn.to_string(), tags.clone());
    }

    fn remove(&self, arn: &str) {
        self.0.lock().unwrap().remove(arn);
    }

    pub fn get(&self, arn: &str) -> Option<Tags> {
        self.0.lock().unwrap().get(arn).cloned()
    }

    fn list(&self, calls: &Calls, arn: &str) -> ProviderResult<Tags> {
        calls.record("list_tags");
        self.get(arn)
            .ok_or_else(|| not_found(format!("No resource with ARN '{}'", arn)))
    }

    fn tag(&self, calls: &Calls, arn: &str, tags: &Tags) -> ProviderResult<()> {
        calls.record("tag_resource");
        let mut store = self.0.lock().unwrap();
        let existing = store
            .get_mut(arn)
            .ok_or_else(|| not_found(format!("No resource with ARN '{}'", arn)))?;
        existing.extend(tags.clone());
        Ok(())
    }

    fn untag(&self, calls: &Calls, arn: &str, keys: &[String]) -> ProviderResult<()> {
        calls.record("untag_resource");
        let mut store = self.0.lock().unwrap();
        let existing = store
            .get_mut(arn)
            .ok_or_else(|| not_found(format!("No resource with ARN '{}'", arn)))?;
        for key in keys {
            existing.remove(key);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeAppMesh {
    gateways: Mutex<BTreeMap<String, VirtualGatewayData>>,
    cancel_on_create: Mutex<Option<CancellationToken>>,
    pub tags: TagStore,
    pub calls: Calls,
}

fn gateway_key(id: &VirtualGatewayId) -> String {
    format!("{}/{}", id.mesh_name, id.name)
}

pub fn gateway_arn(mesh_name: &str, name: &str) -> String {
    format!(
        "arn:aws:appmesh:{}:{}:mesh/{}/virtualGateway/{}",
        REGION, ACCOUNT_ID, mesh_name, name
    )
}

fn gateway_data(
    id: &VirtualGatewayId,
    spec: VirtualGatewaySpec,
    created_at: i64,
    updated_at: i64,
) -> VirtualGatewayData {
    let owner = id.mesh_owner.as_deref().unwrap_or(ACCOUNT_ID);
    VirtualGatewayData::builder()
        .mesh_name(&id.mesh_name)
        .virtual_gateway_name(&id.name)
        .spec(spec)
        .metadata(
            ResourceMetadata::builder()
                .arn(gateway_arn(&id.mesh_name, &id.name))
                .mesh_owner(owner)
                .resource_owner(ACCOUNT_ID)
                .created_at(DateTime::from_secs(created_at))
                .last_updated_at(DateTime::from_secs(updated_at))
                .build(),
        )
        .status(
            VirtualGatewayStatus::builder()
                .status(VirtualGatewayStatusCode::Active)
                .build(),
        )
        .build()
}

impl FakeAppMesh {
    /// The spec last sent for a gateway.
    pub fn spec(&self, mesh_name: &str, name: &str) -> Option<VirtualGatewaySpec> {
        self.gateways
            .lock()
            .unwrap()
            .get(&format!("{}/{}", mesh_name, name))
            .and_then(|data| data.spec().cloned())
    }

    /// Delete a gateway behind the provider's back.
    pub fn remove(&self, mesh_name: &str, name: &str) {
        self.gateways
            .lock()
            .unwrap()
            .remove(&format!("{}/{}", mesh_name, name));
        self.tags.remove(&gateway_arn(mesh_name, name));
    }

    pub fn len(&self) -> usize {
        self.gateways.lock().unwrap().len()
    }

    /// Cancel `cancel` once the next gateway has been created.
    pub fn cancel_after_create(&self, cancel: CancellationToken) {
        *self.cancel_on_create.lock().unwrap() = Some(cancel);
    }
}

#[async_trait]
impl AppMeshApi for FakeAppMesh {
    async fn create_virtual_gateway(
        &self,
        id: &VirtualGatewayId,
        spec: VirtualGatewaySpec,
        tags: &Tags,
    ) -> ProviderResult<VirtualGatewayData> {
        self.calls.record("create_virtual_gateway");
        let mut gateways = self.gateways.lock().unwrap();
        if gateways.contains_key(&gateway_key(id)) {
            return Err(api_error(format!("Virtual gateway '{}' already exists", id)));
        }
        let data = gateway_data(id, spec, 1_600_000_000, 1_600_000_000);
        self.tags.insert(&gateway_arn(&id.mesh_name, &id.name), tags);
        gateways.insert(gateway_key(id), data.clone());
        if let Some(cancel) = self.cancel_on_create.lock().unwrap().take() {
            cancel.cancel();
        }
        Ok(data)
    }

    async fn describe_virtual_gateway(
        &self,
        id: &VirtualGatewayId,
    ) -> ProviderResult<VirtualGatewayData> {
        self.calls.record("describe_virtual_gateway");
        self.gateways
            .lock()
            .unwrap()
            .get(&gateway_key(id))
            .cloned()
            .ok_or_else(|| not_found(format!("Virtual gateway '{}' not found", id)))
    }

    async fn update_virtual_gateway(
        &self,
        id: &VirtualGatewayId,
        spec: VirtualGatewaySpec,
    ) -> ProviderResult<VirtualGatewayData> {
        self.calls.record("update_virtual_gateway");
        let mut gateways = self.gateways.lock().unwrap();
        if !gateways.contains_key(&gateway_key(id)) {
            return Err(not_found(format!("Virtual gateway '{}' not found", id)));
        }
        let data = gateway_data(id, spec, 1_600_000_000, 1_700_000_000);
        gateways.insert(gateway_key(id), data.clone());
        Ok(data)
    }

    async fn delete_virtual_gateway(&self, id: &VirtualGatewayId) -> ProviderResult<()> {
        self.calls.record("delete_virtual_gateway");
        self.gateways
            .lock()
            .unwrap()
            .remove(&gateway_key(id))
            .ok_or_else(|| not_found(format!("Virtual gateway '{}' not found", id)))?;
        self.tags.remove(&gateway_arn(&id.mesh_name, &id.name));
        Ok(())
    }
}

#[async_trait]
impl TaggingApi for FakeAppMesh {
    async fn list_tags(&self, arn: &str) -> ProviderResult<Tags> {
        self.tags.list(&self.calls, arn)
    }

    async fn tag_resource(&self, arn: &str, tags: &Tags) -> ProviderResult<()> {
        self.tags.tag(&self.calls, arn, tags)
    }

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> ProviderResult<()> {
        self.tags.untag(&self.calls, arn, keys)
    }
}

/// WAF Regional hands out change tokens; each one may be used for a single change.
#[derive(Debug, Default)]
pub struct FakeWafRegional {
    groups: Mutex<BTreeMap<String, (RuleGroup, Vec<ActivatedRule>)>>,
    tokens: Mutex<BTreeSet<String>>,
    missing_rules: Mutex<BTreeSet<String>>,
    next: AtomicUsize,
    pub tags: TagStore,
    pub calls: Calls,
}

pub fn rule_group_arn(id: &str) -> String {
    format!(
        "arn:aws:waf-regional:{}:{}:rulegroup/{}",
        REGION, ACCOUNT_ID, id
    )
}

impl FakeWafRegional {
    fn use_token(&self, token: &str) -> ProviderResult<()> {
        if self.tokens.lock().unwrap().remove(token) {
            Ok(())
        } else {
            Err(api_error(format!("Change token '{}' is stale", token)))
        }
    }

    /// The rule IDs in a group, in the order they were inserted.
    pub fn rule_ids(&self, id: &str) -> Vec<String> {
        self.groups
            .lock()
            .unwrap()
            .get(id)
            .map(|(_, rules)| {
                rules
                    .iter()
                    .filter_map(|rule| rule.rule_id().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.groups.lock().unwrap().len()
    }

    /// Make `rule_id` name a rule that does not exist.
    pub fn remove_rule(&self, rule_id: &str) {
        self.missing_rules.lock().unwrap().insert(rule_id.to_string());
    }
}

#[async_trait]
impl WafRegionalApi for FakeWafRegional {
    async fn get_change_token(&self) -> ProviderResult<String> {
        self.calls.record("get_change_token");
        let token = format!("token-{}", self.next.fetch_add(1, Ordering::SeqCst));
        self.tokens.lock().unwrap().insert(token.clone());
        Ok(token)
    }

    async fn create_rule_group(
        &self,
        name: &str,
        metric_name: &str,
        change_token: &str,
        tags: &Tags,
    ) -> ProviderResult<RuleGroup> {
        self.calls.record("create_rule_group");
        self.use_token(change_token)?;
        let id = format!("rg-{}", self.next.fetch_add(1, Ordering::SeqCst));
        let group = RuleGroup::builder()
            .rule_group_id(&id)
            .name(name)
            .metric_name(metric_name)
            .build();
        self.tags.insert(&rule_group_arn(&id), tags);
        self.groups
            .lock()
            .unwrap()
            .insert(id, (group.clone(), Vec::new()));
        Ok(group)
    }

    async fn get_rule_group(&self, id: &str) -> ProviderResult<RuleGroup> {
        self.calls.record("get_rule_group");
        self.groups
            .lock()
            .unwrap()
            .get(id)
            .map(|(group, _)| group.clone())
            .ok_or_else(|| not_found(format!("Rule group '{}' not found", id)))
    }

    async fn list_activated_rules(&self, id: &str) -> ProviderResult<Vec<ActivatedRule>> {
        self.calls.record("list_activated_rules");
        self.groups
            .lock()
            .unwrap()
            .get(id)
            .map(|(_, rules)| rules.clone())
            .ok_or_else(|| not_found(format!("Rule group '{}' not found", id)))
    }

    async fn update_rule_group(
        &self,
        id: &str,
        updates: Vec<RuleGroupUpdate>,
        change_token: &str,
    ) -> ProviderResult<()> {
        self.calls.record("update_rule_group");
        self.use_token(change_token)?;
        let mut groups = self.groups.lock().unwrap();
        let (_, stored) = groups
            .get_mut(id)
            .ok_or_else(|| not_found(format!("Rule group '{}' not found", id)))?;
        // All changes apply or none do.
        let mut rules = stored.clone();
        for update in updates {
            let rule = update
                .activated_rule()
                .cloned()
                .ok_or_else(|| api_error("An update has no rule"))?;
            match update.action() {
                Some(ChangeAction::Insert) => {
                    let rule_id = rule.rule_id().unwrap_or_default();
                    if self.missing_rules.lock().unwrap().contains(rule_id) {
                        return Err(not_found(format!("Rule '{}' does not exist", rule_id)));
                    }
                    if rules.iter().any(|r| r.rule_id() == rule.rule_id()) {
                        return Err(api_error("The rule is already in the group"));
                    }
                    rules.push(rule);
                }
                Some(ChangeAction::Delete) => {
                    let before = rules.len();
                    rules.retain(|r| r != &rule);
                    if rules.len() == before {
                        return Err(not_found("The rule to delete is not in the group"));
                    }
                }
                _ => return Err(api_error("Unknown change action")),
            }
        }
        *stored = rules;
        Ok(())
    }

    async fn delete_rule_group(&self, id: &str, change_token: &str) -> ProviderResult<()> {
        self.calls.record("delete_rule_group");
        self.use_token(change_token)?;
        let mut groups = self.groups.lock().unwrap();
        match groups.get(id) {
            None => return Err(not_found(format!("Rule group '{}' not found", id))),
            Some((_, rules)) if !rules.is_empty() => {
                return Err(api_error(format!("Rule group '{}' still has rules", id)))
            }
            Some(_) => {}
        }
        groups.remove(id);
        self.tags.remove(&rule_group_arn(id));
        Ok(())
    }
}

#[async_trait]
impl TaggingApi for FakeWafRegional {
    async fn list_tags(&self, arn: &str) -> ProviderResult<Tags> {
        self.tags.list(&self.calls, arn)
    }

    async fn tag_resource(&self, arn: &str, tags: &Tags) -> ProviderResult<()> {
        self.tags.tag(&self.calls, arn, tags)
    }

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> ProviderResult<()> {
        self.tags.untag(&self.calls, arn, keys)
    }
}

#[derive(Debug, Default)]
pub struct FakeElastiCache {
    subnet_groups: Mutex<BTreeMap<String, CacheSubnetGroup>>,
    users: Mutex<BTreeMap<String, (User, Vec<String>)>>,
    pub tags: TagStore,
    pub calls: Calls,
}

pub fn subnet_group_arn(name: &str) -> String {
    format!(
        "arn:aws:elasticache:{}:{}:subnetgroup:{}",
        REGION, ACCOUNT_ID, name
    )
}

pub fn user_arn(user_id: &str) -> String {
    format!("arn:aws:elasticache:{}:{}:user:{}", REGION, ACCOUNT_ID, user_id)
}

fn subnet_group(group: &SubnetGroupConfig) -> CacheSubnetGroup {
    CacheSubnetGroup::builder()
        .cache_subnet_group_name(&group.name)
        .cache_subnet_group_description(&group.description)
        .vpc_id(VPC_ID)
        .set_subnets(Some(
            group
                .subnet_ids
                .iter()
                .map(|id| Subnet::builder().subnet_identifier(id).build())
                .collect(),
        ))
        .arn(subnet_group_arn(&group.name))
        .build()
}

fn user(
    user_id: &str,
    user_name: &str,
    engine: &str,
    access_string: &str,
    no_password_required: bool,
    password_count: usize,
) -> User {
    let authentication_type = if no_password_required {
        "no-password"
    } else {
        "password"
    };
    User::builder()
        .user_id(user_id)
        .user_name(user_name)
        .engine(engine)
        .access_string(access_string)
        .status("active")
        .arn(user_arn(user_id))
        .authentication(
            Authentication::builder()
                .r#type(AuthenticationType::from(authentication_type))
                .password_count(password_count as i32)
                .build(),
        )
        .build()
}

impl FakeElastiCache {
    /// The passwords last sent for a user.
    pub fn passwords(&self, user_id: &str) -> Option<Vec<String>> {
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .map(|(_, passwords)| passwords.clone())
    }

    pub fn engine(&self, user_id: &str) -> Option<String> {
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .and_then(|(user, _)| user.engine().map(str::to_string))
    }

    /// Create a subnet group that the provider does not manage.
    pub fn seed_subnet_group(&self, group: &SubnetGroupConfig, tags: &Tags) {
        self.tags.insert(&subnet_group_arn(&group.name), tags);
        self.subnet_groups
            .lock()
            .unwrap()
            .insert(group.name.clone(), subnet_group(group));
    }
}

#[async_trait]
impl ElastiCacheApi for FakeElastiCache {
    async fn create_cache_subnet_group(
        &self,
        group: &SubnetGroupConfig,
        tags: &Tags,
    ) -> ProviderResult<CacheSubnetGroup> {
        self.calls.record("create_cache_subnet_group");
        let mut groups = self.subnet_groups.lock().unwrap();
        if groups.contains_key(&group.name) {
            return Err(api_error(format!("Subnet group '{}' already exists", group.name)));
        }
        let created = subnet_group(group);
        self.tags.insert(&subnet_group_arn(&group.name), tags);
        groups.insert(group.name.clone(), created.clone());
        Ok(created)
    }

    async fn describe_cache_subnet_group(&self, name: &str) -> ProviderResult<CacheSubnetGroup> {
        self.calls.record("describe_cache_subnet_group");
        self.subnet_groups
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(format!("Subnet group '{}' not found", name)))
    }

    async fn modify_cache_subnet_group(
        &self,
        group: &SubnetGroupConfig,
    ) -> ProviderResult<CacheSubnetGroup> {
        self.calls.record("modify_cache_subnet_group");
        let mut groups = self.subnet_groups.lock().unwrap();
        let existing = groups
            .get_mut(&group.name)
            .ok_or_else(|| not_found(format!("Subnet group '{}' not found", group.name)))?;
        *existing = subnet_group(group);
        Ok(existing.clone())
    }

    async fn delete_cache_subnet_group(&self, name: &str) -> ProviderResult<()> {
        self.calls.record("delete_cache_subnet_group");
        self.subnet_groups
            .lock()
            .unwrap()
            .remove(name)
            .ok_or_else(|| not_found(format!("Subnet group '{}' not found", name)))?;
        self.tags.remove(&subnet_group_arn(name));
        Ok(())
    }

    async fn create_user(&self, config: &UserConfig, tags: &Tags) -> ProviderResult<()> {
        self.calls.record("create_user");
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&config.user_id) {
            return Err(api_error(format!("User '{}' already exists", config.user_id)));
        }
        let passwords: Vec<String> = config.passwords.iter().cloned().collect();
        let created = user(
            &config.user_id,
            &config.user_name,
            &config.engine.to_string().to_lowercase(),
            &config.access_string,
            config.no_password_required,
            passwords.len(),
        );
        self.tags.insert(&user_arn(&config.user_id), tags);
        users.insert(config.user_id.clone(), (created, passwords));
        Ok(())
    }

    async fn describe_user(&self, user_id: &str) -> ProviderResult<User> {
        self.calls.record("describe_user");
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .map(|(user, _)| user.clone())
            .ok_or_else(|| not_found(format!("User '{}' not found", user_id)))
    }

    async fn modify_user(&self, user_id: &str, changes: &UserChanges) -> ProviderResult<()> {
        self.calls.record("modify_user");
        let mut users = self.users.lock().unwrap();
        let (existing, passwords) = users
            .get_mut(user_id)
            .ok_or_else(|| not_found(format!("User '{}' not found", user_id)))?;
        if let Some(new_passwords) = &changes.passwords {
            *passwords = new_passwords.clone();
        }
        let no_password_required = match changes.no_password_required {
            Some(true) => {
                passwords.clear();
                true
            }
            Some(false) => false,
            None => {
                existing
                    .authentication()
                    .and_then(|authentication| authentication.r#type())
                    .map(|kind| kind.as_str())
                    == Some("no-password")
            }
        };
        let access_string = changes
            .access_string
            .clone()
            .or_else(|| existing.access_string().map(str::to_string))
            .unwrap_or_default();
        *existing = user(
            user_id,
            existing.user_name().unwrap_or_default(),
            existing.engine().unwrap_or_default(),
            &access_string,
            no_password_required,
            passwords.len(),
        );
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> ProviderResult<()> {
        self.calls.record("delete_user");
        self.users
            .lock()
            .unwrap()
            .remove(user_id)
            .ok_or_else(|| not_found(format!("User '{}' not found", user_id)))?;
        self.tags.remove(&user_arn(user_id));
        Ok(())
    }
}

#[async_trait]
impl TaggingApi for FakeElastiCache {
    async fn list_tags(&self, arn: &str) -> ProviderResult<Tags> {
        self.tags.list(&self.calls, arn)
    }

    async fn tag_resource(&self, arn: &str, tags: &Tags) -> ProviderResult<()> {
        self.tags.tag(&self.calls, arn, tags)
    }

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> ProviderResult<()> {
        self.tags.untag(&self.calls, arn, keys)
    }
}

/// The fakes together with the clients that point at them.
pub struct Fakes {
    pub appmesh: Arc<FakeAppMesh>,
    pub elasticache: Arc<FakeElastiCache>,
    pub wafregional: Arc<FakeWafRegional>,
    pub clients: AwsClients,
}

pub fn fakes(default_tags: Tags) -> Fakes {
    let appmesh = Arc::new(FakeAppMesh::default());
    let elasticache = Arc::new(FakeElastiCache::default());
    let wafregional = Arc::new(FakeWafRegional::default());
    let clients = AwsClients {
        account: AccountInfo {
            account_id: ACCOUNT_ID.to_string(),
            partition: "aws".to_string(),
            region: REGION.to_string(),
        },
        default_tags,
        appmesh: appmesh.clone(),
        elasticache: elasticache.clone(),
        wafregional: wafregional.clone(),
    };
    Fakes {
        appmesh,
        elasticache,
        wafregional,
        clients,
    }
}

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}
