/*!

An in-memory "widget" service and a resource adapter for it, so that the `Lifecycle` can be tested
without any remote API. Every call is recorded so tests can assert on what was (or was not) sent.

!*/

use configuration_derive::Configuration;
use provider_model::validation::{in_range, length};
use provider_model::{AttributePath, OpaqueId, Tags, Validate};
use resource_adapter::{
    CancellationToken, Create, DataSource, Delete, ErrorKind, ProviderError, ProviderResult, Read,
    ResourceType, Schema, Spec, Update,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DEFAULT_DESCRIPTION: &str = "Managed by tests";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Configuration)]
pub struct WidgetConfig {
    pub name: String,
    pub size: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sent on create and update, never returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
}

impl Validate for WidgetConfig {
    fn validate_at(&self, path: &AttributePath) -> provider_model::Result<()> {
        length(&path.attr("name"), &self.name, 1, 32)?;
        in_range(&path.attr("size"), self.size, 1, 10)
    }
}

#[derive(Debug, Clone)]
struct Stored {
    config: WidgetConfig,
    tags: Tags,
}

/// The fake remote service.
#[derive(Debug, Default)]
pub struct WidgetService {
    objects: Mutex<BTreeMap<String, Stored>>,
    calls: Mutex<Vec<String>>,
    next_id: AtomicUsize,
    delay: Mutex<Option<Duration>>,
    create_failure: Mutex<Option<CreateFailure>>,
    cancel_on_create: Mutex<Option<CancellationToken>>,
}

/// How the next create fails.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CreateFailure {
    /// The service refuses the create; nothing is stored.
    Rejected,
    /// The widget is stored, then a follow-up call fails.
    AfterCreate,
}

impl WidgetService {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Delete an object behind the adapter's back.
    pub fn remove(&self, id: &str) {
        self.objects.lock().unwrap().remove(id);
    }

    /// Make every subsequent call take `delay`.
    pub fn slow_down(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_next_create(&self, failure: CreateFailure) {
        *self.create_failure.lock().unwrap() = Some(failure);
    }

    /// Cancel `cancel` as soon as the next create has stored its widget.
    pub fn cancel_after_create(&self, cancel: CancellationToken) {
        *self.cancel_on_create.lock().unwrap() = Some(cancel);
    }

    async fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn not_found(id: &str) -> ProviderError {
    ProviderError::new_with_context(ErrorKind::NotFound, format!("widget '{}' not found", id))
}

#[derive(Debug, Clone, Default)]
pub struct Widgets {
    pub service: Arc<WidgetService>,
}

impl ResourceType for Widgets {
    const TYPE_NAME: &'static str = "mock_widget";
    type Config = WidgetConfig;
    type Id = OpaqueId;

    fn schema() -> Schema {
        Schema::new()
            .force_new("name")
            .optional_computed("description")
            .write_only("secret")
            .computed("arn")
    }
}

#[async_trait::async_trait]
impl Create for Widgets {
    async fn create(&self, spec: &Spec<WidgetConfig>) -> ProviderResult<OpaqueId> {
        self.service.record("create").await;
        let failure = self.service.create_failure.lock().unwrap().take();
        if failure == Some(CreateFailure::Rejected) {
            return Err(ProviderError::new_with_context(
                ErrorKind::Api,
                "widget quota exceeded",
            ));
        }
        let n = self.service.next_id.fetch_add(1, Ordering::SeqCst);
        let id = format!("w-{}", n);
        let mut config = spec.configuration.clone();
        config.secret = None;
        config.arn = Some(format!("arn:mock:widget/{}", id));
        if config.description.is_none() {
            config.description = Some(DEFAULT_DESCRIPTION.to_string());
        }
        self.service.objects.lock().unwrap().insert(
            id.clone(),
            Stored {
                config,
                tags: spec.tags.clone(),
            },
        );
        if let Some(cancel) = self.service.cancel_on_create.lock().unwrap().take() {
            cancel.cancel();
        }
        if failure == Some(CreateFailure::AfterCreate) {
            return Err(
                ProviderError::new_with_context(ErrorKind::Api, "unable to attach widget")
                    .with_remaining(&id),
            );
        }
        Ok(OpaqueId::new(id))
    }
}

#[async_trait::async_trait]
impl Read for Widgets {
    async fn read(&self, id: &OpaqueId) -> ProviderResult<Spec<WidgetConfig>> {
        self.service.record("read").await;
        let objects = self.service.objects.lock().unwrap();
        let stored = objects.get(id.as_str()).ok_or_else(|| not_found(id.as_str()))?;
        Ok(Spec {
            configuration: stored.config.clone(),
            tags: stored.tags.clone(),
            tags_all: stored.tags.clone(),
        })
    }
}

#[async_trait::async_trait]
impl Update for Widgets {
    async fn update(
        &self,
        id: &OpaqueId,
        _prior: &Spec<WidgetConfig>,
        planned: &Spec<WidgetConfig>,
    ) -> ProviderResult<()> {
        self.service.record("update").await;
        let mut objects = self.service.objects.lock().unwrap();
        let stored = objects
            .get_mut(id.as_str())
            .ok_or_else(|| not_found(id.as_str()))?;
        stored.config.size = planned.configuration.size;
        if let Some(description) = &planned.configuration.description {
            stored.config.description = Some(description.clone());
        }
        stored.tags = planned.tags.clone();
        Ok(())
    }
}

#[async_trait::async_trait]
impl Delete for Widgets {
    async fn delete(&self, id: &OpaqueId) -> ProviderResult<()> {
        self.service.record("delete").await;
        self.service
            .objects
            .lock()
            .unwrap()
            .remove(id.as_str())
            .map(|_| ())
            .ok_or_else(|| not_found(id.as_str()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Configuration)]
pub struct WidgetLookup {
    pub id: String,
}

impl Validate for WidgetLookup {
    fn validate_at(&self, path: &AttributePath) -> provider_model::Result<()> {
        length(&path.attr("id"), &self.id, 1, 64)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Configuration)]
pub struct WidgetDetails {
    pub id: String,
    pub name: String,
    pub size: u16,
}

/// Looks up an existing widget by ID.
#[derive(Debug, Clone, Default)]
pub struct WidgetData {
    pub service: Arc<WidgetService>,
}

#[async_trait::async_trait]
impl DataSource for WidgetData {
    const TYPE_NAME: &'static str = "mock_widget";
    type Args = WidgetLookup;
    type Output = WidgetDetails;

    async fn read(&self, args: &WidgetLookup) -> ProviderResult<WidgetDetails> {
        self.service.record("read").await;
        let objects = self.service.objects.lock().unwrap();
        let stored = objects.get(&args.id).ok_or_else(|| not_found(&args.id))?;
        Ok(WidgetDetails {
            id: args.id.clone(),
            name: stored.config.name.clone(),
            size: stored.config.size,
        })
    }
}

pub fn widget(name: &str, size: u16) -> Spec<WidgetConfig> {
    Spec::new(WidgetConfig {
        name: name.to_string(),
        size,
        ..WidgetConfig::default()
    })
}
