/*!

The `lifecycle` module defines the `Lifecycle` object which drives one resource instance from its
desired configuration to a remote object and back: plan, create, update, replace, refresh,
import and delete.

!*/

use crate::plan::Plan;
use crate::provider::{ErrorKind, IntoProviderError, ProviderError, ProviderResult, Resource, Spec};
use crate::schema::Schema;
use crate::state::StateDocument;
use log::{debug, info, warn};
use provider_model::{Attributes, Configuration, Validate};
use serde::Serialize;
use std::future::Future;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;

/// Where a resource instance is in its lifecycle.
///
/// `Unknown` → `Created` → (`Unchanged` | `Updated`)* → `Deleted`. An instance whose remote object
/// disappears goes back to `Unknown` and is created again by the next apply.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    Unknown,
    Created,
    Unchanged,
    Updated,
    Deleted,
}

serde_plain::derive_display_from_serialize!(InstanceState);

/// The `Lifecycle` drives a single resource instance. It borrows the resource implementation, owns
/// what is known about the instance, and checks the cancellation token before every remote call
/// and while the call is in flight.
pub struct Lifecycle<'a, R>
where
    R: Resource,
{
    resource: &'a R,
    cancel: CancellationToken,
    state: InstanceState,
    id: Option<R::Id>,
    current: Option<Spec<R::Config>>,
}

impl<'a, R> Lifecycle<'a, R>
where
    R: Resource,
{
    /// A lifecycle for an instance that is not tracked yet.
    pub fn new(resource: &'a R, cancel: CancellationToken) -> Self {
        Self {
            resource,
            cancel,
            state: InstanceState::Unknown,
            id: None,
            current: None,
        }
    }

    /// A lifecycle for an instance recorded in a state document.
    pub fn from_state(
        resource: &'a R,
        cancel: CancellationToken,
        document: &StateDocument,
    ) -> ProviderResult<Self> {
        if document.type_name != R::TYPE_NAME {
            return Err(ProviderError::new_with_context(
                ErrorKind::Validation,
                format!(
                    "State document is for '{}', not '{}'",
                    document.type_name,
                    R::TYPE_NAME
                ),
            ));
        }
        let id = R::Id::from_str(&document.id)
            .context(ErrorKind::Validation, "Unable to parse ID from state")?;
        let current = Spec::<R::Config>::from_value(document.attributes.clone())
            .context(ErrorKind::Validation, "Unable to parse attributes from state")?;
        Ok(Self {
            resource,
            cancel,
            state: InstanceState::Unchanged,
            id: Some(id),
            current: Some(current),
        })
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    pub fn id(&self) -> Option<&R::Id> {
        self.id.as_ref()
    }

    /// The attributes last read back, if the instance is tracked.
    pub fn current(&self) -> Option<&Spec<R::Config>> {
        self.current.as_ref()
    }

    /// The state document for the tracked instance, or `None` when nothing is tracked.
    pub fn state_document(&self) -> ProviderResult<Option<StateDocument>> {
        match (&self.id, &self.current) {
            (Some(id), Some(current)) => Ok(Some(StateDocument {
                type_name: R::TYPE_NAME.to_string(),
                id: id.to_string(),
                attributes: current
                    .clone()
                    .into_value()
                    .context(ErrorKind::Internal, "Unable to serialize state")?,
            })),
            _ => Ok(None),
        }
    }

    /// Compare the tracked attributes with `desired` without calling the API. `None` means the
    /// instance is no longer desired.
    pub fn plan(&self, desired: Option<&Spec<R::Config>>) -> ProviderResult<Plan> {
        let prior = self.current.as_ref().map(attributes).transpose()?;
        let desired = desired.map(attributes).transpose()?;
        Ok(Plan::new(&R::schema(), prior.as_ref(), desired.as_ref()))
    }

    /// Make the remote object match `desired`, creating, updating or replacing it as the plan
    /// requires. Returns the plan that was carried out.
    pub async fn apply(&mut self, desired: Spec<R::Config>) -> ProviderResult<Plan> {
        validate(&desired)?;
        let plan = self.plan(Some(&desired))?;
        debug!("Plan for {}: {}", R::TYPE_NAME, plan);
        match &plan {
            Plan::NoOp => self.state = InstanceState::Unchanged,
            Plan::Create => self.create(&desired).await?,
            Plan::Update { .. } => self.update(&desired).await?,
            Plan::Replace { forced_by } => {
                info!(
                    "Replacing {} '{}', forced by {}",
                    R::TYPE_NAME,
                    self.describe_id(),
                    forced_by.join(", ")
                );
                self.delete_tracked().await?;
                self.create(&desired).await?;
            }
            Plan::Delete => self.destroy().await?,
        }
        Ok(plan)
    }

    /// Refresh the tracked object, then [`apply`](Self::apply). The plan is made against what the
    /// API reports now, so drift is corrected and an object deleted out of band is created again.
    pub async fn reconcile(&mut self, desired: Spec<R::Config>) -> ProviderResult<Plan> {
        validate(&desired)?;
        self.refresh().await?;
        self.apply(desired).await
    }

    /// Update the tracked object in place. Fails with [`ErrorKind::Conflict`] when any changed
    /// attribute forces replacement.
    pub async fn update(&mut self, desired: &Spec<R::Config>) -> ProviderResult<()> {
        validate(desired)?;
        let (id, prior) = match (&self.id, &self.current) {
            (Some(id), Some(prior)) => (id.clone(), prior.clone()),
            _ => {
                return Err(ProviderError::new_with_context(
                    ErrorKind::NotFound,
                    format!("There is no tracked {} to update", R::TYPE_NAME),
                ))
            }
        };
        match self.plan(Some(desired))? {
            Plan::Replace { forced_by } => {
                return Err(ProviderError::new_with_context(
                    ErrorKind::Conflict,
                    format!(
                        "{} '{}' cannot be updated in place, {} forces replacement",
                        R::TYPE_NAME,
                        id,
                        forced_by.join(", ")
                    ),
                ))
            }
            Plan::NoOp => {
                self.state = InstanceState::Unchanged;
                return Ok(());
            }
            _ => {}
        }

        info!("Updating {} '{}'", R::TYPE_NAME, id);
        step(&self.cancel, "update", self.resource.update(&id, &prior, desired)).await?;
        self.read_back(&id, desired).await?;
        self.state = InstanceState::Updated;
        Ok(())
    }

    /// Read the remote object again. Returns `None`, and stops tracking the instance, when the
    /// object no longer exists.
    pub async fn refresh(&mut self) -> ProviderResult<Option<&Spec<R::Config>>> {
        let id = match &self.id {
            Some(id) => id.clone(),
            None => return Ok(None),
        };
        match step(&self.cancel, "read", self.resource.read(&id)).await {
            Ok(observed) => {
                let observed = match &self.current {
                    Some(prior) => carry_write_only(&R::schema(), prior, observed)?,
                    None => observed,
                };
                self.current = Some(observed);
                Ok(self.current.as_ref())
            }
            Err(e) if e.is_not_found() => {
                warn!(
                    "{} '{}' no longer exists, removing it from state",
                    R::TYPE_NAME,
                    id
                );
                self.forget(InstanceState::Unknown);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Whether the tracked remote object still exists.
    pub async fn exists(&self) -> ProviderResult<bool> {
        let id = match &self.id {
            Some(id) => id,
            None => return Ok(false),
        };
        match step(&self.cancel, "read", self.resource.read(id)).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Delete the tracked remote object. Deleting an object that is already gone, or destroying a
    /// lifecycle that tracks nothing, succeeds.
    pub async fn destroy(&mut self) -> ProviderResult<()> {
        self.delete_tracked().await?;
        self.state = InstanceState::Deleted;
        Ok(())
    }

    /// Start tracking an existing remote object by its identifier. The result is what a read of
    /// that identifier returns.
    pub async fn import(&mut self, id: &str) -> ProviderResult<&Spec<R::Config>> {
        let id = R::Id::from_str(id).context(
            ErrorKind::Validation,
            format!("Unable to import {}", R::TYPE_NAME),
        )?;
        info!("Importing {} '{}'", R::TYPE_NAME, id);
        let observed = step(&self.cancel, "read", self.resource.read(&id)).await?;
        self.id = Some(id);
        self.state = InstanceState::Unchanged;
        Ok(self.current.insert(observed))
    }

    /// Until the read-back succeeds, the new object is tracked with the attributes that were sent,
    /// so a failure from here on leaves it in state rather than orphaned.
    async fn create(&mut self, desired: &Spec<R::Config>) -> ProviderResult<()> {
        info!("Creating {}", R::TYPE_NAME);
        let id = match step(&self.cancel, "create", self.resource.create(desired)).await {
            Ok(id) => id,
            Err(e) => {
                if let Some(remaining) = e.remaining() {
                    self.track_remaining(remaining, desired);
                }
                return Err(e);
            }
        };
        info!("Created {} '{}'", R::TYPE_NAME, id);
        self.track(id.clone(), desired.clone());
        self.read_back(&id, desired).await
    }

    fn track(&mut self, id: R::Id, attributes: Spec<R::Config>) {
        self.id = Some(id);
        self.current = Some(attributes);
        self.state = InstanceState::Created;
    }

    fn track_remaining(&mut self, remaining: &str, desired: &Spec<R::Config>) {
        match R::Id::from_str(remaining) {
            Ok(id) => {
                warn!(
                    "{} '{}' was created but not completed, keeping it in state",
                    R::TYPE_NAME,
                    id
                );
                self.track(id, desired.clone());
            }
            Err(e) => warn!(
                "Unable to track partially created {} '{}': {}",
                R::TYPE_NAME,
                remaining,
                e
            ),
        }
    }

    async fn read_back(&mut self, id: &R::Id, sent: &Spec<R::Config>) -> ProviderResult<()> {
        let observed = step(&self.cancel, "read", self.resource.read(id)).await?;
        self.current = Some(carry_write_only(&R::schema(), sent, observed)?);
        Ok(())
    }

    async fn delete_tracked(&mut self) -> ProviderResult<()> {
        let id = match &self.id {
            Some(id) => id.clone(),
            None => {
                debug!("No {} is tracked, nothing to delete", R::TYPE_NAME);
                return Ok(());
            }
        };
        info!("Deleting {} '{}'", R::TYPE_NAME, id);
        match step(&self.cancel, "delete", self.resource.delete(&id)).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                info!("{} '{}' was already gone", R::TYPE_NAME, id);
            }
            Err(e) => return Err(e),
        }
        self.forget(InstanceState::Deleted);
        Ok(())
    }

    fn forget(&mut self, state: InstanceState) {
        self.id = None;
        self.current = None;
        self.state = state;
    }

    fn describe_id(&self) -> String {
        self.id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// Check a desired spec before anything is sent to the API.
pub fn validate<C>(spec: &Spec<C>) -> ProviderResult<()>
where
    C: Validate,
{
    spec.validate()
        .context(ErrorKind::Validation, "Invalid configuration")
}

fn attributes<C>(spec: &Spec<C>) -> ProviderResult<Attributes>
where
    C: Configuration + PartialEq,
{
    spec.attributes()
        .context(ErrorKind::Internal, "Unable to flatten attributes")
}

/// Copy the schema's write-only attributes from `from` into `into`, which was read back and so
/// cannot contain them.
fn carry_write_only<C>(schema: &Schema, from: &Spec<C>, into: Spec<C>) -> ProviderResult<Spec<C>>
where
    C: Configuration + PartialEq,
{
    let names: Vec<&str> = schema.write_only_attributes().collect();
    if names.is_empty() {
        return Ok(into);
    }
    let from = from
        .clone()
        .into_map()
        .context(ErrorKind::Internal, "Unable to serialize prior state")?;
    let mut into = into
        .into_map()
        .context(ErrorKind::Internal, "Unable to serialize observed state")?;
    for name in names {
        match from.get(name) {
            Some(value) => {
                into.insert(name.to_string(), value.clone());
            }
            None => {
                into.remove(name);
            }
        }
    }
    Spec::from_map(into).context(ErrorKind::Internal, "Unable to merge write-only attributes")
}

/// Run one remote call unless `cancel` has fired, abandoning it if `cancel` fires while it is in
/// flight.
pub(crate) async fn step<T, F>(cancel: &CancellationToken, what: &str, call: F) -> ProviderResult<T>
where
    F: Future<Output = ProviderResult<T>>,
{
    if cancel.is_cancelled() {
        return Err(ProviderError::new_with_context(
            ErrorKind::Cancelled,
            format!("{} was not started", what),
        ));
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProviderError::new_with_context(
            ErrorKind::Cancelled,
            format!("{} was interrupted", what),
        )),
        result = call => result,
    }
}
