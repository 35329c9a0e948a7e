/*!

Resource and data source implementations are strongly typed. The registry hands them out by type
name, so this module wraps them behind object-safe traits that speak attribute trees
(`serde_json::Value`) and [`StateDocument`]s.

!*/

use crate::lifecycle::{step, validate, InstanceState, Lifecycle};
use crate::plan::Plan;
use crate::provider::{
    DataSource, ErrorKind, IntoProviderError, ProviderError, ProviderResult, Resource, Spec,
};
use crate::schema::Schema;
use crate::state::StateDocument;
use log::warn;
use provider_model::{Configuration, Validate};
use serde::Serialize;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use tokio_util::sync::CancellationToken;

/// The outcome of applying a desired configuration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Applied {
    pub plan: Plan,
    pub state: InstanceState,
    /// What is tracked afterwards; `None` only when the plan deleted the object.
    pub document: Option<StateDocument>,
}

/// An apply that failed part way. `document` is what is tracked after the failure and must be
/// stored in place of the prior state: a replacement may already have deleted the old object, and
/// a create may have left a new one behind.
#[derive(Debug)]
pub struct ApplyFailure {
    pub error: ProviderError,
    pub document: Option<StateDocument>,
}

impl ApplyFailure {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl Display for ApplyFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.error, f)
    }
}

impl std::error::Error for ApplyFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// A resource type with its types erased.
#[async_trait::async_trait]
pub trait DynResource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Deserialize and validate a desired attribute tree without calling the API.
    fn validate(&self, desired: &Value) -> ProviderResult<()>;

    fn plan(&self, prior: Option<&StateDocument>, desired: Option<&Value>) -> ProviderResult<Plan>;

    /// Refresh `prior`, then make the remote object match `desired`.
    async fn apply(
        &self,
        cancel: CancellationToken,
        prior: Option<&StateDocument>,
        desired: &Value,
    ) -> Result<Applied, ApplyFailure>;

    /// Read the tracked object again; `None` when it no longer exists.
    async fn refresh(
        &self,
        cancel: CancellationToken,
        prior: &StateDocument,
    ) -> ProviderResult<Option<StateDocument>>;

    async fn import(&self, cancel: CancellationToken, id: &str) -> ProviderResult<StateDocument>;

    async fn destroy(&self, cancel: CancellationToken, prior: &StateDocument)
        -> ProviderResult<()>;
}

/// Wraps a [`Resource`] implementation so it can be registered.
pub struct Adapter<R>(R);

impl<R> Adapter<R>
where
    R: Resource,
{
    pub fn new(resource: R) -> Self {
        Self(resource)
    }

    pub fn boxed(resource: R) -> Box<dyn DynResource> {
        Box::new(Self::new(resource))
    }

    fn lifecycle(
        &self,
        cancel: CancellationToken,
        prior: Option<&StateDocument>,
    ) -> ProviderResult<Lifecycle<'_, R>> {
        match prior {
            Some(document) => Lifecycle::from_state(&self.0, cancel, document),
            None => Ok(Lifecycle::new(&self.0, cancel)),
        }
    }
}

fn desired_spec<C>(desired: &Value) -> ProviderResult<Spec<C>>
where
    C: Configuration + PartialEq + Validate,
{
    let spec = Spec::<C>::from_value(desired.clone())
        .context(ErrorKind::Validation, "Invalid configuration")?;
    validate(&spec)?;
    Ok(spec)
}

#[async_trait::async_trait]
impl<R> DynResource for Adapter<R>
where
    R: Resource,
{
    fn type_name(&self) -> &'static str {
        R::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        R::schema()
    }

    fn validate(&self, desired: &Value) -> ProviderResult<()> {
        desired_spec::<R::Config>(desired).map(|_| ())
    }

    fn plan(&self, prior: Option<&StateDocument>, desired: Option<&Value>) -> ProviderResult<Plan> {
        let lifecycle = self.lifecycle(CancellationToken::new(), prior)?;
        let desired = desired.map(desired_spec::<R::Config>).transpose()?;
        lifecycle.plan(desired.as_ref())
    }

    async fn apply(
        &self,
        cancel: CancellationToken,
        prior: Option<&StateDocument>,
        desired: &Value,
    ) -> Result<Applied, ApplyFailure> {
        let unchanged = |error: ProviderError| ApplyFailure {
            error,
            document: prior.cloned(),
        };
        let desired = desired_spec::<R::Config>(desired).map_err(unchanged)?;
        let mut lifecycle = self.lifecycle(cancel, prior).map_err(unchanged)?;
        match lifecycle.reconcile(desired).await {
            Ok(plan) => Ok(Applied {
                plan,
                state: lifecycle.state(),
                document: lifecycle.state_document().map_err(unchanged)?,
            }),
            Err(error) => {
                let document = lifecycle.state_document().unwrap_or_else(|e| {
                    warn!("Unable to record the state left by a failed apply: {}", e);
                    prior.cloned()
                });
                Err(ApplyFailure { error, document })
            }
        }
    }

    async fn refresh(
        &self,
        cancel: CancellationToken,
        prior: &StateDocument,
    ) -> ProviderResult<Option<StateDocument>> {
        let mut lifecycle = self.lifecycle(cancel, Some(prior))?;
        lifecycle.refresh().await?;
        lifecycle.state_document()
    }

    async fn import(&self, cancel: CancellationToken, id: &str) -> ProviderResult<StateDocument> {
        let mut lifecycle = self.lifecycle(cancel, None)?;
        lifecycle.import(id).await?;
        lifecycle
            .state_document()?
            .context(ErrorKind::Internal, "Import did not produce a state document")
    }

    async fn destroy(
        &self,
        cancel: CancellationToken,
        prior: &StateDocument,
    ) -> ProviderResult<()> {
        self.lifecycle(cancel, Some(prior))?.destroy().await
    }
}

/// A data source with its types erased.
#[async_trait::async_trait]
pub trait DynDataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    async fn read(&self, cancel: CancellationToken, args: &Value) -> ProviderResult<Value>;
}

/// Wraps a [`DataSource`] implementation so it can be registered.
pub struct DataSourceAdapter<D>(D);

impl<D> DataSourceAdapter<D>
where
    D: DataSource,
{
    pub fn boxed(data_source: D) -> Box<dyn DynDataSource> {
        Box::new(Self(data_source))
    }
}

#[async_trait::async_trait]
impl<D> DynDataSource for DataSourceAdapter<D>
where
    D: DataSource,
{
    fn type_name(&self) -> &'static str {
        D::TYPE_NAME
    }

    async fn read(&self, cancel: CancellationToken, args: &Value) -> ProviderResult<Value> {
        let args = D::Args::from_value(args.clone())
            .context(ErrorKind::Validation, "Invalid data source arguments")?;
        args.validate()
            .context(ErrorKind::Validation, "Invalid data source arguments")?;
        let output = step(&cancel, "read", self.0.read(&args)).await?;
        output
            .into_value()
            .context(ErrorKind::Internal, "Unable to serialize data source output")
    }
}
