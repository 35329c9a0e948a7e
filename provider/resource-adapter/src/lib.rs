/*!

The `resource-adapter` library turns a remote API into resources that can be driven to a desired
state. You implement the [`Create`], [`Read`], [`Update`] and [`Delete`] traits for a resource
type, describe its attribute flags with a [`Schema`], and hand it to a [`Lifecycle`], which plans
and carries out the calls needed to make the remote object match the desired [`Spec`].

Resource types are registered by name through [`ServicePackage`]s collected into a [`Registry`].

!*/

pub mod erased;
pub mod error;
mod lifecycle;
mod plan;
pub mod provider;
mod registry;
mod schema;
mod state;

pub use erased::{
    Adapter, Applied, ApplyFailure, DataSourceAdapter, DynDataSource, DynResource,
};
pub use lifecycle::{validate, InstanceState, Lifecycle};
pub use plan::Plan;
pub use provider::{
    Create, DataSource, Delete, ErrorKind, IntoProviderError, ProviderError, ProviderResult, Read,
    Resource, ResourceType, Spec, Update,
};
pub use provider_model::{Configuration, Validate};
pub use registry::{
    DataSourceRegistration, Registry, ResourceRegistration, ServicePackage, TagsConfig,
};
pub use schema::{AttributeFlags, Schema};
pub use state::StateDocument;
pub use tokio_util::sync::CancellationToken;
