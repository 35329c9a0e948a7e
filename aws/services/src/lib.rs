/*!

`aws-services` implements the provider's resource and data source types on top of the AWS SDK.
Each service module contributes a [`ServicePackage`] and talks to its API through a trait
(`AppMeshApi`, `ElastiCacheApi`, `WafRegionalApi`) so that the adapters can be driven by fakes.
[`registry`] returns every type, keyed by name, ready to be instantiated with [`AwsClients`].

!*/

pub mod appmesh;
mod clients;
mod convert;
pub mod elasticache;
mod error;
pub mod tagging;
pub mod wafregional;

pub use clients::{AccountInfo, AwsClients};
pub use error::{Error, Result};

use resource_adapter::error::RegistryError;
use resource_adapter::{Registry, ServicePackage};

lazy_static::lazy_static! {
    static ref REGISTRY: std::result::Result<Registry<AwsClients>, RegistryError> =
        Registry::new(&packages());
}

/// Every service package in this crate.
pub fn packages() -> Vec<&'static dyn ServicePackage<AwsClients>> {
    vec![
        &appmesh::AppMeshPackage,
        &elasticache::ElastiCachePackage,
        &wafregional::WafRegionalPackage,
    ]
}

/// The registry of all resource and data source types. Fails only if two packages register the
/// same type name.
pub fn registry() -> std::result::Result<&'static Registry<AwsClients>, &'static RegistryError> {
    REGISTRY.as_ref()
}
