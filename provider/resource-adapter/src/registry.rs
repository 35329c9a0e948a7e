/*!

Every service contributes a [`ServicePackage`] that lists its resource and data source types. The
[`Registry`] collects the packages into a single map from type name to constructor, rejecting a
type name that two registrations claim.

!*/

use crate::erased::{DynDataSource, DynResource};
use crate::error::{DuplicateSnafu, RegistryError, UnknownTypeSnafu};
use log::trace;
use std::collections::BTreeMap;

/// How a resource's tags are addressed by the tagging API.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TagsConfig {
    /// The attribute whose value identifies the object to the tagging API, usually `arn`.
    pub identifier_attribute: &'static str,
}

/// One registered resource type. `C` is whatever the constructor needs, e.g. API clients.
pub struct ResourceRegistration<C> {
    pub type_name: &'static str,
    /// A human readable name.
    pub name: &'static str,
    /// `None` for types that do not support tags.
    pub tags: Option<TagsConfig>,
    pub factory: fn(&C) -> Box<dyn DynResource>,
}

impl<C> ResourceRegistration<C> {
    pub fn instantiate(&self, context: &C) -> Box<dyn DynResource> {
        (self.factory)(context)
    }
}

/// One registered data source type.
pub struct DataSourceRegistration<C> {
    pub type_name: &'static str,
    pub name: &'static str,
    pub factory: fn(&C) -> Box<dyn DynDataSource>,
}

impl<C> DataSourceRegistration<C> {
    pub fn instantiate(&self, context: &C) -> Box<dyn DynDataSource> {
        (self.factory)(context)
    }
}

/// The types a single service contributes.
pub trait ServicePackage<C>: Send + Sync {
    /// The service's name, e.g. `appmesh`.
    fn name(&self) -> &'static str;

    fn resources(&self) -> Vec<ResourceRegistration<C>>;

    fn data_sources(&self) -> Vec<DataSourceRegistration<C>> {
        Vec::new()
    }
}

/// All registered types, by type name.
pub struct Registry<C> {
    resources: BTreeMap<&'static str, (&'static str, ResourceRegistration<C>)>,
    data_sources: BTreeMap<&'static str, (&'static str, DataSourceRegistration<C>)>,
}

impl<C> Registry<C> {
    pub fn new(packages: &[&dyn ServicePackage<C>]) -> Result<Self, RegistryError> {
        let mut resources = BTreeMap::new();
        let mut data_sources = BTreeMap::new();
        for package in packages {
            for registration in package.resources() {
                trace!(
                    "Registering resource '{}' from '{}'",
                    registration.type_name,
                    package.name()
                );
                if let Some((first, _)) = resources.get(registration.type_name) {
                    return DuplicateSnafu {
                        type_name: registration.type_name,
                        first: *first,
                        second: package.name(),
                    }
                    .fail();
                }
                resources.insert(registration.type_name, (package.name(), registration));
            }
            for registration in package.data_sources() {
                trace!(
                    "Registering data source '{}' from '{}'",
                    registration.type_name,
                    package.name()
                );
                if let Some((first, _)) = data_sources.get(registration.type_name) {
                    return DuplicateSnafu {
                        type_name: registration.type_name,
                        first: *first,
                        second: package.name(),
                    }
                    .fail();
                }
                data_sources.insert(registration.type_name, (package.name(), registration));
            }
        }
        Ok(Self {
            resources,
            data_sources,
        })
    }

    pub fn resource(&self, type_name: &str) -> Result<&ResourceRegistration<C>, RegistryError> {
        self.resources
            .get(type_name)
            .map(|(_, registration)| registration)
            .ok_or_else(|| {
                UnknownTypeSnafu {
                    kind: "resource",
                    type_name,
                }
                .build()
            })
    }

    pub fn data_source(
        &self,
        type_name: &str,
    ) -> Result<&DataSourceRegistration<C>, RegistryError> {
        self.data_sources
            .get(type_name)
            .map(|(_, registration)| registration)
            .ok_or_else(|| {
                UnknownTypeSnafu {
                    kind: "data source",
                    type_name,
                }
                .build()
            })
    }

    /// Resource registrations with the name of the package that contributed each, by type name.
    pub fn resources(&self) -> impl Iterator<Item = (&'static str, &ResourceRegistration<C>)> {
        self.resources
            .values()
            .map(|(package, registration)| (*package, registration))
    }

    pub fn data_sources(
        &self,
    ) -> impl Iterator<Item = (&'static str, &DataSourceRegistration<C>)> {
        self.data_sources
            .values()
            .map(|(package, registration)| (*package, registration))
    }
}
