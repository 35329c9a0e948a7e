mod error;

pub use self::error::{ErrorKind, IntoProviderError, ProviderError, ProviderResult};
use crate::schema::Schema;
use provider_model::tags::validate_tags;
use provider_model::{AttributePath, Configuration, ResourceId, Tags, Validate};
use serde::{Deserialize, Serialize};

/// The desired (or observed) state of one resource: its own attributes plus the tags that are
/// synchronized through the tagging API.
///
/// `configuration` is flattened so that the serialized form is a single attribute tree, e.g.
/// `{"name": "gw", "mesh_name": "mesh", "spec": [...], "tags": {...}, "tags_all": {...}}`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spec<C> {
    #[serde(flatten)]
    pub configuration: C,
    #[serde(default)]
    pub tags: Tags,
    /// Resource tags merged with the provider's default tags. Only ever read back, never desired.
    #[serde(default)]
    pub tags_all: Tags,
}

impl<C> Spec<C> {
    pub fn new(configuration: C) -> Self {
        Self {
            configuration,
            tags: Tags::new(),
            tags_all: Tags::new(),
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }
}

impl<C> Configuration for Spec<C> where C: Configuration + PartialEq {}

impl<C> Validate for Spec<C>
where
    C: Validate,
{
    fn validate_at(&self, path: &AttributePath) -> provider_model::Result<()> {
        self.configuration.validate_at(path)?;
        validate_tags(&path.attr("tags"), &self.tags)
    }
}

/// Static facts about a resource type: its registered name, its configuration and identifier
/// types, and the schema flags that drive planning.
pub trait ResourceType: Send + Sync + 'static {
    /// The name users refer to this type by, e.g. `aws_appmesh_virtual_gateway`.
    const TYPE_NAME: &'static str;

    /// The attributes a user writes for this type. Deserializing it enforces enum members, block
    /// cardinality and oneof groups; [`Validate`] enforces everything else.
    type Config: Configuration + Validate + PartialEq;

    /// The identifier stored in state and accepted by import.
    type Id: ResourceId;

    fn schema() -> Schema;
}

/// You implement the [`Create`] trait to bring a new remote object into existence from a desired
/// [`Spec`]. The returned identifier is all that is needed to [`Read`] the object back.
///
/// Implementations send the full desired state, including tags where the API accepts them on
/// creation, and must not be called with a spec that failed validation. When a later step of the
/// creation fails after the object exists, return the error
/// [`with_remaining`](ProviderError::with_remaining) the new identifier so it is not orphaned.
#[async_trait::async_trait]
pub trait Create: ResourceType {
    async fn create(&self, spec: &Spec<Self::Config>) -> ProviderResult<Self::Id>;
}

/// You implement the [`Read`] trait to observe the remote object addressed by `id`.
///
/// When the object does not exist, return an error of kind [`ErrorKind::NotFound`]; callers rely
/// on telling that apart from every other failure. Write-only attributes cannot be read back and
/// are left at their defaults; the caller carries them over from prior state.
#[async_trait::async_trait]
pub trait Read: ResourceType {
    async fn read(&self, id: &Self::Id) -> ProviderResult<Spec<Self::Config>>;
}

/// You implement the [`Update`] trait to change a remote object in place. Only attributes that do
/// not force replacement differ between `prior` and `planned`; anything else is a
/// [`ErrorKind::Conflict`].
#[async_trait::async_trait]
pub trait Update: ResourceType {
    async fn update(
        &self,
        id: &Self::Id,
        prior: &Spec<Self::Config>,
        planned: &Spec<Self::Config>,
    ) -> ProviderResult<()>;
}

/// You implement the [`Delete`] trait to remove a remote object. Deleting an object that is
/// already gone should return [`ErrorKind::NotFound`] (or succeed); the caller treats both as
/// success.
#[async_trait::async_trait]
pub trait Delete: ResourceType {
    async fn delete(&self, id: &Self::Id) -> ProviderResult<()>;
}

/// A resource type that supports the full lifecycle.
pub trait Resource: Create + Read + Update + Delete {}

impl<T> Resource for T where T: Create + Read + Update + Delete {}

/// You implement the [`DataSource`] trait to look up an existing remote object that is not
/// managed here.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync + 'static {
    const TYPE_NAME: &'static str;

    /// The arguments that identify the object.
    type Args: Configuration + Validate;

    /// Everything that was observed about the object.
    type Output: Configuration;

    async fn read(&self, args: &Self::Args) -> ProviderResult<Self::Output>;
}
