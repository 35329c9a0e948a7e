/*!

App Mesh: the `aws_appmesh_virtual_gateway` resource.

!*/

mod mapping;
mod sdk;
mod virtual_gateway;

pub use mapping::{expand_spec, flatten_spec};
pub use sdk::SdkAppMesh;
pub use virtual_gateway::VirtualGateway;

use crate::clients::AwsClients;
use crate::tagging::TaggingApi;
use async_trait::async_trait;
use aws_sdk_appmesh::model::{VirtualGatewayData, VirtualGatewaySpec};
use provider_model::{split_id, ResourceId, Tags};
use resource_adapter::{
    Adapter, ProviderResult, ResourceRegistration, ServicePackage, TagsConfig,
};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The App Mesh calls the virtual gateway adapter makes.
#[async_trait]
pub trait AppMeshApi: TaggingApi {
    async fn create_virtual_gateway(
        &self,
        id: &VirtualGatewayId,
        spec: VirtualGatewaySpec,
        tags: &Tags,
    ) -> ProviderResult<VirtualGatewayData>;

    /// Returns an error of kind `NotFound` if the gateway or its mesh does not exist.
    async fn describe_virtual_gateway(
        &self,
        id: &VirtualGatewayId,
    ) -> ProviderResult<VirtualGatewayData>;

    async fn update_virtual_gateway(
        &self,
        id: &VirtualGatewayId,
        spec: VirtualGatewaySpec,
    ) -> ProviderResult<VirtualGatewayData>;

    async fn delete_virtual_gateway(&self, id: &VirtualGatewayId) -> ProviderResult<()>;
}

/// A virtual gateway is addressed by its mesh, the mesh's owner if the mesh is shared from
/// another account, and its own name: `mesh-name/virtual-gateway-name` or
/// `mesh-name/mesh-owner/virtual-gateway-name`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct VirtualGatewayId {
    pub mesh_name: String,
    pub mesh_owner: Option<String>,
    pub name: String,
}

impl VirtualGatewayId {
    pub fn new<S1, S2>(mesh_name: S1, mesh_owner: Option<String>, name: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            mesh_name: mesh_name.into(),
            mesh_owner,
            name: name.into(),
        }
    }
}

impl Display for VirtualGatewayId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.mesh_owner {
            Some(owner) => write!(f, "{}/{}/{}", self.mesh_name, owner, self.name),
            None => write!(f, "{}/{}", self.mesh_name, self.name),
        }
    }
}

impl FromStr for VirtualGatewayId {
    type Err = provider_model::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = split_id(
            s,
            2,
            3,
            "mesh-name/virtual-gateway-name or mesh-name/mesh-owner/virtual-gateway-name",
        )?
        .into_iter();
        let mesh_name = parts.next().unwrap_or_default();
        let mut rest: Vec<String> = parts.collect();
        let name = rest.pop().unwrap_or_default();
        Ok(Self {
            mesh_name,
            mesh_owner: rest.pop(),
            name,
        })
    }
}

impl ResourceId for VirtualGatewayId {}

pub struct AppMeshPackage;

impl ServicePackage<AwsClients> for AppMeshPackage {
    fn name(&self) -> &'static str {
        "appmesh"
    }

    fn resources(&self) -> Vec<ResourceRegistration<AwsClients>> {
        vec![ResourceRegistration {
            type_name: "aws_appmesh_virtual_gateway",
            name: "Virtual Gateway",
            tags: Some(TagsConfig {
                identifier_attribute: "arn",
            }),
            factory: |clients: &AwsClients| Adapter::boxed(VirtualGateway::new(clients)),
        }]
    }
}
