use crate::model::VpcConnectionDeclaration;
use crate::vpc_connection::{VpcConnectionError, VpcConnectionFamily};
use async_trait::async_trait;
use reconcile_framework::{FamilyClient, Observed, ReconcileClient, ReconcileError, ResourceState, Value};
use tracing::{debug, instrument};

/// Client for the VPC connection actor.
#[derive(Clone)]
pub struct VpcConnectionClient {
    inner: ReconcileClient<VpcConnectionFamily>,
}

impl VpcConnectionClient {
    pub fn new(inner: ReconcileClient<VpcConnectionFamily>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl FamilyClient<VpcConnectionFamily> for VpcConnectionClient {
    type Error = VpcConnectionError;

    fn inner(&self) -> &ReconcileClient<VpcConnectionFamily> {
        &self.inner
    }

    fn map_error(e: ReconcileError) -> Self::Error {
        VpcConnectionError::from(e)
    }
}

impl VpcConnectionClient {
    #[instrument(skip(self, declaration), fields(vpc_connection_id = %declaration.vpc_connection_id))]
    pub async fn create_vpc_connection(
        &self,
        declaration: &VpcConnectionDeclaration,
    ) -> Result<ResourceState, VpcConnectionError> {
        debug!(?declaration, "Sending request");
        self.inner
            .create(declaration.into())
            .await
            .map_err(VpcConnectionError::from)
    }

    #[instrument(skip(self, declaration, prior))]
    pub async fn update_vpc_connection(
        &self,
        id: String,
        declaration: &VpcConnectionDeclaration,
        prior: Value,
    ) -> Result<Observed, VpcConnectionError> {
        debug!(?declaration, "Sending request");
        self.inner
            .update(id, declaration.into(), prior)
            .await
            .map_err(VpcConnectionError::from)
    }
}
