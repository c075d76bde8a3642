use crate::ingestion::{IngestionError, IngestionFamily};
use crate::model::IngestionDeclaration;
use async_trait::async_trait;
use reconcile_framework::{FamilyClient, ReconcileClient, ReconcileError, ResourceState};
use tracing::{debug, instrument};

/// Client for the ingestion actor.
#[derive(Clone)]
pub struct IngestionClient {
    inner: ReconcileClient<IngestionFamily>,
}

impl IngestionClient {
    pub fn new(inner: ReconcileClient<IngestionFamily>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl FamilyClient<IngestionFamily> for IngestionClient {
    type Error = IngestionError;

    fn inner(&self) -> &ReconcileClient<IngestionFamily> {
        &self.inner
    }

    fn map_error(e: ReconcileError) -> Self::Error {
        IngestionError::from(e)
    }
}

impl IngestionClient {
    /// Starts the ingestion and waits for it to complete.
    #[instrument(skip(self, declaration), fields(ingestion_id = %declaration.ingestion_id))]
    pub async fn start_ingestion(
        &self,
        declaration: &IngestionDeclaration,
    ) -> Result<ResourceState, IngestionError> {
        debug!(?declaration, "Sending request");
        self.inner
            .create(declaration.into())
            .await
            .map_err(IngestionError::from)
    }

    /// Cancels a running ingestion. Same as `delete`.
    pub async fn cancel_ingestion(&self, id: String) -> Result<(), IngestionError> {
        self.delete(id).await
    }
}
