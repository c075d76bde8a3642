use crate::model::NamespaceDeclaration;
use crate::namespace::{Namespace, NamespaceError};
use async_trait::async_trait;
use reconcile_framework::{FamilyClient, Observed, ReconcileClient, ReconcileError, ResourceState, Value};
use tracing::{debug, instrument};

/// Client for the namespace actor.
#[derive(Clone)]
pub struct NamespaceClient {
    inner: ReconcileClient<Namespace>,
}

impl NamespaceClient {
    pub fn new(inner: ReconcileClient<Namespace>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl FamilyClient<Namespace> for NamespaceClient {
    type Error = NamespaceError;

    fn inner(&self) -> &ReconcileClient<Namespace> {
        &self.inner
    }

    fn map_error(e: ReconcileError) -> Self::Error {
        NamespaceError::from(e)
    }
}

impl NamespaceClient {
    /// Creates the namespace and waits until it is `CREATED`.
    #[instrument(skip(self, declaration), fields(namespace = %declaration.namespace))]
    pub async fn create_namespace(
        &self,
        declaration: &NamespaceDeclaration,
    ) -> Result<ResourceState, NamespaceError> {
        debug!(?declaration, "Sending request");
        self.inner
            .create(declaration.into())
            .await
            .map_err(NamespaceError::from)
    }

    /// Namespaces cannot be changed remotely; changed fields are recorded as declared.
    #[instrument(skip(self, declaration, prior))]
    pub async fn update_namespace(
        &self,
        id: String,
        declaration: &NamespaceDeclaration,
        prior: Value,
    ) -> Result<Observed, NamespaceError> {
        debug!("Sending request");
        self.inner
            .update(id, declaration.into(), prior)
            .await
            .map_err(NamespaceError::from)
    }
}
