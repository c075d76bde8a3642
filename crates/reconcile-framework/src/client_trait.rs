//! # FamilyClient Trait
//!
//! Gives resource-specific clients the operations whose shape is the same for every
//! family (`read`, `delete`, `import`) on top of a [`ReconcileClient`]. Clients implement
//! `create` and `update` themselves, taking their own typed declarations.
use crate::{Observed, ReconcileClient, ReconcileError, ResourceFamily, Value};
use async_trait::async_trait;

/// # Example
///
/// ```rust,ignore
/// struct NamespaceClient {
///     inner: ReconcileClient<Namespace>,
/// }
///
/// #[async_trait]
/// impl FamilyClient<Namespace> for NamespaceClient {
///     type Error = NamespaceError;
///
///     fn inner(&self) -> &ReconcileClient<Namespace> {
///         &self.inner
///     }
///
///     fn map_error(e: ReconcileError) -> Self::Error {
///         NamespaceError::Reconcile(e)
///     }
/// }
///
/// // read(), delete() and import() are provided.
/// client.delete("123456789012,sales".into()).await?;
/// ```
#[async_trait]
pub trait FamilyClient<F: ResourceFamily>: Send + Sync {
    /// The resource-specific error type.
    type Error: Send + Sync;

    fn inner(&self) -> &ReconcileClient<F>;

    fn map_error(e: ReconcileError) -> Self::Error;

    /// Re-fetches the object; `Observed::Absent` means it is gone.
    #[tracing::instrument(skip(self, prior))]
    async fn read(&self, id: String, prior: Value) -> Result<Observed, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().read(id, prior).await.map_err(Self::map_error)
    }

    /// Idempotent: deleting an object that is already gone succeeds.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: String) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }

    #[tracing::instrument(skip(self))]
    async fn import(&self, id: String) -> Result<Observed, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().import(id).await.map_err(Self::map_error)
    }
}
