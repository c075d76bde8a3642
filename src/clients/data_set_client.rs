use crate::data_set::{DataSet, DataSetError};
use async_trait::async_trait;
use reconcile_framework::{FamilyClient, Observed, ReconcileClient, ReconcileError, ResourceState, Value};
use tracing::{debug, instrument};

/// Client for the data set actor.
///
/// Data sets are declared as raw [`Value`] trees, usually built with
/// [`DataSetDeclaration`](crate::model::DataSetDeclaration).
#[derive(Clone)]
pub struct DataSetClient {
    inner: ReconcileClient<DataSet>,
}

impl DataSetClient {
    pub fn new(inner: ReconcileClient<DataSet>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl FamilyClient<DataSet> for DataSetClient {
    type Error = DataSetError;

    fn inner(&self) -> &ReconcileClient<DataSet> {
        &self.inner
    }

    fn map_error(e: ReconcileError) -> Self::Error {
        DataSetError::from(e)
    }
}

impl DataSetClient {
    #[instrument(skip(self, declared))]
    pub async fn create_data_set(&self, declared: Value) -> Result<ResourceState, DataSetError> {
        debug!(?declared, "Sending request");
        self.inner.create(declared).await.map_err(DataSetError::from)
    }

    /// Sends only what changed since `prior`; permissions, refresh properties and tags go
    /// to their own calls.
    #[instrument(skip(self, declared, prior))]
    pub async fn update_data_set(
        &self,
        id: String,
        declared: Value,
        prior: Value,
    ) -> Result<Observed, DataSetError> {
        debug!(?declared, "Sending request");
        self.inner
            .update(id, declared, prior)
            .await
            .map_err(DataSetError::from)
    }
}
