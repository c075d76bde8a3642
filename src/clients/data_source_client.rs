use crate::data_source::{DataSource, DataSourceError};
use crate::model::DataSourceDeclaration;
use async_trait::async_trait;
use reconcile_framework::{FamilyClient, Observed, ReconcileClient, ReconcileError, ResourceState, Value};
use tracing::{debug, instrument};

/// Client for the data source actor.
///
/// Declarations carry credentials, so requests are logged by id only.
#[derive(Clone)]
pub struct DataSourceClient {
    inner: ReconcileClient<DataSource>,
}

impl DataSourceClient {
    pub fn new(inner: ReconcileClient<DataSource>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl FamilyClient<DataSource> for DataSourceClient {
    type Error = DataSourceError;

    fn inner(&self) -> &ReconcileClient<DataSource> {
        &self.inner
    }

    fn map_error(e: ReconcileError) -> Self::Error {
        DataSourceError::from(e)
    }
}

impl DataSourceClient {
    #[instrument(skip(self, declaration), fields(data_source_id = %declaration.data_source_id()))]
    pub async fn create_data_source(
        &self,
        declaration: &DataSourceDeclaration,
    ) -> Result<ResourceState, DataSourceError> {
        debug!("Sending request");
        self.inner
            .create(declaration.into())
            .await
            .map_err(DataSourceError::from)
    }

    /// Credentials are never described, so `prior` must carry the ones last sent.
    #[instrument(skip(self, declaration, prior), fields(data_source_id = %declaration.data_source_id()))]
    pub async fn update_data_source(
        &self,
        id: String,
        declaration: &DataSourceDeclaration,
        prior: Value,
    ) -> Result<Observed, DataSourceError> {
        debug!("Sending request");
        self.inner
            .update(id, declaration.into(), prior)
            .await
            .map_err(DataSourceError::from)
    }
}
