//! # QuickSight API
//!
//! The remote calls the resource families make, as one async trait. Production code would
//! implement [`QuickSightApi`] over an SDK client; tests and the demo binary use
//! [`InMemoryQuickSight`], which models the asynchronous status transitions of the real
//! service.
//!
//! Every method fails with a [`RemoteError`]. A missing object is always
//! `ResourceNotFoundException`, which the families rely on for absence checks.

pub mod memory;
pub mod types;

pub use memory::{ApiOperation, InMemoryQuickSight};
pub use types::*;

use async_trait::async_trait;
use reconcile_framework::RemoteError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shared handle every family context holds.
pub type SharedApi = Arc<dyn QuickSightApi>;

#[async_trait]
pub trait QuickSightApi: Send + Sync {
    // --- Namespaces ---

    async fn create_namespace(&self, request: CreateNamespaceRequest) -> Result<(), RemoteError>;

    async fn describe_namespace(
        &self,
        account_id: &str,
        namespace: &str,
    ) -> Result<NamespaceInfo, RemoteError>;

    async fn delete_namespace(&self, account_id: &str, namespace: &str) -> Result<(), RemoteError>;

    // --- VPC connections ---

    async fn create_vpc_connection(&self, request: VpcConnectionRequest) -> Result<(), RemoteError>;

    async fn update_vpc_connection(&self, request: VpcConnectionRequest) -> Result<(), RemoteError>;

    async fn describe_vpc_connection(
        &self,
        account_id: &str,
        vpc_connection_id: &str,
    ) -> Result<VpcConnection, RemoteError>;

    async fn delete_vpc_connection(
        &self,
        account_id: &str,
        vpc_connection_id: &str,
    ) -> Result<(), RemoteError>;

    // --- Data sources ---

    async fn create_data_source(&self, request: CreateDataSourceRequest) -> Result<(), RemoteError>;

    /// Fails with `InvalidParameterValueException` when the parameters change the type.
    async fn update_data_source(&self, definition: DataSourceDefinition) -> Result<(), RemoteError>;

    async fn describe_data_source(
        &self,
        account_id: &str,
        data_source_id: &str,
    ) -> Result<DataSourceDescription, RemoteError>;

    async fn delete_data_source(
        &self,
        account_id: &str,
        data_source_id: &str,
    ) -> Result<(), RemoteError>;

    async fn describe_data_source_permissions(
        &self,
        account_id: &str,
        data_source_id: &str,
    ) -> Result<Vec<ResourcePermission>, RemoteError>;

    async fn update_data_source_permissions(
        &self,
        account_id: &str,
        data_source_id: &str,
        grant: Vec<ResourcePermission>,
        revoke: Vec<ResourcePermission>,
    ) -> Result<(), RemoteError>;

    // --- Data sets ---

    async fn create_data_set(&self, request: CreateDataSetRequest) -> Result<(), RemoteError>;

    async fn update_data_set(&self, definition: DataSetDefinition) -> Result<(), RemoteError>;

    async fn describe_data_set(
        &self,
        account_id: &str,
        data_set_id: &str,
    ) -> Result<DataSetDescription, RemoteError>;

    async fn delete_data_set(&self, account_id: &str, data_set_id: &str) -> Result<(), RemoteError>;

    async fn describe_data_set_permissions(
        &self,
        account_id: &str,
        data_set_id: &str,
    ) -> Result<Vec<ResourcePermission>, RemoteError>;

    async fn update_data_set_permissions(
        &self,
        account_id: &str,
        data_set_id: &str,
        grant: Vec<ResourcePermission>,
        revoke: Vec<ResourcePermission>,
    ) -> Result<(), RemoteError>;

    /// Fails with `InvalidParameterValueException` on data sets that are not SPICE.
    async fn describe_data_set_refresh_properties(
        &self,
        account_id: &str,
        data_set_id: &str,
    ) -> Result<DataSetRefreshProperties, RemoteError>;

    async fn put_data_set_refresh_properties(
        &self,
        account_id: &str,
        data_set_id: &str,
        properties: DataSetRefreshProperties,
    ) -> Result<(), RemoteError>;

    async fn delete_data_set_refresh_properties(
        &self,
        account_id: &str,
        data_set_id: &str,
    ) -> Result<(), RemoteError>;

    // --- Tags ---

    async fn list_tags_for_resource(&self, arn: &str)
        -> Result<BTreeMap<String, String>, RemoteError>;

    async fn tag_resource(&self, arn: &str, tags: BTreeMap<String, String>)
        -> Result<(), RemoteError>;

    async fn untag_resource(&self, arn: &str, keys: Vec<String>) -> Result<(), RemoteError>;

    // --- Ingestions ---

    async fn create_ingestion(&self, request: CreateIngestionRequest) -> Result<(), RemoteError>;

    async fn describe_ingestion(
        &self,
        account_id: &str,
        data_set_id: &str,
        ingestion_id: &str,
    ) -> Result<Ingestion, RemoteError>;

    /// Stops a running ingestion. Cancelling a finished one is a no-op.
    async fn cancel_ingestion(
        &self,
        account_id: &str,
        data_set_id: &str,
        ingestion_id: &str,
    ) -> Result<(), RemoteError>;
}

/// Brings the tags of `arn` to exactly `desired`, touching only the keys that differ.
pub async fn sync_tags(
    api: &SharedApi,
    arn: &str,
    desired: BTreeMap<String, String>,
) -> Result<(), RemoteError> {
    let current = api.list_tags_for_resource(arn).await?;
    let stale: Vec<String> = current
        .keys()
        .filter(|k| !desired.contains_key(*k))
        .cloned()
        .collect();
    if !stale.is_empty() {
        api.untag_resource(arn, stale).await?;
    }
    let changed: BTreeMap<String, String> = desired
        .into_iter()
        .filter(|(k, v)| current.get(k) != Some(v))
        .collect();
    if !changed.is_empty() {
        api.tag_resource(arn, changed).await?;
    }
    Ok(())
}
