//! [`ResourceFamily`] implementation for QuickSight data sources.
//!
//! Like a data set, a data source is stitched from three remote objects: the data source,
//! its permissions and its tags. Unlike a data set, create and update are asynchronous:
//! the service tests the connection and settles on `*_SUCCESSFUL` or `*_FAILED`.

use super::schema::{DATA_SOURCE_SCHEMA, SUB_RESOURCE_FIELDS};
use crate::api::{
    sync_tags, CreateDataSourceRequest, DataSourceDefinition, DataSourceDescription,
    ResourcePermission, SharedApi,
};
use crate::permissions::diff_permissions;
use async_trait::async_trait;
use reconcile_framework::{
    ChangeSet, IdentityCodec, Lifecycle, ObjectSchema, RemoteError, ResourceFamily, Value,
    WaitSpec, ACCOUNT_FIELD,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Marker type for the data source family.
pub struct DataSource;

/// Expanded declaration: the `UpdateDataSource` fields plus the sub-resources.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataSourceInput {
    #[serde(flatten)]
    pub definition: DataSourceDefinition,
    pub permissions: Option<Vec<ResourcePermission>>,
    pub tags: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataSourceState {
    #[serde(flatten)]
    pub description: DataSourceDescription,
    pub permissions: Option<Vec<ResourcePermission>>,
    pub tags: Option<BTreeMap<String, String>>,
}

#[async_trait]
impl ResourceFamily for DataSource {
    const TYPE_NAME: &'static str = "quicksight_data_source";
    const IDENTITY: IdentityCodec = IdentityCodec::new(',', &[ACCOUNT_FIELD, "data_source_id"]);

    type Context = SharedApi;
    type Remote = DataSourceState;
    type CreateInput = DataSourceInput;
    type UpdateInput = DataSourceInput;

    fn schema() -> &'static ObjectSchema {
        &DATA_SOURCE_SCHEMA
    }

    fn lifecycle() -> Lifecycle {
        Lifecycle {
            create: Some(WaitSpec::new(
                &["CREATION_IN_PROGRESS"],
                &["CREATION_SUCCESSFUL"],
            )),
            // A permissions- or tags-only update leaves the creation status in place.
            update: Some(WaitSpec::new(
                &["UPDATE_IN_PROGRESS"],
                &["UPDATE_SUCCESSFUL", "CREATION_SUCCESSFUL"],
            )),
            delete: None,
        }
    }

    fn status(state: &DataSourceState) -> String {
        state.description.status.clone()
    }

    async fn describe(api: &SharedApi, parts: &[String]) -> Result<DataSourceState, RemoteError> {
        let (account_id, data_source_id) = (&parts[0], &parts[1]);
        let description = api.describe_data_source(account_id, data_source_id).await?;
        let permissions = api
            .describe_data_source_permissions(account_id, data_source_id)
            .await?;
        let tags = api.list_tags_for_resource(&description.arn).await?;

        Ok(DataSourceState {
            description,
            permissions: (!permissions.is_empty()).then_some(permissions),
            tags: (!tags.is_empty()).then_some(tags),
        })
    }

    async fn create(
        api: &SharedApi,
        _parts: &[String],
        input: DataSourceInput,
        _declared: &Value,
    ) -> Result<(), RemoteError> {
        let DataSourceInput {
            definition,
            permissions,
            tags,
        } = input;
        api.create_data_source(CreateDataSourceRequest {
            data_source_type: definition.data_source_parameters.data_source_type().to_string(),
            definition,
            permissions: permissions.unwrap_or_default(),
            tags: tags.unwrap_or_default(),
        })
        .await
    }

    async fn update(
        api: &SharedApi,
        parts: &[String],
        input: DataSourceInput,
        _declared: &Value,
        _prior: &Value,
        changes: &ChangeSet,
    ) -> Result<(), RemoteError> {
        let (account_id, data_source_id) = (&parts[0], &parts[1]);
        let DataSourceInput {
            definition,
            permissions,
            tags,
        } = input;

        if changes.has_changes_except(SUB_RESOURCE_FIELDS) {
            api.update_data_source(definition).await?;
        }

        if changes.contains("permissions") {
            let current = api
                .describe_data_source_permissions(account_id, data_source_id)
                .await?;
            let (grant, revoke) = diff_permissions(&current, &permissions.unwrap_or_default());
            debug!(%data_source_id, grant = grant.len(), revoke = revoke.len(), "Permissions");
            if !grant.is_empty() || !revoke.is_empty() {
                api.update_data_source_permissions(account_id, data_source_id, grant, revoke)
                    .await?;
            }
        }

        if changes.contains("tags") {
            let arn = api.describe_data_source(account_id, data_source_id).await?.arn;
            sync_tags(api, &arn, tags.unwrap_or_default()).await?;
        }
        Ok(())
    }

    async fn delete(api: &SharedApi, parts: &[String]) -> Result<(), RemoteError> {
        api.delete_data_source(&parts[0], &parts[1]).await
    }
}
