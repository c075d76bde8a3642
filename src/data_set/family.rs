//! [`ResourceFamily`] implementation for QuickSight data sets.
//!
//! A data set is one object on the declared side but four on the remote side: the data set
//! itself, its permissions, its refresh properties and its tags. Describe stitches them
//! together; update sends only the parts that changed, each to its own call.
//!
//! Create and update are synchronous.

use super::schema::{DATA_SET_SCHEMA, SUB_RESOURCE_FIELDS};
use crate::api::{
    sync_tags, CreateDataSetRequest, DataSetDefinition, DataSetDescription,
    DataSetRefreshProperties, ResourcePermission, SharedApi,
};
use crate::permissions::diff_permissions;
use async_trait::async_trait;
use reconcile_framework::{
    ChangeSet, ErrorKind, IdentityCodec, ObjectSchema, RemoteError, ResourceFamily, Value,
    ACCOUNT_FIELD,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Marker type for the data set family.
pub struct DataSet;

/// Expanded declaration: the `UpdateDataSet` fields plus the sub-resources.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataSetInput {
    #[serde(flatten)]
    pub definition: DataSetDefinition,
    pub permissions: Option<Vec<ResourcePermission>>,
    pub refresh_properties: Option<DataSetRefreshProperties>,
    pub tags: Option<BTreeMap<String, String>>,
}

/// Everything describe gathers. Empty sub-resources serialize as absent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataSetState {
    #[serde(flatten)]
    pub description: DataSetDescription,
    pub permissions: Option<Vec<ResourcePermission>>,
    pub refresh_properties: Option<DataSetRefreshProperties>,
    pub tags: Option<BTreeMap<String, String>>,
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

async fn describe_refresh_properties(
    api: &SharedApi,
    account_id: &str,
    data_set_id: &str,
) -> Result<Option<DataSetRefreshProperties>, RemoteError> {
    match api
        .describe_data_set_refresh_properties(account_id, data_set_id)
        .await
    {
        Ok(properties) => Ok(Some(properties)),
        Err(e)
            if e.is_not_found()
                || e.matches(&ErrorKind::InvalidParameterValue, Some("not a SPICE dataset")) =>
        {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[async_trait]
impl ResourceFamily for DataSet {
    const TYPE_NAME: &'static str = "quicksight_data_set";
    const IDENTITY: IdentityCodec = IdentityCodec::new(',', &[ACCOUNT_FIELD, "data_set_id"]);

    type Context = SharedApi;
    type Remote = DataSetState;
    type CreateInput = DataSetInput;
    type UpdateInput = DataSetInput;

    fn schema() -> &'static ObjectSchema {
        &DATA_SET_SCHEMA
    }

    async fn describe(api: &SharedApi, parts: &[String]) -> Result<DataSetState, RemoteError> {
        let (account_id, data_set_id) = (&parts[0], &parts[1]);
        let description = api.describe_data_set(account_id, data_set_id).await?;
        let permissions = api
            .describe_data_set_permissions(account_id, data_set_id)
            .await?;
        let refresh_properties = describe_refresh_properties(api, account_id, data_set_id).await?;
        let tags = api.list_tags_for_resource(&description.arn).await?;

        Ok(DataSetState {
            description,
            permissions: non_empty(permissions),
            refresh_properties,
            tags: (!tags.is_empty()).then_some(tags),
        })
    }

    async fn create(
        api: &SharedApi,
        _parts: &[String],
        input: DataSetInput,
        _declared: &Value,
    ) -> Result<(), RemoteError> {
        let DataSetInput {
            definition,
            permissions,
            tags,
            ..
        } = input;
        api.create_data_set(CreateDataSetRequest {
            definition,
            permissions: permissions.unwrap_or_default(),
            tags: tags.unwrap_or_default(),
        })
        .await
    }

    /// Refresh properties can only be attached once the data set exists.
    async fn after_create(
        api: &SharedApi,
        parts: &[String],
        input: DataSetInput,
        _declared: &Value,
    ) -> Result<bool, RemoteError> {
        let Some(properties) = input.refresh_properties else {
            return Ok(false);
        };
        api.put_data_set_refresh_properties(&parts[0], &parts[1], properties)
            .await?;
        Ok(true)
    }

    async fn update(
        api: &SharedApi,
        parts: &[String],
        input: DataSetInput,
        _declared: &Value,
        _prior: &Value,
        changes: &ChangeSet,
    ) -> Result<(), RemoteError> {
        let (account_id, data_set_id) = (&parts[0], &parts[1]);
        let DataSetInput {
            definition,
            permissions,
            refresh_properties,
            tags,
        } = input;

        if changes.has_changes_except(SUB_RESOURCE_FIELDS) {
            api.update_data_set(definition).await?;
        }

        if changes.contains("permissions") {
            let current = api
                .describe_data_set_permissions(account_id, data_set_id)
                .await?;
            let (grant, revoke) = diff_permissions(&current, &permissions.unwrap_or_default());
            debug!(%data_set_id, grant = grant.len(), revoke = revoke.len(), "Permissions");
            if !grant.is_empty() || !revoke.is_empty() {
                api.update_data_set_permissions(account_id, data_set_id, grant, revoke)
                    .await?;
            }
        }

        if changes.contains("refresh_properties") {
            match refresh_properties {
                Some(properties) => {
                    api.put_data_set_refresh_properties(account_id, data_set_id, properties)
                        .await?
                }
                None => match api
                    .delete_data_set_refresh_properties(account_id, data_set_id)
                    .await
                {
                    Err(e) if e.is_not_found() => {}
                    other => other?,
                },
            }
        }

        if changes.contains("tags") {
            let arn = api.describe_data_set(account_id, data_set_id).await?.arn;
            sync_tags(api, &arn, tags.unwrap_or_default()).await?;
        }
        Ok(())
    }

    async fn delete(api: &SharedApi, parts: &[String]) -> Result<(), RemoteError> {
        api.delete_data_set(&parts[0], &parts[1]).await
    }
}
