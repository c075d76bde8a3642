//! [`ResourceFamily`] implementation for QuickSight namespaces.
//!
//! Namespaces have no update call: every declared field either names the namespace or is
//! fixed at creation. Creation and deletion are both asynchronous; a deleting namespace
//! stays visible as `DELETING` until it vanishes.

use crate::api::{CreateNamespaceRequest, NamespaceInfo, SharedApi};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reconcile_framework::{
    AttributeNode as N, Field, IdentityCodec, Lifecycle, ObjectSchema, RemoteError,
    ResourceFamily, Timeouts, Value, WaitSpec, ACCOUNT_FIELD,
};
use std::time::Duration;

/// Marker type for the namespace family.
pub struct Namespace;

static SCHEMA: Lazy<ObjectSchema> = Lazy::new(|| {
    ObjectSchema::new(vec![
        Field::optional_computed(ACCOUNT_FIELD, N::string()),
        Field::required("namespace", N::string()),
        Field::optional_computed("identity_store", N::string()),
        Field::computed("arn", N::string()),
        Field::computed("capacity_region", N::string()),
        Field::computed("creation_status", N::string()),
    ])
});

#[async_trait]
impl ResourceFamily for Namespace {
    const TYPE_NAME: &'static str = "quicksight_namespace";
    const IDENTITY: IdentityCodec = IdentityCodec::new(',', &[ACCOUNT_FIELD, "namespace"]);
    const UPDATABLE: bool = false;

    type Context = SharedApi;
    type Remote = NamespaceInfo;
    type CreateInput = CreateNamespaceRequest;
    type UpdateInput = CreateNamespaceRequest;

    fn schema() -> &'static ObjectSchema {
        &SCHEMA
    }

    fn lifecycle() -> Lifecycle {
        Lifecycle {
            create: Some(WaitSpec::new(&["CREATING"], &["CREATED"])),
            update: None,
            delete: Some(WaitSpec::until_absent(&["DELETING"])),
        }
    }

    fn default_timeouts() -> Timeouts {
        Timeouts::uniform(Duration::from_secs(2 * 60))
    }

    fn status(info: &NamespaceInfo) -> String {
        info.creation_status.clone()
    }

    async fn describe(api: &SharedApi, parts: &[String]) -> Result<NamespaceInfo, RemoteError> {
        api.describe_namespace(&parts[0], &parts[1]).await
    }

    async fn create(
        api: &SharedApi,
        _parts: &[String],
        input: CreateNamespaceRequest,
        _declared: &Value,
    ) -> Result<(), RemoteError> {
        api.create_namespace(input).await
    }

    async fn delete(api: &SharedApi, parts: &[String]) -> Result<(), RemoteError> {
        api.delete_namespace(&parts[0], &parts[1]).await
    }
}
