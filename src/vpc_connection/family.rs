//! [`ResourceFamily`] implementation for QuickSight VPC connections.
//!
//! Every phase is asynchronous (`CREATION_IN_PROGRESS`, `UPDATE_IN_PROGRESS`,
//! `DELETION_IN_PROGRESS`). A deleted connection stays describable with status `DELETED`
//! for a while; it is reported as absent.
//!
//! The connection's IAM role is often created in the same run, and the service rejects it
//! until the role has propagated. Those rejections are retried.

use crate::api::{SharedApi, VpcConnection, VpcConnectionRequest};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reconcile_framework::{
    AttributeNode as N, ChangeSet, ErrorKind, Field, IdentityCodec, Lifecycle, ObjectSchema,
    RemoteError, ResourceFamily, RetryRule, Value, WaitSpec, ACCOUNT_FIELD,
};

/// Describe status of a connection that is gone.
pub const DELETED: &str = "DELETED";

/// Marker type for the VPC connection family.
pub struct VpcConnectionFamily;

static SCHEMA: Lazy<ObjectSchema> = Lazy::new(|| {
    ObjectSchema::new(vec![
        Field::optional_computed(ACCOUNT_FIELD, N::string()),
        Field::required("vpc_connection_id", N::string()),
        Field::required("name", N::string()),
        Field::required("role_arn", N::string()),
        Field::required("security_group_ids", N::set(N::string())),
        Field::required("subnet_ids", N::set(N::string())),
        Field::optional_computed("dns_resolvers", N::set(N::string())),
        Field::computed("arn", N::string()),
        Field::computed("status", N::string()),
        Field::computed("availability_status", N::string()),
    ])
});

#[async_trait]
impl ResourceFamily for VpcConnectionFamily {
    const TYPE_NAME: &'static str = "quicksight_vpc_connection";
    const IDENTITY: IdentityCodec =
        IdentityCodec::new(',', &[ACCOUNT_FIELD, "vpc_connection_id"]);

    type Context = SharedApi;
    type Remote = VpcConnection;
    type CreateInput = VpcConnectionRequest;
    type UpdateInput = VpcConnectionRequest;

    fn schema() -> &'static ObjectSchema {
        &SCHEMA
    }

    fn lifecycle() -> Lifecycle {
        Lifecycle {
            create: Some(WaitSpec::new(
                &["CREATION_IN_PROGRESS"],
                &["CREATION_SUCCESSFUL"],
            )),
            update: Some(WaitSpec::new(&["UPDATE_IN_PROGRESS"], &["UPDATE_SUCCESSFUL"])),
            delete: Some(WaitSpec::until_absent(&["DELETION_IN_PROGRESS"])),
        }
    }

    fn retry_rules() -> Vec<RetryRule> {
        vec![RetryRule::message(ErrorKind::AccessDenied, "sts:AssumeRole")]
    }

    fn status(connection: &VpcConnection) -> String {
        connection.status.clone()
    }

    async fn describe(api: &SharedApi, parts: &[String]) -> Result<VpcConnection, RemoteError> {
        let connection = api.describe_vpc_connection(&parts[0], &parts[1]).await?;
        if connection.status == DELETED {
            return Err(RemoteError::not_found(format!(
                "VPC connection {} is deleted",
                parts[1]
            )));
        }
        Ok(connection)
    }

    async fn create(
        api: &SharedApi,
        _parts: &[String],
        input: VpcConnectionRequest,
        _declared: &Value,
    ) -> Result<(), RemoteError> {
        api.create_vpc_connection(input).await
    }

    async fn update(
        api: &SharedApi,
        _parts: &[String],
        input: VpcConnectionRequest,
        _declared: &Value,
        _prior: &Value,
        _changes: &ChangeSet,
    ) -> Result<(), RemoteError> {
        api.update_vpc_connection(input).await
    }

    async fn delete(api: &SharedApi, parts: &[String]) -> Result<(), RemoteError> {
        api.delete_vpc_connection(&parts[0], &parts[1]).await
    }
}
