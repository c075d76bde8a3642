//! [`ResourceFamily`] implementation for SPICE ingestions.
//!
//! An ingestion is a one-shot refresh of a data set. Creating it starts the refresh and
//! waits for `COMPLETED`; there is nothing to update. Deleting it cancels it, and a
//! cancelled ingestion reads as absent.

use crate::api::{CreateIngestionRequest, Ingestion, SharedApi};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reconcile_framework::{
    AttributeNode as N, Field, IdentityCodec, Lifecycle, ObjectSchema, RemoteError,
    ResourceFamily, Timeouts, Value, WaitSpec, ACCOUNT_FIELD,
};
use std::time::Duration;

pub const CANCELLED: &str = "CANCELLED";

/// Marker type for the ingestion family.
pub struct IngestionFamily;

static SCHEMA: Lazy<ObjectSchema> = Lazy::new(|| {
    ObjectSchema::new(vec![
        Field::optional_computed(ACCOUNT_FIELD, N::string()),
        Field::required("data_set_id", N::string()),
        Field::required("ingestion_id", N::string()),
        Field::optional_computed("ingestion_type", N::string()),
        Field::computed("arn", N::string()),
        Field::computed("ingestion_status", N::string()),
        Field::computed("created_time", N::timestamp()),
    ])
});

#[async_trait]
impl ResourceFamily for IngestionFamily {
    const TYPE_NAME: &'static str = "quicksight_ingestion";
    const IDENTITY: IdentityCodec =
        IdentityCodec::new(',', &[ACCOUNT_FIELD, "data_set_id", "ingestion_id"]);
    const UPDATABLE: bool = false;

    type Context = SharedApi;
    type Remote = Ingestion;
    type CreateInput = CreateIngestionRequest;
    type UpdateInput = CreateIngestionRequest;

    fn schema() -> &'static ObjectSchema {
        &SCHEMA
    }

    fn lifecycle() -> Lifecycle {
        Lifecycle {
            create: Some(WaitSpec::new(
                &["INITIALIZED", "QUEUED", "RUNNING"],
                &["COMPLETED"],
            )),
            ..Lifecycle::default()
        }
    }

    fn default_timeouts() -> Timeouts {
        Timeouts {
            create: Duration::from_secs(10 * 60),
            ..Timeouts::default()
        }
    }

    fn status(ingestion: &Ingestion) -> String {
        ingestion.ingestion_status.clone()
    }

    async fn describe(api: &SharedApi, parts: &[String]) -> Result<Ingestion, RemoteError> {
        let ingestion = api
            .describe_ingestion(&parts[0], &parts[1], &parts[2])
            .await?;
        if ingestion.ingestion_status == CANCELLED {
            return Err(RemoteError::not_found(format!(
                "ingestion {} was cancelled",
                parts[2]
            )));
        }
        Ok(ingestion)
    }

    async fn create(
        api: &SharedApi,
        _parts: &[String],
        input: CreateIngestionRequest,
        _declared: &Value,
    ) -> Result<(), RemoteError> {
        api.create_ingestion(input).await
    }

    async fn delete(api: &SharedApi, parts: &[String]) -> Result<(), RemoteError> {
        api.cancel_ingestion(&parts[0], &parts[1], &parts[2]).await
    }
}
