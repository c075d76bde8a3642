//! # ResourceFamily Trait
//!
//! A resource family is one kind of remote object (a namespace, a data set, ...). The trait
//! is the contract between the generic [`Reconciler`](crate::reconciler::Reconciler) and the
//! family-specific code: it names the schema, the identity layout, the asynchronous phases,
//! and the four remote calls.
//!
//! Associated types keep the typed API structs of one family apart from every other
//! family's, so a data set input can never be sent to the namespace API.
//!
//! # Provided Methods
//! - [`ResourceFamily::lifecycle`]: no asynchronous phases.
//! - [`ResourceFamily::default_timeouts`]: five minutes per phase.
//! - [`ResourceFamily::retry_rules`]: no rules beyond the defaults.
//! - [`ResourceFamily::status`]: empty status.
//! - [`ResourceFamily::identity_parts`]: read the identity fields from the declared tree.
//! - [`ResourceFamily::update`]: rejected, for families with no update call.
//! - [`ResourceFamily::after_create`]: nothing to do.

use crate::config::Timeouts;
use crate::diff::ChangeSet;
use crate::identity::{IdentityCodec, IdentityError};
use crate::remote::{ErrorKind, RemoteError};
use crate::retry::RetryRule;
use crate::schema::ObjectSchema;
use crate::value::Value;
use crate::waiter::WaitSpec;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Identity field that falls back to the configured account when left unset.
pub const ACCOUNT_FIELD: &str = "aws_account_id";

/// The asynchronous phases of a family. `None` means the remote call completes
/// synchronously.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lifecycle {
    pub create: Option<WaitSpec>,
    pub update: Option<WaitSpec>,
    pub delete: Option<WaitSpec>,
}

#[async_trait]
pub trait ResourceFamily: Send + Sync + 'static {
    /// Name used in logs and error context, e.g. `quicksight_data_set`.
    const TYPE_NAME: &'static str;

    /// Composite key layout.
    const IDENTITY: IdentityCodec;

    /// Families without an update call copy changed declared values into the observed
    /// state instead.
    const UPDATABLE: bool = true;

    /// The runtime dependencies (usually the API client).
    type Context: Send + Sync + 'static;

    /// What describe returns. Serializes to the wire form that [`Self::schema`] flattens.
    type Remote: Serialize + Send + Sync + Debug;

    /// Typed create call input, deserialized from the expanded wire form.
    type CreateInput: DeserializeOwned + Clone + Send + Sync + Debug;

    /// Typed update call input, deserialized from the expanded wire form.
    type UpdateInput: DeserializeOwned + Clone + Send + Sync + Debug;

    fn schema() -> &'static ObjectSchema;

    fn lifecycle() -> Lifecycle {
        Lifecycle::default()
    }

    fn default_timeouts() -> Timeouts {
        Timeouts::default()
    }

    /// Family-specific transient errors, appended to the default table.
    fn retry_rules() -> Vec<RetryRule> {
        Vec::new()
    }

    /// The lifecycle status of a described object, matched against [`WaitSpec`] sets.
    fn status(_remote: &Self::Remote) -> String {
        String::new()
    }

    /// Builds the identity parts of a new object from its declared fields.
    fn identity_parts(declared: &Value, account_id: &str) -> Result<Vec<String>, IdentityError> {
        Self::IDENTITY
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| match declared.get(field).as_str() {
                Some(part) if !part.is_empty() => Ok(part.to_string()),
                _ if *field == ACCOUNT_FIELD && !account_id.is_empty() => {
                    Ok(account_id.to_string())
                }
                _ => Err(IdentityError::EmptyPart { index }),
            })
            .collect()
    }

    // --- Remote calls ---

    /// Fails with a not-found [`RemoteError`] when the object does not exist.
    async fn describe(ctx: &Self::Context, parts: &[String]) -> Result<Self::Remote, RemoteError>;

    async fn create(
        ctx: &Self::Context,
        parts: &[String],
        input: Self::CreateInput,
        declared: &Value,
    ) -> Result<(), RemoteError>;

    /// Calls that need the object to exist, such as attaching sub-resources. Runs once
    /// [`Self::create`] succeeded and its wait finished, under its own retry budget, so a
    /// transient failure here never repeats the create. Returns `true` when it changed
    /// the object and the waited-for description is stale.
    async fn after_create(
        _ctx: &Self::Context,
        _parts: &[String],
        _input: Self::CreateInput,
        _declared: &Value,
    ) -> Result<bool, RemoteError> {
        Ok(false)
    }

    /// Only called on updatable families, and only when `changes` is non-empty.
    async fn update(
        _ctx: &Self::Context,
        _parts: &[String],
        _input: Self::UpdateInput,
        _declared: &Value,
        _prior: &Value,
        _changes: &ChangeSet,
    ) -> Result<(), RemoteError> {
        Err(RemoteError::new(
            ErrorKind::InvalidRequest,
            format!("{} has no update operation", Self::TYPE_NAME),
        ))
    }

    async fn delete(ctx: &Self::Context, parts: &[String]) -> Result<(), RemoteError>;
}
