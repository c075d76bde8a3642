//! # Lifecycle Reconciler
//!
//! Drives one resource family through create, read, update, delete and import, using the
//! identity codec, the transcoder, the retry classifier and the async waiter.
//!
//! ```text
//!  NotCreated ──create──▶ Creating ──wait──▶ Present ──update──▶ Updating ──wait──▶ Present
//!                                               │
//!                                            delete
//!                                               ▼
//!                                           Deleting ──wait──▶ Gone
//! ```
//!
//! Operations against one identity are serialized with a per-key async mutex, so a
//! reconciler may be shared freely between tasks.

use crate::config::{ReconcilerConfig, Timeouts};
use crate::diff::diff;
use crate::error::ReconcileError;
use crate::family::ResourceFamily;
use crate::remote::RemoteError;
use crate::retry::{retry_transient, RetryClassifier};
use crate::transcode::{expand_typed, flatten_typed};
use crate::value::Value;
use crate::waiter::{AsyncWaiter, WaitSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The observed state of one tracked remote object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Packed composite key.
    pub id: String,
    pub attributes: Value,
}

/// Result of a read or update.
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    Present(ResourceState),
    /// The remote object no longer exists; the caller should stop tracking it.
    Absent,
}

impl Observed {
    pub fn into_state(self) -> Option<ResourceState> {
        match self {
            Observed::Present(state) => Some(state),
            Observed::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Observed::Absent)
    }
}

pub struct Reconciler<F: ResourceFamily> {
    context: F::Context,
    config: ReconcilerConfig,
    timeouts: Timeouts,
    classifier: RetryClassifier,
    cancel: CancellationToken,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<F: ResourceFamily> Reconciler<F> {
    pub fn new(context: F::Context, config: ReconcilerConfig) -> Self {
        let timeouts = config.timeouts.apply(F::default_timeouts());
        Self {
            context,
            config,
            timeouts,
            classifier: RetryClassifier::with_rules(F::retry_rules()),
            cancel: CancellationToken::new(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Cancels waits in progress and any started later.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn context(&self) -> &F::Context {
        &self.context
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// Creates the remote object described by `declared` and returns its observed state.
    ///
    /// A failed create leaves nothing tracked: no state is returned. The exception is
    /// [`ReconcileError::PartiallyCreated`], which carries the id of an object that exists
    /// but whose follow-up configuration failed.
    pub async fn create(&self, declared: &Value) -> Result<ResourceState, ReconcileError> {
        let family = F::TYPE_NAME;
        let parts = F::identity_parts(declared, &self.config.account_id)?;
        let id = F::IDENTITY.pack(&parts)?;
        let _guard = self.lock(&id).await;
        let operation = format!("create {family} {id}");

        let declared = with_identity::<F>(declared, &parts);
        let input: F::CreateInput = expand_typed(F::schema(), &declared)?;
        debug!(family, %id, ?input, "Create");

        let ctx = &self.context;
        let (parts_ref, declared_ref, input_ref) = (&parts, &declared, &input);
        retry_transient(&self.config.retry, &self.classifier, &operation, move || {
            let input = input_ref.clone();
            async move { F::create(ctx, parts_ref, input, declared_ref).await }
        })
        .await?;
        info!(family, %id, "Create requested");

        let remote = match &F::lifecycle().create {
            Some(spec) => self.wait(&operation, spec, self.timeouts.create, &parts).await?,
            None => None,
        };

        // The object exists from here on; failures must hand its id back.
        let follow_up = format!("configure {family} {id}");
        let changed = retry_transient(&self.config.retry, &self.classifier, &follow_up, move || {
            let input = input_ref.clone();
            async move { F::after_create(ctx, parts_ref, input, declared_ref).await }
        })
        .await
        .map_err(|source| ReconcileError::partially_created(&id, source))?;
        let remote = if changed { None } else { remote };

        let remote = match remote {
            Some(remote) => remote,
            None => self
                .describe(&operation, &parts)
                .await?
                .ok_or_else(|| ReconcileError::family(&operation, "object vanished after create"))?,
        };

        let attributes = self.observe(&remote, &declared, &parts)?;
        info!(family, %id, "Created");
        Ok(ResourceState { id, attributes })
    }

    /// Re-fetches the remote object. `prior` is the last declared or observed tree, used to
    /// recover null-versus-empty intent.
    pub async fn read(&self, id: &str, prior: &Value) -> Result<Observed, ReconcileError> {
        let family = F::TYPE_NAME;
        let parts = F::IDENTITY.parse(id)?;
        let _guard = self.lock(id).await;
        let operation = format!("read {family} {id}");

        match self.describe(&operation, &parts).await? {
            Some(remote) => {
                let attributes = self.observe(&remote, prior, &parts)?;
                debug!(family, %id, "Read");
                Ok(Observed::Present(ResourceState {
                    id: id.to_string(),
                    attributes,
                }))
            }
            None => {
                warn!(family, %id, "Not found, removing from tracked state");
                Ok(Observed::Absent)
            }
        }
    }

    /// Brings the remote object in line with `declared`. No remote call is made when nothing
    /// tracked changed. A failed update leaves `prior` untouched.
    pub async fn update(
        &self,
        id: &str,
        declared: &Value,
        prior: &Value,
    ) -> Result<Observed, ReconcileError> {
        let family = F::TYPE_NAME;
        let parts = F::IDENTITY.parse(id)?;
        let _guard = self.lock(id).await;
        let operation = format!("update {family} {id}");

        let declared = with_identity::<F>(declared, &parts);
        let changes = diff(F::schema(), &declared, prior);
        if changes.is_empty() {
            debug!(family, %id, "No changes");
            return Ok(Observed::Present(ResourceState {
                id: id.to_string(),
                attributes: prior.clone(),
            }));
        }
        debug!(family, %id, changes = ?changes.iter().collect::<Vec<_>>(), "Update");

        if !F::UPDATABLE {
            let mut attributes = prior.clone();
            for field in changes.iter() {
                attributes.set(field, declared.get(field).clone());
            }
            info!(family, %id, "Updated locally");
            return Ok(Observed::Present(ResourceState {
                id: id.to_string(),
                attributes,
            }));
        }

        let input: F::UpdateInput = expand_typed(F::schema(), &declared)?;
        let ctx = &self.context;
        let (parts_ref, declared_ref, changes_ref) = (&parts, &declared, &changes);
        let sent = retry_transient(&self.config.retry, &self.classifier, &operation, move || {
            let input = input.clone();
            async move { F::update(ctx, parts_ref, input, declared_ref, prior, changes_ref).await }
        })
        .await;
        match sent {
            Err(err) if err.remote_error().is_some_and(RemoteError::is_not_found) => {
                warn!(family, %id, "Not found during update");
                return Ok(Observed::Absent);
            }
            other => other?,
        }

        let remote = match &F::lifecycle().update {
            Some(spec) => self.wait(&operation, spec, self.timeouts.update, &parts).await?,
            None => None,
        };
        let remote = match remote {
            Some(remote) => remote,
            None => match self.describe(&operation, &parts).await? {
                Some(remote) => remote,
                None => return Ok(Observed::Absent),
            },
        };

        let attributes = self.observe(&remote, &declared, &parts)?;
        info!(family, %id, "Updated");
        Ok(Observed::Present(ResourceState {
            id: id.to_string(),
            attributes,
        }))
    }

    /// Deletes the remote object. Deleting something already gone succeeds.
    pub async fn delete(&self, id: &str) -> Result<(), ReconcileError> {
        let family = F::TYPE_NAME;
        let parts = F::IDENTITY.parse(id)?;
        let guard = self.lock(id).await;
        let operation = format!("delete {family} {id}");

        let ctx = &self.context;
        let parts_ref = &parts;
        let sent = retry_transient(&self.config.retry, &self.classifier, &operation, move || {
            F::delete(ctx, parts_ref)
        })
        .await;
        match sent {
            Err(err) if err.remote_error().is_some_and(RemoteError::is_not_found) => {
                info!(family, %id, "Already deleted");
                self.release(id, guard).await;
                return Ok(());
            }
            other => other?,
        }

        if let Some(spec) = &F::lifecycle().delete {
            self.wait(&operation, spec, self.timeouts.delete, &parts).await?;
        }
        info!(family, %id, "Deleted");
        self.release(id, guard).await;
        Ok(())
    }

    /// Starts tracking an existing object from an externally supplied identifier.
    pub async fn import(&self, id: &str) -> Result<Observed, ReconcileError> {
        info!(family = F::TYPE_NAME, %id, "Import");
        self.read(id, &Value::Null).await
    }

    async fn lock(&self, id: &str) -> OwnedMutexGuard<()> {
        let key_lock = self
            .locks
            .lock()
            .await
            .entry(id.to_string())
            .or_default()
            .clone();
        key_lock.lock_owned().await
    }

    /// Forgets the lock of a deleted identity unless another operation holds or awaits it.
    async fn release(&self, id: &str, guard: OwnedMutexGuard<()>) {
        let mut locks = self.locks.lock().await;
        drop(guard);
        if locks.get(id).is_some_and(|key_lock| Arc::strong_count(key_lock) == 1) {
            locks.remove(id);
        }
    }

    /// Number of identities with a per-key lock entry.
    pub async fn tracked_locks(&self) -> usize {
        self.locks.lock().await.len()
    }

    /// Describe with not-found mapped to `None`.
    async fn describe(
        &self,
        operation: &str,
        parts: &[String],
    ) -> Result<Option<F::Remote>, ReconcileError> {
        match F::describe(&self.context, parts).await {
            Ok(remote) => Ok(Some(remote)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(ReconcileError::remote(operation, err)),
        }
    }

    async fn wait(
        &self,
        operation: &str,
        spec: &WaitSpec,
        timeout: Duration,
        parts: &[String],
    ) -> Result<Option<F::Remote>, ReconcileError> {
        let ctx = &self.context;
        AsyncWaiter::new(spec, timeout, &self.classifier)
            .with_cancellation(self.cancel.clone())
            .with_poll_floor(self.config.min_poll_interval())
            .wait(move || async move {
                match F::describe(ctx, parts).await {
                    Ok(remote) => {
                        let status = F::status(&remote);
                        Ok(Some((remote, status)))
                    }
                    Err(err) if err.is_not_found() => Ok(None),
                    Err(err) => Err(err),
                }
            })
            .await
            .map_err(|e| ReconcileError::from_wait(operation, e))
    }

    fn observe(
        &self,
        remote: &F::Remote,
        prior: &Value,
        parts: &[String],
    ) -> Result<Value, ReconcileError> {
        let observed = flatten_typed(F::schema(), remote, prior)?;
        Ok(with_identity::<F>(&observed, parts))
    }
}

/// A copy of `value` with the identity fields set from the key parts.
fn with_identity<F: ResourceFamily>(value: &Value, parts: &[String]) -> Value {
    let mut value = value.clone();
    for (field, part) in F::IDENTITY.fields.iter().zip(parts) {
        value.set(*field, Value::from(part.as_str()));
    }
    value
}
