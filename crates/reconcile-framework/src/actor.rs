//! # Reconcile Actor
//!
//! The service side of one resource family. The actor owns a [`Reconciler`] and processes
//! [`ReconcileRequest`]s one at a time, which gives callers the single logical thread of
//! control per family that the reconciler expects.

use crate::client::ReconcileClient;
use crate::config::ReconcilerConfig;
use crate::family::ResourceFamily;
use crate::message::ReconcileRequest;
use crate::reconciler::Reconciler;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Sequential service loop around a [`Reconciler`].
///
/// # Usage Pattern
///
/// 1. **Create**: `ReconcileActor::new()` returns the actor and its client.
/// 2. **Wire**: pass the family context (the API client) into `actor.run(context)`.
/// 3. **Run**: spawn the run loop; it ends when every client has been dropped.
pub struct ReconcileActor<F: ResourceFamily> {
    receiver: mpsc::Receiver<ReconcileRequest>,
    config: ReconcilerConfig,
    _family: std::marker::PhantomData<fn() -> F>,
}

impl<F: ResourceFamily> ReconcileActor<F> {
    /// `buffer_size` is the request channel capacity; clients wait when it is full.
    pub fn new(buffer_size: usize, config: ReconcilerConfig) -> (Self, ReconcileClient<F>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            config,
            _family: std::marker::PhantomData,
        };
        (actor, ReconcileClient::new(sender))
    }

    /// Runs the loop until the channel closes. The context is bound here rather than in
    /// `new` so that families can depend on clients created after the actor.
    pub async fn run(self, context: F::Context) {
        let reconciler = Reconciler::<F>::new(context, self.config);
        Self::serve(self.receiver, reconciler).await;
    }

    /// Runs the loop with a prepared reconciler, e.g. one carrying a cancellation token.
    pub async fn run_with(self, reconciler: Reconciler<F>) {
        Self::serve(self.receiver, reconciler).await;
    }

    async fn serve(mut receiver: mpsc::Receiver<ReconcileRequest>, reconciler: Reconciler<F>) {
        let family = F::TYPE_NAME;
        info!(family, "Actor started");
        let mut handled = 0u64;

        while let Some(msg) = receiver.recv().await {
            let operation = msg.operation();
            handled += 1;
            let failed = match msg {
                ReconcileRequest::Create {
                    declared,
                    respond_to,
                } => {
                    let result = reconciler.create(&declared).await;
                    let failed = result.as_ref().err().map(ToString::to_string);
                    let _ = respond_to.send(result);
                    failed
                }
                ReconcileRequest::Read {
                    id,
                    prior,
                    respond_to,
                } => {
                    let result = reconciler.read(&id, &prior).await;
                    let failed = result.as_ref().err().map(ToString::to_string);
                    let _ = respond_to.send(result);
                    failed
                }
                ReconcileRequest::Update {
                    id,
                    declared,
                    prior,
                    respond_to,
                } => {
                    let result = reconciler.update(&id, &declared, &prior).await;
                    let failed = result.as_ref().err().map(ToString::to_string);
                    let _ = respond_to.send(result);
                    failed
                }
                ReconcileRequest::Delete { id, respond_to } => {
                    let result = reconciler.delete(&id).await;
                    let failed = result.as_ref().err().map(ToString::to_string);
                    let _ = respond_to.send(result);
                    failed
                }
                ReconcileRequest::Import { id, respond_to } => {
                    let result = reconciler.import(&id).await;
                    let failed = result.as_ref().err().map(ToString::to_string);
                    let _ = respond_to.send(result);
                    failed
                }
            };
            match failed {
                Some(error) => warn!(family, operation, %error, "Request failed"),
                None => debug!(family, operation, "Request done"),
            }
        }

        info!(family, handled, "Shutdown");
    }
}
