//! # Service Messages
//!
//! Requests sent from a [`ReconcileClient`](crate::client::ReconcileClient) to a
//! [`ReconcileActor`](crate::actor::ReconcileActor). One variant per reconciler operation.

use crate::error::ReconcileError;
use crate::reconciler::{Observed, ResourceState};
use crate::value::Value;
use tokio::sync::oneshot;

/// One-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<Result<T, ReconcileError>>;

#[derive(Debug)]
pub enum ReconcileRequest {
    Create {
        declared: Value,
        respond_to: Response<ResourceState>,
    },
    Read {
        id: String,
        prior: Value,
        respond_to: Response<Observed>,
    },
    Update {
        id: String,
        declared: Value,
        prior: Value,
        respond_to: Response<Observed>,
    },
    Delete {
        id: String,
        respond_to: Response<()>,
    },
    Import {
        id: String,
        respond_to: Response<Observed>,
    },
}

impl ReconcileRequest {
    /// Operation name for logs.
    pub fn operation(&self) -> &'static str {
        match self {
            ReconcileRequest::Create { .. } => "create",
            ReconcileRequest::Read { .. } => "read",
            ReconcileRequest::Update { .. } => "update",
            ReconcileRequest::Delete { .. } => "delete",
            ReconcileRequest::Import { .. } => "import",
        }
    }
}
