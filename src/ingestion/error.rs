//! Error types for ingestion operations.

use reconcile_framework::ReconcileError;
use thiserror::Error;

/// Errors that can occur during ingestion operations.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Invalid ingestion declaration: {0}")]
    InvalidDeclaration(String),

    /// The ingestion ended in `FAILED` (or another non-success status).
    #[error("Ingestion finished with status {status}")]
    Failed { status: String },

    /// Still running when the create timeout elapsed. It may yet complete.
    #[error("Ingestion still running: {0}")]
    StillRunning(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),

    #[error(transparent)]
    Reconcile(ReconcileError),
}

impl From<ReconcileError> for IngestionError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::InvalidIdentity(_) | ReconcileError::Transcode(_) => {
                IngestionError::InvalidDeclaration(e.to_string())
            }
            ReconcileError::UnexpectedState { status, .. } => IngestionError::Failed { status },
            ReconcileError::WaitTimeout { .. } => IngestionError::StillRunning(e.to_string()),
            ReconcileError::ActorClosed | ReconcileError::ActorDropped => {
                IngestionError::ActorCommunicationError(e.to_string())
            }
            other => IngestionError::Reconcile(other),
        }
    }
}
