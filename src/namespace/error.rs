//! Error types for namespace operations.

use reconcile_framework::ReconcileError;
use thiserror::Error;

/// Errors that can occur during namespace operations.
#[derive(Debug, Error)]
pub enum NamespaceError {
    /// The declaration could not be turned into a request, or the id could not be parsed.
    #[error("Invalid namespace declaration: {0}")]
    InvalidDeclaration(String),

    /// Creation ended in a failure status such as `NON_RETRYABLE_FAILURE`.
    #[error("Namespace creation failed with status {status}")]
    CreationFailed { status: String },

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),

    #[error(transparent)]
    Reconcile(ReconcileError),
}

impl From<ReconcileError> for NamespaceError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::InvalidIdentity(_) | ReconcileError::Transcode(_) => {
                NamespaceError::InvalidDeclaration(e.to_string())
            }
            ReconcileError::UnexpectedState { status, .. } => {
                NamespaceError::CreationFailed { status }
            }
            ReconcileError::ActorClosed | ReconcileError::ActorDropped => {
                NamespaceError::ActorCommunicationError(e.to_string())
            }
            other => NamespaceError::Reconcile(other),
        }
    }
}
