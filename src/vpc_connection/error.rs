//! Error types for VPC connection operations.

use reconcile_framework::ReconcileError;
use thiserror::Error;

/// Errors that can occur during VPC connection operations.
#[derive(Debug, Error)]
pub enum VpcConnectionError {
    #[error("Invalid VPC connection declaration: {0}")]
    InvalidDeclaration(String),

    /// The connection settled in a failure status, e.g. `CREATION_FAILED`.
    #[error("VPC connection reached status {status}")]
    Failed { status: String },

    /// The role never became assumable within the retry budget.
    #[error("VPC connection role not usable: {0}")]
    RoleNotPropagated(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),

    #[error(transparent)]
    Reconcile(ReconcileError),
}

impl From<ReconcileError> for VpcConnectionError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::InvalidIdentity(_) | ReconcileError::Transcode(_) => {
                VpcConnectionError::InvalidDeclaration(e.to_string())
            }
            ReconcileError::UnexpectedState { status, .. } => VpcConnectionError::Failed { status },
            ReconcileError::RetryExhausted { ref source, .. }
                if source.message.contains("sts:AssumeRole") =>
            {
                VpcConnectionError::RoleNotPropagated(e.to_string())
            }
            ReconcileError::ActorClosed | ReconcileError::ActorDropped => {
                VpcConnectionError::ActorCommunicationError(e.to_string())
            }
            other => VpcConnectionError::Reconcile(other),
        }
    }
}
