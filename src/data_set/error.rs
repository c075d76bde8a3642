//! Error types for data set operations.

use reconcile_framework::{ErrorKind, ReconcileError, TranscodeError};
use thiserror::Error;

/// Errors that can occur during data set operations.
#[derive(Debug, Error)]
pub enum DataSetError {
    /// A table source block has zero or several sources set.
    #[error("Data set table source must set exactly one option: {0}")]
    InvalidTableSource(String),

    #[error("Invalid data set declaration: {0}")]
    InvalidDeclaration(String),

    /// A data set with the same id already exists and is not tracked.
    #[error("Data set already exists: {0}")]
    AlreadyExists(String),

    /// The data set exists but a follow-up call failed; track `id` and update it.
    #[error("Data set {id} was created but not fully configured: {message}")]
    PartiallyCreated { id: String, message: String },

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),

    #[error(transparent)]
    Reconcile(ReconcileError),
}

impl From<ReconcileError> for DataSetError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::Transcode(TranscodeError::InvalidVariant { .. }) => {
                DataSetError::InvalidTableSource(e.to_string())
            }
            ReconcileError::InvalidIdentity(_) | ReconcileError::Transcode(_) => {
                DataSetError::InvalidDeclaration(e.to_string())
            }
            ReconcileError::Remote { ref source, .. } if source.kind == ErrorKind::ResourceExists => {
                DataSetError::AlreadyExists(e.to_string())
            }
            ReconcileError::PartiallyCreated { id, source } => DataSetError::PartiallyCreated {
                id,
                message: source.to_string(),
            },
            ReconcileError::ActorClosed | ReconcileError::ActorDropped => {
                DataSetError::ActorCommunicationError(e.to_string())
            }
            other => DataSetError::Reconcile(other),
        }
    }
}
