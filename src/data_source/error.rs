//! Error types for data source operations.

use reconcile_framework::{ErrorKind, ReconcileError, TranscodeError};
use thiserror::Error;

/// Errors that can occur during data source operations.
#[derive(Debug, Error)]
pub enum DataSourceError {
    /// The parameters block sets zero or several engines.
    #[error("Data source parameters must set exactly one engine: {0}")]
    InvalidParameters(String),

    #[error("Invalid data source declaration: {0}")]
    InvalidDeclaration(String),

    #[error("Data source already exists: {0}")]
    AlreadyExists(String),

    /// The data source settled in `CREATION_FAILED` or `UPDATE_FAILED`.
    #[error("Data source reached status {status}")]
    Failed { status: String },

    /// The engine changed; the data source has to be deleted and created again.
    #[error("Data source type cannot change in place: {0}")]
    ReplacementRequired(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),

    #[error(transparent)]
    Reconcile(ReconcileError),
}

impl From<ReconcileError> for DataSourceError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::Transcode(TranscodeError::InvalidVariant { .. }) => {
                DataSourceError::InvalidParameters(e.to_string())
            }
            ReconcileError::InvalidIdentity(_) | ReconcileError::Transcode(_) => {
                DataSourceError::InvalidDeclaration(e.to_string())
            }
            ReconcileError::Remote { ref source, .. } if source.kind == ErrorKind::ResourceExists => {
                DataSourceError::AlreadyExists(e.to_string())
            }
            ReconcileError::Remote { ref source, .. }
                if source.matches(&ErrorKind::InvalidParameterValue, Some("cannot change the type")) =>
            {
                DataSourceError::ReplacementRequired(e.to_string())
            }
            ReconcileError::UnexpectedState { status, .. } => DataSourceError::Failed { status },
            ReconcileError::ActorClosed | ReconcileError::ActorDropped => {
                DataSourceError::ActorCommunicationError(e.to_string())
            }
            other => DataSourceError::Reconcile(other),
        }
    }
}
