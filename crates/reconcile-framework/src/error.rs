//! # Reconciliation Errors
//!
//! Each layer has its own error enum ([`IdentityError`], [`TranscodeError`], [`WaitError`]).
//! [`ReconcileError`] is what reconciler and client callers see: it wraps the layer errors
//! and adds the operation context needed to reproduce a failure.
//!
//! Absence is not an error. A read that finds nothing returns
//! [`Observed::Absent`](crate::reconciler::Observed::Absent), and a delete of something
//! already gone succeeds.

use crate::identity::IdentityError;
use crate::remote::RemoteError;
use crate::transcode::TranscodeError;
use crate::waiter::WaitError;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Invalid identity: {0}")]
    InvalidIdentity(#[from] IdentityError),

    #[error("Transcoding failed: {0}")]
    Transcode(#[from] TranscodeError),

    #[error("{operation} failed: {source}")]
    Remote {
        operation: String,
        source: RemoteError,
    },

    #[error("{operation} failed after {attempts} attempt(s): {source}")]
    RetryExhausted {
        operation: String,
        attempts: u32,
        source: RemoteError,
    },

    #[error(
        "{operation} did not reach a terminal state within {timeout:?} (last status: {last_status}); the remote operation may still be in progress"
    )]
    WaitTimeout {
        operation: String,
        timeout: Duration,
        last_status: String,
    },

    #[error("{operation} was cancelled")]
    Cancelled { operation: String },

    #[error("{operation} reached unexpected status {status}")]
    UnexpectedState { operation: String, status: String },

    #[error("{operation} failed while waiting: {source}")]
    Wait {
        operation: String,
        source: WaitError,
    },

    #[error("{operation}: {message}")]
    Family { operation: String, message: String },

    /// The object was created but a follow-up call failed. It exists remotely, so the
    /// caller should track `id` and converge it with an update.
    #[error("{id} was created but not fully configured: {source}")]
    PartiallyCreated {
        id: String,
        source: Box<ReconcileError>,
    },

    #[error("Actor closed")]
    ActorClosed,

    #[error("Actor dropped response channel")]
    ActorDropped,
}

impl ReconcileError {
    pub fn remote(operation: impl Into<String>, source: RemoteError) -> Self {
        Self::Remote {
            operation: operation.into(),
            source,
        }
    }

    /// A family-specific failure that is neither a remote nor a transcoding error.
    pub fn family(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Family {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn partially_created(id: impl Into<String>, source: ReconcileError) -> Self {
        Self::PartiallyCreated {
            id: id.into(),
            source: Box::new(source),
        }
    }

    /// Attaches operation context to a waiter failure.
    pub fn from_wait(operation: impl Into<String>, source: WaitError) -> Self {
        let operation = operation.into();
        match source {
            WaitError::Timeout {
                timeout,
                last_status,
            } => Self::WaitTimeout {
                operation,
                timeout,
                last_status,
            },
            WaitError::Cancelled => Self::Cancelled { operation },
            WaitError::UnexpectedState { status, .. } => {
                Self::UnexpectedState { operation, status }
            }
            WaitError::Remote(source) => Self::Remote { operation, source },
            other => Self::Wait {
                operation,
                source: other,
            },
        }
    }

    /// The underlying remote error, if this failure came from the remote API.
    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote { source, .. } | Self::RetryExhausted { source, .. } => Some(source),
            Self::PartiallyCreated { source, .. } => source.remote_error(),
            _ => None,
        }
    }

    /// Id of an object left behind by a create that failed halfway.
    pub fn created_id(&self) -> Option<&str> {
        match self {
            Self::PartiallyCreated { id, .. } => Some(id),
            _ => None,
        }
    }
}
