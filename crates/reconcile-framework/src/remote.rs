//! # Remote Errors
//!
//! Errors returned by a remote management API are tagged exception types. The engine only
//! needs two things from them: the exception *kind* and the human-readable *message*. Both
//! are captured by [`RemoteError`]; classification into transient/permanent happens in
//! [`crate::retry`].

use std::fmt;
use std::str::FromStr;
use strum::EnumString;

/// Exception codes surfaced by the remote API.
///
/// Codes the engine does not know about are preserved verbatim in [`ErrorKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString)]
pub enum ErrorKind {
    #[strum(serialize = "ResourceNotFoundException")]
    ResourceNotFound,
    #[strum(serialize = "ThrottlingException")]
    Throttling,
    #[strum(serialize = "InternalFailureException")]
    InternalFailure,
    #[strum(serialize = "InvalidParameterValueException")]
    InvalidParameterValue,
    #[strum(serialize = "AccessDeniedException")]
    AccessDenied,
    #[strum(serialize = "ConflictException")]
    Conflict,
    #[strum(serialize = "ConcurrentUpdatingException")]
    ConcurrentUpdating,
    #[strum(serialize = "ResourceExistsException")]
    ResourceExists,
    #[strum(serialize = "ResourceUnavailableException")]
    ResourceUnavailable,
    #[strum(serialize = "LimitExceededException")]
    LimitExceeded,
    #[strum(serialize = "PreconditionNotMetException")]
    PreconditionNotMet,
    #[strum(serialize = "InvalidRequestException")]
    InvalidRequest,
    #[strum(default)]
    Other(String),
}

impl ErrorKind {
    /// The wire code of this kind, e.g. `ThrottlingException`.
    pub fn code(&self) -> &str {
        match self {
            ErrorKind::ResourceNotFound => "ResourceNotFoundException",
            ErrorKind::Throttling => "ThrottlingException",
            ErrorKind::InternalFailure => "InternalFailureException",
            ErrorKind::InvalidParameterValue => "InvalidParameterValueException",
            ErrorKind::AccessDenied => "AccessDeniedException",
            ErrorKind::Conflict => "ConflictException",
            ErrorKind::ConcurrentUpdating => "ConcurrentUpdatingException",
            ErrorKind::ResourceExists => "ResourceExistsException",
            ErrorKind::ResourceUnavailable => "ResourceUnavailableException",
            ErrorKind::LimitExceeded => "LimitExceededException",
            ErrorKind::PreconditionNotMet => "PreconditionNotMetException",
            ErrorKind::InvalidRequest => "InvalidRequestException",
            ErrorKind::Other(code) => code,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A failure reported by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RemoteError {
    pub kind: ErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Builds an error from a raw exception code, keeping unknown codes as [`ErrorKind::Other`].
    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        // EnumString with a default variant never fails.
        let kind = ErrorKind::from_str(code).unwrap_or_else(|_| ErrorKind::Other(code.to_string()));
        Self::new(kind, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResourceNotFound, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::ResourceNotFound
    }

    /// True when the kind matches and, if given, the message contains `needle`.
    pub fn matches(&self, kind: &ErrorKind, needle: Option<&str>) -> bool {
        &self.kind == kind && needle.is_none_or(|n| self.message.contains(n))
    }
}
