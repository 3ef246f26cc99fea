//! Marketplace error types.
//!
//! Every failure carries an [`ErrorKind`] so callers can branch on the kind
//! without string matching, plus a human-readable message. Composed operations
//! prefix the message with what they were doing; the kind is never rewritten.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The category of a marketplace failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or out-of-range input, blank text, bad configuration option.
    InvalidArgument,
    /// Lookup miss by key.
    NotFound,
    /// Duplicate registration.
    AlreadyExists,
    /// A required handle was absent.
    NullReference,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "invalid argument"),
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::AlreadyExists => write!(f, "already exists"),
            ErrorKind::NullReference => write!(f, "null reference"),
        }
    }
}

/// A typed marketplace failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    pub fn null_reference(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NullReference, message)
    }

    /// The failure category.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The message, including any context prefixes.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prefix the message with the operation that was in progress.
    pub fn context(self, operation: &str) -> Self {
        Self {
            kind: self.kind,
            message: format!("{operation}: {}", self.message),
        }
    }
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;

/// Attach operation context to a failed [`Result`].
pub trait ResultExt<T> {
    fn context(self, operation: &str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, operation: &str) -> Result<T> {
        self.map_err(|e| e.context(operation))
    }
}
