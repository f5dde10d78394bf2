//! Transaction sender error types

use thiserror::Error;

/// Send failure with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SendError {
    pub kind: SendErrorKind,
    pub message: String,
}

impl SendError {
    pub fn new(kind: SendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(SendErrorKind::Network, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(SendErrorKind::Decode, message)
    }
}

/// Error classification, used for logging only: every failure is terminal
/// for its transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendErrorKind {
    /// Connection refused, timeout, or the body could not be read
    Network,
    /// 5xx from the backend
    ServerError,
    /// Any other non-2xx status
    Rejected,
    /// 2xx with a body that is not JSON
    Decode,
}

impl SendErrorKind {
    pub fn from_status(status: u16) -> Self {
        if (500..600).contains(&status) {
            Self::ServerError
        } else {
            Self::Rejected
        }
    }
}
