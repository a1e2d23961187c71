//! Client-side error types.
//!
//! This module provides [`ClientError`], the error type for every request made
//! through a [`Client`](crate::Client).

use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use restwire_core::EncodeError;

/// Errors returned while building, dispatching or reading a request.
///
/// Transport failures and cancellation pass through every interceptor
/// unchanged; recovering from them is the caller's job.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error (connection failed, TLS failure, broken body, etc.).
    #[error("transport error: {0}")]
    Transport(String),

    /// The request body could not be encoded as form or multipart data.
    #[error("body encoding error: {0}")]
    Body(#[from] EncodeError),

    /// JSON serialization of a request body failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// A response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The request could not be assembled (bad URL, header, etc.).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The server answered with a non-success status.
    #[error("unexpected status {status}")]
    Status { status: StatusCode, body: Bytes },

    /// The request did not complete within its timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The request was cancelled before a response arrived.
    #[error("request cancelled")]
    Cancelled,
}

impl ClientError {
    /// Create an invalid request error.
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        ClientError::InvalidRequest(message.into())
    }

    /// Create a transport error.
    pub fn transport<S: Into<String>>(message: S) -> Self {
        ClientError::Transport(message.into())
    }

    /// The response status, for [`ClientError::Status`].
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout(_))
    }

    /// Whether the request was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}
