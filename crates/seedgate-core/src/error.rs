//! Error types shared by remote collection backends.

use thiserror::Error;

/// Errors produced by a [`RemoteCollection`](crate::engine::RemoteCollection)
/// backend while talking to the managed service.
#[derive(Error, Debug)]
pub enum CollectionError {
    /// The backend could not be reached at all.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The backend answered with a status outside the accepted range.
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend answered, but the payload could not be decoded.
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// A response was missing a field the caller depends on.
    #[error("Missing field in response: {field}")]
    MissingField { field: String },

    /// The requested operation is not available on this backend.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },
}

impl CollectionError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }
}

/// Result type for collection operations.
pub type CollectionResult<T> = Result<T, CollectionError>;
