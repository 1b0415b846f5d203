use seedgate_core::CollectionError;
use thiserror::Error;

/// Errors produced while talking to the managed service over HTTP.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {message}")]
    Build { message: String },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Login failed: {message}")]
    Login { message: String },
}

impl ClientError {
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.into(),
            source,
        }
    }

    pub fn status(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn login(message: impl Into<String>) -> Self {
        Self::Login {
            message: message.into(),
        }
    }
}

impl From<ClientError> for CollectionError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status { status, body, .. } => CollectionError::status(status, body),
            ClientError::Decode { message, .. } => CollectionError::decode(message),
            other => CollectionError::transport(other.to_string()),
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
