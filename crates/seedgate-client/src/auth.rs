//! Credential handling for the managed service.

use seedgate_config::AuthSettings;
use serde::Deserialize;

/// What the client attaches to every request.
#[derive(Debug, Clone)]
pub enum Auth {
    None,
    /// Static key sent in a configurable header
    ApiKey { key: String },
    /// Token obtained from the login endpoint
    Bearer { token: String },
}

impl Auth {
    /// Resolves the startup credential. Bearer tokens are only available
    /// after [`ApiClient::login`](crate::client::ApiClient::login) runs.
    pub fn from_settings(settings: &AuthSettings) -> Self {
        match settings.api_key {
            Some(ref key) => Self::ApiKey { key: key.clone() },
            None => Self::None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

pub(crate) fn form_encode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
