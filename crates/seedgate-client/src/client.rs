//! Thin JSON client for the managed service's REST API.

use reqwest::RequestBuilder;
use seedgate_config::ApiConfig;
use serde_json::Value;
use tracing::{debug, info};

use crate::auth::{form_encode, Auth, TokenResponse};
use crate::error::ClientError;

/// Substitutes `{name}` placeholders in a path template.
pub fn fill_path(template: &str, vars: &[(&str, &str)]) -> String {
    let mut path = template.to_string();
    for (name, value) in vars {
        path = path.replace(&format!("{{{name}}}"), value);
    }
    path
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    header_name: String,
    auth: Auth,
    elevated_key: Option<String>,
    login_path: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::build(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            header_name: config.auth.api_key_header.clone(),
            auth: Auth::from_settings(&config.auth),
            elevated_key: config.auth.elevated_api_key.clone(),
            login_path: config.auth.login_path.clone(),
            username: config.auth.username.clone(),
            password: config.auth.password.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn attach(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::ApiKey { key } => req.header(&self.header_name, key),
            Auth::Bearer { token } => req.bearer_auth(token),
            Auth::None => req,
        }
    }

    /// Attaches the elevated key when configured, falling back to the
    /// standard credential.
    fn attach_elevated(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.elevated_key {
            Some(key) => req.header(&self.header_name, key),
            None => self.attach(req),
        }
    }

    /// Exchanges the configured username/password for a bearer token.
    ///
    /// A no-op when password auth is not configured or an API key already
    /// covers authentication.
    pub async fn login(&mut self) -> Result<(), ClientError> {
        if matches!(self.auth, Auth::ApiKey { .. }) {
            return Ok(());
        }
        let (Some(login_path), Some(username), Some(password)) =
            (&self.login_path, &self.username, &self.password)
        else {
            return Ok(());
        };

        let url = self.url(login_path);
        let resp = self
            .http
            .post(&url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(format!(
                "username={}&password={}",
                form_encode(username),
                form_encode(password),
            ))
            .send()
            .await
            .map_err(|e| ClientError::request(&url, e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::login(format!("HTTP {status}: {body}")));
        }
        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ClientError::login(format!("invalid token response: {e}")))?;
        self.auth = Auth::Bearer {
            token: token.access_token,
        };
        info!(username = %username, "Logged in, using bearer token");
        Ok(())
    }

    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        let url = self.url(path);
        let resp = self
            .attach(self.http.get(&url))
            .send()
            .await
            .map_err(|e| ClientError::request(&url, e))?;
        handle_json(&url, resp).await
    }

    pub async fn get_elevated(&self, path: &str) -> Result<Value, ClientError> {
        let url = self.url(path);
        let resp = self
            .attach_elevated(self.http.get(&url))
            .send()
            .await
            .map_err(|e| ClientError::request(&url, e))?;
        handle_json(&url, resp).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
        let url = self.url(path);
        let resp = self
            .attach(self.http.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::request(&url, e))?;
        handle_json(&url, resp).await
    }

    pub async fn post_elevated(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
        let url = self.url(path);
        let resp = self
            .attach_elevated(self.http.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::request(&url, e))?;
        handle_json(&url, resp).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
        let url = self.url(path);
        let resp = self
            .attach(self.http.put(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::request(&url, e))?;
        handle_json(&url, resp).await
    }

    /// Issues a DELETE and reports the status without treating non-success
    /// as an error; callers decide what a refusal means.
    pub async fn delete(&self, path: &str) -> Result<(u16, String), ClientError> {
        let url = self.url(path);
        let resp = self
            .attach(self.http.delete(&url))
            .send()
            .await
            .map_err(|e| ClientError::request(&url, e))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        debug!(url = %url, status, "DELETE completed");
        Ok((status, body))
    }
}

async fn handle_json(url: &str, resp: reqwest::Response) -> Result<Value, ClientError> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(ClientError::status(status.as_u16(), url, body));
    }
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| ClientError::decode(url, e.to_string()))
}
