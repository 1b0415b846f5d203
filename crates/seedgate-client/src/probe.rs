//! HTTP readiness probe.

use std::time::Duration;

use async_trait::async_trait;
use seedgate_core::{Probe, ProbeError};

use crate::error::ClientError;

/// Polls a health endpoint; only a 200 counts as ready.
///
/// Uses its own unauthenticated client so the per-attempt timeout can be
/// shorter than the reconciliation request timeout.
pub struct HttpProbe {
    http: reqwest::Client,
    url: String,
}

impl HttpProbe {
    pub fn new(base_url: &str, health_path: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::build(e.to_string()))?;
        let url = format!("{}{}", base_url.trim_end_matches('/'), health_path);
        Ok(Self { http, url })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    fn target(&self) -> String {
        self.url.clone()
    }

    async fn check(&self) -> Result<(), ProbeError> {
        match self.http.get(&self.url).send().await {
            Ok(resp) if resp.status() == reqwest::StatusCode::OK => Ok(()),
            Ok(resp) => Err(ProbeError::new(format!("HTTP {}", resp.status().as_u16()))),
            Err(err) => Err(ProbeError::new(err.to_string())),
        }
    }
}
