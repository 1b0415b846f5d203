//! Database readiness probe for the shared gate.

use std::time::Duration;

use async_trait::async_trait;
use sqlx_core::connection::Connection;
use sqlx_postgres::PgConnection;
use tracing::debug;

use seedgate_config::DatabaseConfig;
use seedgate_core::{Probe, ProbeError};

use crate::pool::mask_password;

/// Reports the database ready once a fresh connection can be opened.
///
/// Each check opens and closes its own connection; nothing is reused
/// between attempts.
pub struct PgProbe {
    url: String,
    timeout: Duration,
}

impl PgProbe {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            url: config.connection_url(),
            timeout: config.connect_timeout(),
        }
    }
}

#[async_trait]
impl Probe for PgProbe {
    fn target(&self) -> String {
        mask_password(&self.url)
    }

    async fn check(&self) -> Result<(), ProbeError> {
        match tokio::time::timeout(self.timeout, PgConnection::connect(&self.url)).await {
            Ok(Ok(conn)) => {
                if let Err(error) = conn.close().await {
                    debug!(%error, "Probe connection close failed");
                }
                Ok(())
            }
            Ok(Err(error)) => Err(ProbeError::new(error.to_string())),
            Err(_) => Err(ProbeError::new(format!(
                "connect timed out after {:?}",
                self.timeout
            ))),
        }
    }
}
