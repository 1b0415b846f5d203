//! Health gate without any follow-up work.

use anyhow::{Context, Result};
use tracing::info;

use seedgate_client::HttpProbe;
use seedgate_config::AppConfig;
use seedgate_core::ReadinessGate;

use crate::output::print_success;
use crate::signals;

pub async fn execute(config: &AppConfig) -> Result<()> {
    let probe = HttpProbe::new(
        &config.api.base_url,
        &config.gate.health_path,
        config.gate.request_timeout(),
    )
    .context("building health probe")?;

    let gate = ReadinessGate::new(config.gate.retry_policy());
    let shutdown = signals::wait_for_shutdown();
    tokio::pin!(shutdown);
    let attempts = tokio::select! {
        result = gate.wait(&probe) => result.context("API never became ready")?,
        _ = &mut shutdown => {
            info!("Shutdown requested while waiting for the API");
            return Ok(());
        }
    };

    print_success(&format!("API ready after {attempts} attempt(s)"));
    Ok(())
}
