//! The full bootstrap pass: gate, startup actions, reconcile, marker, idle.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use seedgate_client::{ApiClient, HttpProbe, RestCollection, StartupRunner};
use seedgate_config::{AppConfig, ClassManifest, SeedManifest};
use seedgate_core::{
    reconcile, ApplyScope, ClassPolicy, DesiredResource, FirstRunMarker, ReadinessGate,
};

use crate::output::print_success;
use crate::signals;

pub async fn execute(config: &AppConfig, oneshot: bool) -> Result<()> {
    // Validate the manifest before waiting on anything.
    let manifest = SeedManifest::load(config.seeds.manifest_path.as_deref().map(Path::new))
        .context("loading seed manifest")?;
    let mut classes: Vec<(&ClassManifest, Vec<DesiredResource>, ClassPolicy)> = Vec::new();
    for class in &manifest.classes {
        let desired = class
            .desired_resources()
            .with_context(|| format!("invalid resources for class {}", class.name))?;
        classes.push((class, desired, class.class_policy()));
    }

    // One shutdown future covers the whole pass; the gate can wait forever
    // under an unbounded policy, so it must stay interruptible too.
    let shutdown = signals::wait_for_shutdown();
    tokio::pin!(shutdown);

    let probe = HttpProbe::new(
        &config.api.base_url,
        &config.gate.health_path,
        config.gate.request_timeout(),
    )
    .context("building health probe")?;
    let gate = ReadinessGate::new(config.gate.retry_policy());
    let attempts = tokio::select! {
        result = gate.wait(&probe) => result.context("API never became ready")?,
        _ = &mut shutdown => {
            info!("Shutdown requested while waiting for the API");
            return Ok(());
        }
    };
    info!(attempts, "API is ready");

    let marker = FirstRunMarker::new(&config.marker.path);
    let scope = if !config.marker.enabled || marker.is_first_run() {
        ApplyScope::Full
    } else {
        info!(
            path = %marker.path().display(),
            "First-run marker present; creates and deletes are skipped"
        );
        ApplyScope::UpdatesOnly
    };

    let mut client = ApiClient::new(&config.api).context("building API client")?;
    client.login().await.context("login failed")?;
    let client = Arc::new(client);

    // Startup actions run on every boot; they are idempotent on the remote side.
    let want_scope = classes.iter().any(|(class, _, _)| class.enable.is_some());
    let report = StartupRunner::new(&client, &config.startup)
        .run(want_scope)
        .await;
    let mut failed = report.failed;

    let mut changes = 0;
    let mut aborted = 0;
    for (class, desired, policy) in &classes {
        let collection =
            RestCollection::from_manifest(client.clone(), class, report.tenant_id.as_deref());
        match reconcile(&collection, desired, policy, scope).await {
            Ok(stats) => {
                changes += stats.total_changes();
                failed += stats.failed;
            }
            Err(err) => {
                error!(class = class.name.as_str(), error = %err, "Reconciliation aborted for this class");
                aborted += 1;
            }
        }
    }

    // The marker records a completed full pass. A class that could not even
    // be listed leaves it unwritten, and the next start retries from scratch.
    if config.marker.enabled && scope == ApplyScope::Full && aborted == 0 {
        marker.complete().context("writing first-run marker")?;
    }

    if failed == 0 && aborted == 0 {
        print_success(&format!("Bootstrap complete: {changes} change(s) applied"));
    } else {
        info!(changes, failed, aborted, "Bootstrap finished with failures");
    }

    if oneshot || !config.idle.enabled {
        return Ok(());
    }

    info!(
        interval_secs = config.idle.interval_secs,
        "Entering idle loop"
    );
    loop {
        tokio::select! {
            _ = tokio::time::sleep(config.idle.interval()) => {
                debug!("Idle heartbeat");
            }
            _ = &mut shutdown => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}
