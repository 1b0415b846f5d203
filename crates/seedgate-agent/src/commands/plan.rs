//! Computes and prints the reconciliation plan without applying anything.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;

use seedgate_client::{ApiClient, RestCollection};
use seedgate_config::{AppConfig, SeedManifest};
use seedgate_core::{ReconciliationPlan, RemoteCollection};

use crate::output::print_success;

pub async fn execute(config: &AppConfig) -> Result<()> {
    let manifest = SeedManifest::load(config.seeds.manifest_path.as_deref().map(Path::new))
        .context("loading seed manifest")?;

    let mut client = ApiClient::new(&config.api).context("building API client")?;
    client.login().await.context("login failed")?;
    let client = Arc::new(client);

    let mut pending = 0;
    for class in &manifest.classes {
        let desired = class.desired_resources()?;
        let collection = RestCollection::from_manifest(client.clone(), class, None);
        let remote = collection
            .list()
            .await
            .with_context(|| format!("listing {}", class.name))?;
        let plan = ReconciliationPlan::compute(&desired, &remote, class.ownership.as_ref())?;

        if plan.is_empty() {
            println!("{}: nothing to change", class.name.cyan());
            continue;
        }

        println!("{}:", class.name.cyan());
        for resource in &plan.to_create {
            println!("  {} {}", "+".green(), resource.name);
        }
        for update in &plan.to_update {
            println!("  {} {} (id {})", "~".yellow(), update.desired.name, update.id);
        }
        for remote in &plan.to_delete {
            println!("  {} {} (id {})", "-".red(), remote.name, remote.id);
        }
        pending += plan.len();
    }

    if pending == 0 {
        print_success("Everything already converged");
    } else {
        println!("{pending} pending change(s)");
    }
    Ok(())
}
