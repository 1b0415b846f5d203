//! Always-run startup actions.
//!
//! These run on every start, before reconciliation and outside the
//! first-run gate: resolving the tenant scope, enabling feature modules,
//! pushing federation settings and provider credentials, and the one-shot
//! setup action. Each action is independent; failures are logged and
//! counted, never fatal.

use seedgate_config::{CredentialConfig, FederationConfig, SetupActionConfig, StartupConfig};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::client::{fill_path, ApiClient};
use crate::collection::items_of;

/// Outcome of the startup action pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupReport {
    /// Resolved tenant scope, if any
    pub tenant_id: Option<String>,
    pub modules_enabled: usize,
    pub federation_applied: bool,
    pub credentials_applied: usize,
    pub setup_performed: bool,
    pub failed: usize,
}

pub struct StartupRunner<'a> {
    client: &'a ApiClient,
    config: &'a StartupConfig,
}

impl<'a> StartupRunner<'a> {
    pub fn new(client: &'a ApiClient, config: &'a StartupConfig) -> Self {
        Self { client, config }
    }

    /// Runs every configured startup action.
    ///
    /// `want_scope` forces tenant resolution even when no scoped startup
    /// action is configured; the caller sets it when seed manifest classes
    /// carry enable steps that need the tenant id.
    pub async fn run(&self, want_scope: bool) -> StartupReport {
        let mut report = StartupReport::default();

        if let Some(ref setup) = self.config.setup {
            self.run_setup(setup, &mut report).await;
        }

        let needs_scope = !self.config.modules.names.is_empty()
            || self.config.federation.is_some()
            || !self.config.credentials.is_empty();

        if needs_scope || want_scope {
            report.tenant_id = self.resolve_scope(&mut report).await;
        }

        let Some(tenant_id) = report.tenant_id.clone() else {
            if needs_scope {
                warn!("No tenant scope resolved, skipping scope-bound startup actions");
            }
            return report;
        };

        if !self.config.modules.names.is_empty() {
            self.enable_modules(&tenant_id, &mut report).await;
        }
        if let Some(ref federation) = self.config.federation {
            self.apply_federation(federation, &tenant_id, &mut report)
                .await;
        }
        for credential in &self.config.credentials {
            self.apply_credential(credential, &tenant_id, &mut report)
                .await;
        }

        report
    }

    async fn resolve_scope(&self, report: &mut StartupReport) -> Option<String> {
        let listing = match self.client.get(&self.config.scope.tenants_path).await {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "Failed to list tenants");
                report.failed += 1;
                return None;
            }
        };
        let items = match items_of(listing) {
            Ok(items) => items,
            Err(err) => {
                warn!(error = %err, "Failed to decode tenant listing");
                report.failed += 1;
                return None;
            }
        };

        let tenant = match self.config.scope.tenant_name {
            Some(ref wanted) => items
                .iter()
                .find(|item| item.get("name").and_then(Value::as_str) == Some(wanted)),
            None => items.first(),
        };
        match tenant.and_then(id_of) {
            Some(id) => {
                info!(tenant_id = %id, "Resolved tenant scope");
                Some(id)
            }
            None => {
                warn!(
                    wanted = self.config.scope.tenant_name.as_deref().unwrap_or("<first>"),
                    "No usable tenant in listing"
                );
                report.failed += 1;
                None
            }
        }
    }

    async fn enable_modules(&self, tenant_id: &str, report: &mut StartupReport) {
        let listing = match self.client.get_elevated(&self.config.modules.list_path).await {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "Failed to list modules");
                report.failed += 1;
                return;
            }
        };
        let items = match items_of(listing) {
            Ok(items) => items,
            Err(err) => {
                warn!(error = %err, "Failed to decode module listing");
                report.failed += 1;
                return;
            }
        };

        // Batch payload: one entry per module found by display name.
        let mut payload = Vec::new();
        for name in &self.config.modules.names {
            let found = items
                .iter()
                .find(|item| item.get("name").and_then(Value::as_str) == Some(name.as_str()));
            match found.and_then(|item| item.get("id")).cloned() {
                Some(id) => payload.push(json!({"id": id})),
                None => {
                    warn!(module = %name, "Module not found in listing");
                    report.failed += 1;
                }
            }
        }
        if payload.is_empty() {
            return;
        }

        let enabled = payload.len();
        let path = fill_path(&self.config.modules.enable_path, &[("tenant_id", tenant_id)]);
        match self.client.post_elevated(&path, &Value::Array(payload)).await {
            Ok(_) => {
                report.modules_enabled += enabled;
                info!(tenant_id = %tenant_id, modules = enabled, "Enabled feature modules");
            }
            Err(err) => {
                warn!(error = %err, "Failed to enable modules");
                report.failed += 1;
            }
        }
    }

    async fn apply_federation(
        &self,
        federation: &FederationConfig,
        tenant_id: &str,
        report: &mut StartupReport,
    ) {
        let path = fill_path(&federation.path, &[("tenant_id", tenant_id)]);
        let body = json!({
            "provider": federation.provider,
            "client_id": federation.client_id,
            "client_secret": federation.client_secret,
            "discovery_endpoint": federation.discovery_endpoint,
            "redirect_path": federation.redirect_path,
        });
        match self.client.put(&path, &body).await {
            Ok(_) => {
                report.federation_applied = true;
                info!(provider = %federation.provider, "Applied federation settings");
            }
            Err(err) => {
                warn!(
                    provider = %federation.provider,
                    error = %err,
                    "Failed to apply federation settings"
                );
                report.failed += 1;
            }
        }
    }

    async fn apply_credential(
        &self,
        credential: &CredentialConfig,
        tenant_id: &str,
        report: &mut StartupReport,
    ) {
        let path = fill_path(
            &credential.path,
            &[("tenant_id", tenant_id), ("provider", &credential.provider)],
        );
        let body = json!({"api_key": credential.api_key});
        match self.client.put(&path, &body).await {
            Ok(_) => {
                report.credentials_applied += 1;
                info!(provider = %credential.provider, "Applied provider credentials");
            }
            Err(err) => {
                warn!(
                    provider = %credential.provider,
                    error = %err,
                    "Failed to apply provider credentials"
                );
                report.failed += 1;
            }
        }
    }

    /// Probes the settings endpoint and posts the setup payload once while
    /// the remote "setup needed" flag is true.
    async fn run_setup(&self, setup: &SetupActionConfig, report: &mut StartupReport) {
        let settings = match self.client.get(&setup.settings_path).await {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "Failed to fetch settings for setup action");
                report.failed += 1;
                return;
            }
        };
        match settings.pointer(&setup.flag_pointer).and_then(Value::as_bool) {
            Some(true) => match self.client.post(&setup.setup_path, &setup.payload).await {
                Ok(_) => {
                    report.setup_performed = true;
                    info!("Setup action completed");
                }
                Err(err) => {
                    warn!(error = %err, "Setup action failed");
                    report.failed += 1;
                }
            },
            Some(false) => {
                info!("Setup already completed, skipping");
            }
            None => {
                warn!(pointer = %setup.flag_pointer, "Setup flag not found in settings");
                report.failed += 1;
            }
        }
    }
}

/// Extracts a resource id as a string, accepting strings and numbers.
fn id_of(item: &Value) -> Option<String> {
    match item.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    }
}
