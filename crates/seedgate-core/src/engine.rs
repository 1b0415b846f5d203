//! Reconciliation engine: list, diff and converge one resource class.
//!
//! Each class (completion models, embedding models, accounts, ...) is an
//! independent [`RemoteCollection`]; the engine runs them one at a time with
//! no cross-class coordination.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::CollectionError;
use crate::plan::{PlanError, ReconciliationPlan};
use crate::resource::{DesiredResource, OwnershipRule, RemoteResource};

/// Backend operations for one resource class.
///
/// Implementations talk REST or SQL; the engine only sees named resources.
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    /// Class name used in log lines, e.g. `completion-models`.
    fn class(&self) -> &str;

    /// Fetches the current remote listing.
    async fn list(&self) -> Result<Vec<RemoteResource>, CollectionError>;

    /// Creates a resource and returns the backend assigned id.
    async fn create(&self, desired: &DesiredResource) -> Result<String, CollectionError>;

    /// Applies the desired attributes to an existing resource.
    async fn update(&self, id: &str, desired: &DesiredResource) -> Result<(), CollectionError>;

    /// Removes a resource. `Ok(false)` means the backend refused without a
    /// transport-level error, e.g. an unexpected status.
    async fn delete(&self, id: &str) -> Result<bool, CollectionError>;

    /// Activates a freshly created resource against its parent scope,
    /// optionally marking it as the scope default.
    async fn enable(
        &self,
        id: &str,
        desired: &DesiredResource,
        make_default: bool,
    ) -> Result<(), CollectionError>;
}

/// Which parts of the plan may be applied on this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyScope {
    /// Delete, create and update. Used on the first run of a deployment.
    Full,
    /// Update only; creates and deletes are skipped. Used once the
    /// first-run marker exists.
    UpdatesOnly,
}

/// Post-create activation settings for a class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnablePolicy {
    /// Resource name to mark as the scope default. No match, no default.
    pub default_name: Option<String>,
}

/// Per-class reconciliation settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassPolicy {
    /// Restricts deletion to foreign resources when present.
    pub ownership: Option<OwnershipRule>,
    /// Enables created resources when present.
    pub enable: Option<EnablePolicy>,
}

/// Aggregate outcome of one class reconciliation.
///
/// Per-item failures are counted here instead of aborting the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub enabled: usize,
    pub failed: usize,
}

impl ReconcileStats {
    /// Number of successful mutations.
    pub fn total_changes(&self) -> usize {
        self.created + self.updated + self.deleted
    }

    /// True when every attempted call succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Failures that abort a class before any item is applied.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Failed to list remote resources: {0}")]
    List(#[from] CollectionError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Converges one collection to the desired list.
///
/// Deletions run first, then creates and updates in desired order. Each
/// call is independent: a failing item is logged and counted, and the rest
/// of the batch still runs.
pub async fn reconcile(
    collection: &dyn RemoteCollection,
    desired: &[DesiredResource],
    policy: &ClassPolicy,
    scope: ApplyScope,
) -> Result<ReconcileStats, ReconcileError> {
    let class = collection.class().to_string();
    let remote = collection.list().await?;
    let plan = ReconciliationPlan::compute(desired, &remote, policy.ownership.as_ref())?;

    debug!(
        class = %class,
        creates = plan.to_create.len(),
        updates = plan.to_update.len(),
        deletes = plan.to_delete.len(),
        "Computed reconciliation plan"
    );

    let mut stats = ReconcileStats::default();
    if plan.is_empty() {
        info!(class = %class, "Collection already converged");
        return Ok(stats);
    }

    if scope == ApplyScope::Full {
        for resource in &plan.to_delete {
            apply_delete(collection, &class, resource, &mut stats).await;
        }
    } else if !plan.to_delete.is_empty() || !plan.to_create.is_empty() {
        info!(
            class = %class,
            creates = plan.to_create.len(),
            deletes = plan.to_delete.len(),
            "First run already completed, skipping create/delete actions"
        );
    }

    let create_names: std::collections::HashSet<&str> =
        plan.to_create.iter().map(|d| d.name.as_str()).collect();
    let update_ids: std::collections::HashMap<&str, &str> = plan
        .to_update
        .iter()
        .map(|u| (u.desired.name.as_str(), u.id.as_str()))
        .collect();

    for resource in desired {
        if create_names.contains(resource.name.as_str()) {
            if scope == ApplyScope::Full {
                apply_create(collection, &class, resource, policy, &mut stats).await;
            }
        } else if let Some(id) = update_ids.get(resource.name.as_str()) {
            apply_update(collection, &class, id, resource, &mut stats).await;
        }
    }

    info!(
        class = %class,
        created = stats.created,
        updated = stats.updated,
        deleted = stats.deleted,
        enabled = stats.enabled,
        failed = stats.failed,
        "Reconciliation finished"
    );
    Ok(stats)
}

async fn apply_delete(
    collection: &dyn RemoteCollection,
    class: &str,
    resource: &RemoteResource,
    stats: &mut ReconcileStats,
) {
    match collection.delete(&resource.id).await {
        Ok(true) => {
            stats.deleted += 1;
            info!(class = %class, name = %resource.name, id = %resource.id, "Deleted resource");
        }
        Ok(false) => {
            stats.failed += 1;
            warn!(
                class = %class,
                name = %resource.name,
                id = %resource.id,
                "Backend refused to delete resource"
            );
        }
        Err(err) => {
            stats.failed += 1;
            warn!(
                class = %class,
                name = %resource.name,
                id = %resource.id,
                error = %err,
                "Failed to delete resource"
            );
        }
    }
}

async fn apply_create(
    collection: &dyn RemoteCollection,
    class: &str,
    resource: &DesiredResource,
    policy: &ClassPolicy,
    stats: &mut ReconcileStats,
) {
    let id = match collection.create(resource).await {
        Ok(id) => {
            stats.created += 1;
            info!(class = %class, name = %resource.name, id = %id, "Created resource");
            id
        }
        Err(err) => {
            stats.failed += 1;
            warn!(class = %class, name = %resource.name, error = %err, "Failed to create resource");
            return;
        }
    };

    if let Some(enable) = &policy.enable {
        let make_default = enable.default_name.as_deref() == Some(resource.name.as_str());
        match collection.enable(&id, resource, make_default).await {
            Ok(()) => {
                stats.enabled += 1;
                info!(
                    class = %class,
                    name = %resource.name,
                    id = %id,
                    make_default,
                    "Enabled resource"
                );
            }
            Err(err) => {
                stats.failed += 1;
                warn!(
                    class = %class,
                    name = %resource.name,
                    id = %id,
                    error = %err,
                    "Failed to enable resource"
                );
            }
        }
    }
}

async fn apply_update(
    collection: &dyn RemoteCollection,
    class: &str,
    id: &str,
    resource: &DesiredResource,
    stats: &mut ReconcileStats,
) {
    match collection.update(id, resource).await {
        Ok(()) => {
            stats.updated += 1;
            info!(class = %class, name = %resource.name, id = %id, "Updated resource");
        }
        Err(err) => {
            stats.failed += 1;
            warn!(
                class = %class,
                name = %resource.name,
                id = %id,
                error = %err,
                "Failed to update resource"
            );
        }
    }
}
