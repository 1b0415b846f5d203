//! Plan computation: diffing desired state against a remote listing.
//!
//! The plan is derived fresh on every run and never stored. Matching is by
//! case-sensitive resource name; a name ends up in at most one of the three
//! action sets.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::resource::{DesiredResource, OwnershipRule, RemoteResource};

/// Errors raised while computing a plan.
///
/// Duplicate names make the diff ambiguous, so they are rejected outright
/// instead of silently picking one of the entries.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Duplicate name '{name}' in desired state")]
    DuplicateDesired { name: String },

    #[error("Duplicate name '{name}' in remote listing")]
    DuplicateRemote { name: String },
}

/// An update action: the desired attributes plus the remote id to apply
/// them against.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedUpdate {
    pub id: String,
    pub desired: DesiredResource,
}

/// The minimal set of calls that converges a remote collection to the
/// desired list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationPlan {
    /// Desired resources with no remote counterpart, in desired order.
    pub to_create: Vec<DesiredResource>,
    /// Name matches whose remote attributes have drifted, in desired order.
    pub to_update: Vec<PlannedUpdate>,
    /// Unmatched remote resources eligible for deletion, in remote order.
    pub to_delete: Vec<RemoteResource>,
}

impl ReconciliationPlan {
    /// Diffs `desired` against `remote`.
    ///
    /// A name match whose remote attributes already satisfy the desired ones
    /// is dropped from the plan, so a converged system yields an empty plan.
    ///
    /// When `ownership` is given, deletion is restricted to foreign remote
    /// resources: unmatched resources carrying the reconciler's own tag are
    /// preserved. A foreign resource whose name matches desired state is
    /// adopted through an update, never deleted.
    pub fn compute(
        desired: &[DesiredResource],
        remote: &[RemoteResource],
        ownership: Option<&OwnershipRule>,
    ) -> Result<Self, PlanError> {
        let mut desired_names = HashSet::with_capacity(desired.len());
        for resource in desired {
            if !desired_names.insert(resource.name.as_str()) {
                return Err(PlanError::DuplicateDesired {
                    name: resource.name.clone(),
                });
            }
        }

        let mut remote_by_name: HashMap<&str, &RemoteResource> =
            HashMap::with_capacity(remote.len());
        for resource in remote {
            if remote_by_name
                .insert(resource.name.as_str(), resource)
                .is_some()
            {
                return Err(PlanError::DuplicateRemote {
                    name: resource.name.clone(),
                });
            }
        }

        let mut plan = Self::default();

        for resource in desired {
            match remote_by_name.get(resource.name.as_str()) {
                Some(existing) => {
                    if !resource.is_satisfied_by(existing) {
                        plan.to_update.push(PlannedUpdate {
                            id: existing.id.clone(),
                            desired: resource.clone(),
                        });
                    }
                }
                None => plan.to_create.push(resource.clone()),
            }
        }

        for resource in remote {
            if desired_names.contains(resource.name.as_str()) {
                continue;
            }
            let deletable = match ownership {
                Some(rule) => !rule.owns(resource),
                None => true,
            };
            if deletable {
                plan.to_delete.push(resource.clone());
            }
        }

        Ok(plan)
    }

    /// True when no action is required.
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// Total number of planned actions.
    pub fn len(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }
}
