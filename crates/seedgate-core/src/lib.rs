//! Core building blocks for seedgate: a readiness gate, a declarative
//! reconciliation engine and the first-run marker that ties them together.
//!
//! Everything here is backend-agnostic. HTTP and SQL backends implement the
//! [`Probe`] and [`RemoteCollection`] traits in their own crates.

pub mod engine;
pub mod error;
pub mod gate;
pub mod marker;
pub mod plan;
pub mod resource;
pub mod retry;

pub use engine::{
    reconcile, ApplyScope, ClassPolicy, EnablePolicy, ReconcileError, ReconcileStats,
    RemoteCollection,
};
pub use error::{CollectionError, CollectionResult};
pub use gate::{GateError, Probe, ProbeError, ReadinessGate};
pub use marker::FirstRunMarker;
pub use plan::{PlanError, PlannedUpdate, ReconciliationPlan};
pub use resource::{Attributes, DesiredResource, OwnershipRule, RemoteResource, ResourceError};
pub use retry::{Backoff, RetryPolicy};
