//! PostgreSQL backend for seedgate: readiness probe and identity seeding.
//!
//! The crate covers the database half of a first-boot bootstrap. A
//! [`PgProbe`] plugs into the shared readiness gate so the agent can wait
//! for the server to accept connections, and [`seed_identity`] creates the
//! default tenant, user, Owner role and organization space that the target
//! application expects, all inside one transaction.
//!
//! Schema migrations are out of scope; seeding assumes the target tables
//! already exist and reports a dedicated error when they do not.
//!
//! The crate is organized into several modules:
//!
//! - [`error`]: Error types and PostgreSQL error-code helpers
//! - [`pool`]: Connection pool creation with masked URLs in logs
//! - [`probe`]: Readiness probe implementation
//! - [`seed`]: Check-then-insert identity seeding

pub mod error;
pub mod pool;
pub mod probe;
pub mod seed;

pub use error::{PostgresError, Result};
pub use pool::{create_pool, PgPoolOptions};
pub use probe::PgProbe;
pub use seed::{seed_identity, SeedOutcome};
