//! HTTP side of seedgate: the JSON API client, the readiness probe,
//! REST-backed resource collections and the startup action runner.

pub mod auth;
pub mod client;
pub mod collection;
pub mod error;
pub mod probe;
pub mod startup;

pub use auth::Auth;
pub use client::{fill_path, ApiClient};
pub use collection::RestCollection;
pub use error::{ClientError, ClientResult};
pub use probe::HttpProbe;
pub use startup::{StartupReport, StartupRunner};
