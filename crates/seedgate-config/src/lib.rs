//! Configuration for seedgate: process settings (TOML file plus SEEDGATE__
//! environment overrides) and the JSON seed manifest.

pub mod error;
pub mod manifest;
pub mod settings;

pub use error::{ConfigError, ConfigResult};
pub use manifest::{ClassManifest, EnableManifest, SeedManifest, DEFAULT_MANIFEST};
pub use settings::loader::load_config;
pub use settings::{
    AppConfig, ApiConfig, AuthSettings, BackoffKind, CredentialConfig, DatabaseConfig,
    FederationConfig, GateConfig, IdentityConfig, IdleConfig, LoggingConfig, MarkerConfig,
    ModulesConfig, ScopeConfig, SeedsConfig, SetupActionConfig, StartupConfig,
};
