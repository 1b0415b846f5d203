//! Seed manifest: the declarative desired state driving reconciliation.
//!
//! A manifest declares independent resource classes, each with its REST
//! paths, an optional ownership rule, an optional enable step and the
//! desired resources themselves. Manifests are validated once at load time
//! so the engine never has to second-guess their shape.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use seedgate_core::{Attributes, ClassPolicy, DesiredResource, EnablePolicy, OwnershipRule};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// Manifest compiled into the binary, used when no file is configured.
pub const DEFAULT_MANIFEST: &str = include_str!("../seeds/default-manifest.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedManifest {
    #[serde(default)]
    pub classes: Vec<ClassManifest>,
}

/// One resource class: where it lives and what it should contain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassManifest {
    /// Class name used in log lines, e.g. `completion-models`
    pub name: String,
    /// Listing endpoint; also the create endpoint unless `create_path` is set
    pub list_path: String,
    #[serde(default)]
    pub create_path: Option<String>,
    /// Template with an `{id}` placeholder, used for update and delete
    #[serde(default)]
    pub item_path: Option<String>,
    #[serde(default)]
    pub ownership: Option<OwnershipRule>,
    #[serde(default)]
    pub enable: Option<EnableManifest>,
    #[serde(default)]
    pub resources: Vec<Attributes>,
}

/// Post-create enable step for a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnableManifest {
    /// Template with `{tenant_id}` and `{id}` placeholders
    pub path: String,
    /// Resource name marked as the scope default; unset sets no default
    #[serde(default)]
    pub default_name: Option<String>,
}

impl SeedManifest {
    /// Parses and validates a manifest from JSON text.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let manifest: Self = serde_json::from_str(raw)
            .map_err(|e| ConfigError::manifest(format!("invalid JSON: {e}")))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parses the embedded default manifest.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_json(DEFAULT_MANIFEST)
    }

    /// Loads the manifest from `path`, falling back to the embedded default
    /// when no path is configured.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .map_err(|e| ConfigError::io(path.display().to_string(), e))?;
                let manifest = Self::from_json(&raw)?;
                info!(
                    path = %path.display(),
                    classes = manifest.classes.len(),
                    "Loaded seed manifest"
                );
                Ok(manifest)
            }
            None => {
                let manifest = Self::embedded()?;
                info!(classes = manifest.classes.len(), "Using embedded seed manifest");
                Ok(manifest)
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut class_names = HashSet::new();
        for class in &self.classes {
            if class.name.is_empty() {
                return Err(ConfigError::manifest("class name must not be empty"));
            }
            if !class_names.insert(class.name.as_str()) {
                return Err(ConfigError::manifest(format!(
                    "duplicate class '{}'",
                    class.name
                )));
            }
            class.validate()?;
        }
        Ok(())
    }
}

impl ClassManifest {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.list_path.is_empty() {
            return Err(ConfigError::manifest(format!(
                "class '{}' has no list_path",
                self.name
            )));
        }
        if self.ownership.is_some() && self.item_path.is_none() {
            return Err(ConfigError::manifest(format!(
                "class '{}' has an ownership rule but no item_path for deletes",
                self.name
            )));
        }
        if let Some(ref item_path) = self.item_path {
            if !item_path.contains("{id}") {
                return Err(ConfigError::manifest(format!(
                    "class '{}' item_path must contain an {{id}} placeholder",
                    self.name
                )));
            }
        }
        if let Some(ref enable) = self.enable {
            if !enable.path.contains("{id}") {
                return Err(ConfigError::manifest(format!(
                    "class '{}' enable path must contain an {{id}} placeholder",
                    self.name
                )));
            }
        }
        // Resources are checked here once so reconciliation can trust them.
        self.desired_resources()?;
        Ok(())
    }

    /// Converts the raw resource entries into typed desired resources,
    /// rejecting entries without a name and duplicate names.
    pub fn desired_resources(&self) -> Result<Vec<DesiredResource>, ConfigError> {
        let mut seen = HashSet::new();
        let mut resources = Vec::with_capacity(self.resources.len());
        for entry in &self.resources {
            let resource = DesiredResource::from_attributes(entry.clone()).map_err(|e| {
                ConfigError::manifest(format!("class '{}': {e}", self.name))
            })?;
            if !seen.insert(resource.name.clone()) {
                return Err(ConfigError::manifest(format!(
                    "class '{}' declares '{}' twice",
                    self.name, resource.name
                )));
            }
            resources.push(resource);
        }
        Ok(resources)
    }

    /// Reconciliation settings derived from the manifest entry.
    pub fn class_policy(&self) -> ClassPolicy {
        ClassPolicy {
            ownership: self.ownership.clone(),
            enable: self.enable.as_ref().map(|enable| EnablePolicy {
                default_name: enable.default_name.clone(),
            }),
        }
    }
}
