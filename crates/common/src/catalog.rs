//! Module catalog loading from YAML files
//!
//! Versions of the Flogo trigger and activity modules referenced by generated
//! applications are kept in a YAML catalog instead of being hardcoded in the
//! protocol bindings. A default catalog is embedded in the crate; callers may
//! load a replacement from disk.

use crate::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const EMBEDDED_CATALOG: &str = include_str!("../metadata/modules.yaml");

/// Catalog format version understood by this crate
pub const CATALOG_VERSION: u32 = 1;

/// Root structure of a module catalog YAML file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModuleCatalog {
    /// Catalog format version
    pub version: u32,
    /// Module versions keyed by protocol name (e.g. "mqtt")
    #[serde(default)]
    pub protocols: BTreeMap<String, ModuleVersions>,
}

/// Pinned versions for one protocol's modules
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModuleVersions {
    /// Trigger module version
    #[serde(default)]
    pub trigger: Option<String>,
    /// Activity module version
    #[serde(default)]
    pub activity: Option<String>,
}

impl ModuleCatalog {
    /// The catalog shipped with the crate
    pub fn embedded() -> Result<Self> {
        Self::from_yaml(EMBEDDED_CATALOG)
    }

    /// Load a catalog from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a catalog from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let catalog: ModuleCatalog = serde_yaml::from_str(content)?;

        if catalog.version != CATALOG_VERSION {
            return Err(GeneratorError::Config(format!(
                "Unsupported module catalog version {} (expected {})",
                catalog.version, CATALOG_VERSION
            )));
        }

        Ok(catalog)
    }

    /// Versions pinned for a protocol, if any
    pub fn versions(&self, protocol: &str) -> Option<&ModuleVersions> {
        self.protocols.get(protocol)
    }

    pub fn trigger_version(&self, protocol: &str) -> Option<&str> {
        self.versions(protocol).and_then(|v| v.trigger.as_deref())
    }

    pub fn activity_version(&self, protocol: &str) -> Option<&str> {
        self.versions(protocol).and_then(|v| v.activity.as_deref())
    }
}
