//! Deduplicating registries for application properties and imports
//!
//! Every protocol pass writes into the same registries. Registration is
//! first-wins: a later entry with an already-known key is dropped.

use crate::app::PropertyAttribute;
use tracing::{debug, warn};

/// Application properties, unique by name
#[derive(Debug, Default, Clone)]
pub struct PropertyRegistry {
    properties: Vec<PropertyAttribute>,
    conflicts: Vec<String>,
}

impl PropertyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a property, returning `true` if it was added
    ///
    /// A duplicate name with an identical value is ignored silently; a
    /// duplicate with a different value keeps the first value and is
    /// recorded as a conflict.
    pub fn register(&mut self, attribute: PropertyAttribute) -> bool {
        if let Some(existing) = self.properties.iter().find(|p| p.name == attribute.name) {
            if existing.value != attribute.value || existing.data_type != attribute.data_type {
                let message = format!(
                    "property {} already declared with value {}, ignoring {}",
                    attribute.name, existing.value, attribute.value
                );
                warn!("{}", message);
                self.conflicts.push(message);
            } else {
                debug!(name = %attribute.name, "duplicate property ignored");
            }
            return false;
        }
        self.properties.push(attribute);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&PropertyAttribute> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Conflicting registrations seen so far
    pub fn conflicts(&self) -> &[String] {
        &self.conflicts
    }

    pub fn into_properties(self) -> Vec<PropertyAttribute> {
        self.properties
    }
}

/// Module imports, unique by module path
///
/// Imports are written as `module@version` or `module@version:/subpath`.
/// The key ignores the version, so a module can only be pinned once.
#[derive(Debug, Default, Clone)]
pub struct ImportRegistry {
    entries: Vec<(String, String)>,
}

impl ImportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an import, returning `true` if it was added
    pub fn register(&mut self, import: impl Into<String>) -> bool {
        let import = import.into();
        let key = Self::key(&import);
        if let Some((_, existing)) = self.entries.iter().find(|(k, _)| *k == key) {
            if *existing != import {
                debug!(%existing, ignored = %import, "import already registered");
            }
            return false;
        }
        self.entries.push((key, import));
        true
    }

    /// Import key: the module reference with the version removed
    ///
    /// # Examples
    /// ```
    /// use asyncapi_flogo_common::ImportRegistry;
    ///
    /// assert_eq!(
    ///     ImportRegistry::key("github.com/project-flogo/eftl@v1.0.0:/trigger"),
    ///     "github.com/project-flogo/eftl/trigger"
    /// );
    /// assert_eq!(
    ///     ImportRegistry::key("github.com/project-flogo/contrib/trigger/rest@v0.9.0"),
    ///     "github.com/project-flogo/contrib/trigger/rest"
    /// );
    /// ```
    pub fn key(import: &str) -> String {
        match import.split_once('@') {
            Some((module, rest)) => match rest.split_once(":/") {
                Some((_, sub)) => format!("{}/{}", module.trim_end_matches('/'), sub),
                None => module.to_string(),
            },
            None => import.to_string(),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, import)| import.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_imports(self) -> Vec<String> {
        self.entries.into_iter().map(|(_, import)| import).collect()
    }
}
