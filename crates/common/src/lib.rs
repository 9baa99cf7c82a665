//! Common types and utilities for the AsyncAPI to Flogo generator
//!
//! This crate contains the Flogo application descriptor that the compiler
//! produces, the template parser shared by every protocol binding, the
//! property and import registries, and the module catalog configuration.

pub mod app;
pub mod catalog;
pub mod registry;
pub mod template;

pub use app::{
    ActionConfig, Compilation, DataType, FlogoApp, HandlerConfig, Microgateway, PropertyAttribute,
    ResourceConfig, ServiceConfig, SettingsMap, StepConfig, SupportCode, TriggerConfig,
};
pub use catalog::{ModuleCatalog, ModuleVersions};
pub use registry::{ImportRegistry, PropertyRegistry};
pub use template::{extract_port_template, parse_template, ParsedTemplate, Segment};

use thiserror::Error;

/// Errors that can occur while compiling or generating an application
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid extension {key} on {owner}: {reason}")]
    Extension {
        owner: String,
        key: String,
        reason: String,
    },

    #[error("Invalid port '{port}' in server url {url}")]
    InvalidPort { url: String, port: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_error_message() {
        let err = GeneratorError::Extension {
            owner: "server broker".to_string(),
            key: "x-keep-alive".to_string(),
            reason: "expected a number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid extension x-keep-alive on server broker: expected a number"
        );
    }
}
