//! Flogo application descriptor
//!
//! The intermediate representation produced by the compiler and consumed by
//! the generator. Field names serialize to the layout the Flogo engine reads
//! from `flogo.json`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Loosely-typed settings block attached to triggers, handlers and services
pub type SettingsMap = serde_json::Map<String, Value>;

/// Application type tag written into every descriptor
pub const APP_TYPE: &str = "flogo:app";

/// Flogo application descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlogoApp {
    pub name: String,

    #[serde(rename = "type")]
    pub app_type: String,

    pub version: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "appModel")]
    pub app_model: String,

    #[serde(default)]
    pub imports: Vec<String>,

    #[serde(default)]
    pub properties: Vec<PropertyAttribute>,

    #[serde(default)]
    pub triggers: Vec<TriggerConfig>,

    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

impl FlogoApp {
    /// Create an empty application
    pub fn new(name: &str, description: &str, version: &str, app_model: &str) -> Self {
        Self {
            name: name.to_string(),
            app_type: APP_TYPE.to_string(),
            version: version.to_string(),
            description: description.to_string(),
            app_model: app_model.to_string(),
            imports: Vec::new(),
            properties: Vec::new(),
            triggers: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Look up a trigger by id
    pub fn trigger(&self, id: &str) -> Option<&TriggerConfig> {
        self.triggers.iter().find(|t| t.id == id)
    }

    /// Look up a resource by id
    pub fn resource(&self, id: &str) -> Option<&ResourceConfig> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Look up a property by name
    pub fn property(&self, name: &str) -> Option<&PropertyAttribute> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Resource ids referenced by handler actions that have no matching resource
    pub fn dangling_resource_refs(&self) -> Vec<String> {
        self.triggers
            .iter()
            .flat_map(|t| &t.handlers)
            .flat_map(|h| &h.actions)
            .filter_map(|a| a.settings.get("uri").and_then(Value::as_str))
            .filter(|uri| self.resource(uri).is_none())
            .map(String::from)
            .collect()
    }
}

/// Declared type of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "int")]
    Integer,
}

/// Named, typed, defaulted application property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAttribute {
    pub name: String,

    #[serde(rename = "type")]
    pub data_type: DataType,

    pub value: Value,
}

impl PropertyAttribute {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::String,
            value: Value::String(value.into()),
        }
    }

    pub fn integer(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::Integer,
            value: Value::from(value),
        }
    }
}

/// Inbound listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub id: String,

    #[serde(rename = "ref")]
    pub reference: String,

    #[serde(default)]
    pub settings: SettingsMap,

    #[serde(default)]
    pub handlers: Vec<HandlerConfig>,
}

/// Handler attached to a trigger
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HandlerConfig {
    #[serde(default)]
    pub settings: SettingsMap,

    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

/// Action invoked by a handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    #[serde(rename = "ref")]
    pub reference: String,

    #[serde(default)]
    pub settings: SettingsMap,

    #[serde(default, skip_serializing_if = "SettingsMap::is_empty")]
    pub input: SettingsMap,
}

/// Outbound invocation declared on a microgateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,

    #[serde(rename = "ref")]
    pub reference: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "SettingsMap::is_empty")]
    pub settings: SettingsMap,
}

/// One pipeline step invoking a service by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepConfig {
    pub service: String,

    #[serde(default)]
    pub input: SettingsMap,
}

/// Orchestration unit linking triggers to services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Microgateway {
    pub name: String,

    #[serde(default)]
    pub steps: Vec<StepConfig>,

    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

impl Microgateway {
    /// Step service names that are not declared on this gateway
    pub fn undeclared_step_services(&self) -> Vec<&str> {
        self.steps
            .iter()
            .map(|s| s.service.as_str())
            .filter(|name| !self.services.iter().any(|svc| svc.name == *name))
            .collect()
    }
}

/// Application resource wrapping a microgateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub id: String,
    pub data: Microgateway,
}

/// Placeholder methods the pipelines invoke at runtime
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SupportCode {
    pub methods: Vec<String>,
}

impl SupportCode {
    pub fn add_method(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.methods.contains(&name) {
            self.methods.push(name);
        }
    }
}

/// Result of compiling one document
#[derive(Debug, Clone)]
pub struct Compilation {
    pub app: FlogoApp,
    pub support: SupportCode,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_serialization() {
        let prop = PropertyAttribute::integer("kafka0Port", 9092);
        let value = serde_json::to_value(&prop).unwrap();
        assert_eq!(
            value,
            json!({"name": "kafka0Port", "type": "int", "value": 9092})
        );
    }

    #[test]
    fn test_action_without_input_omits_field() {
        let action = ActionConfig {
            reference: "github.com/project-flogo/microgateway".to_string(),
            settings: SettingsMap::new(),
            input: SettingsMap::new(),
        };
        let value = serde_json::to_value(&action).unwrap();
        assert!(value.get("input").is_none());
        assert_eq!(value["ref"], "github.com/project-flogo/microgateway");
    }

    #[test]
    fn test_undeclared_step_services() {
        let gateway = Microgateway {
            name: "http".to_string(),
            steps: vec![StepConfig {
                service: "log".to_string(),
                input: SettingsMap::new(),
            }],
            services: vec![],
        };
        assert_eq!(gateway.undeclared_step_services(), vec!["log"]);
    }

    #[test]
    fn test_support_methods_are_unique() {
        let mut support = SupportCode::default();
        support.add_method("httpMethod");
        support.add_method("httpMethod");
        assert_eq!(support.methods, vec!["httpMethod"]);
    }
}
