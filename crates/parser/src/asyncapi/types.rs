//! AsyncAPI type definitions
//!
//! Simplified representation covering what the binding compiler reads:
//! servers, channels with their operations, and security scheme types.
//! Both the 2.0 release-candidate layout (servers and parameters as lists,
//! `protocolInfo`, `baseChannel`) and the 2.x layout (maps, `bindings`) are
//! accepted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Free-form `x-*` extension values keyed by extension name
pub type Extensions = BTreeMap<String, Value>;

/// AsyncAPI document root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsyncApiDocument {
    /// AsyncAPI version (e.g., "2.0.0")
    #[serde(default)]
    pub asyncapi: String,

    /// Application identifier
    #[serde(default)]
    pub id: Option<String>,

    /// API metadata
    #[serde(default)]
    pub info: Info,

    /// Connection endpoints
    #[serde(default)]
    pub servers: Servers,

    /// Topics and routes, keyed by channel name
    #[serde(default)]
    pub channels: BTreeMap<String, Channel>,

    /// Reusable components
    #[serde(default)]
    pub components: Option<Components>,
}

/// API information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Servers in either list or map form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Servers {
    List(Vec<Server>),
    Map(BTreeMap<String, Server>),
}

impl Default for Servers {
    fn default() -> Self {
        Servers::List(Vec::new())
    }
}

impl Servers {
    /// Servers with their display names, in compilation order
    ///
    /// List entries are named by their `name` field or their position; map
    /// entries iterate in key order.
    pub fn entries(&self) -> Vec<(String, &Server)> {
        match self {
            Servers::List(list) => list
                .iter()
                .enumerate()
                .map(|(i, server)| {
                    let name = server.name.clone().unwrap_or_else(|| i.to_string());
                    (name, server)
                })
                .collect(),
            Servers::Map(map) => map.iter().map(|(name, s)| (name.clone(), s)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Servers::List(list) => list.len(),
            Servers::Map(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Server (connection endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    /// Name, only present in the list layout
    #[serde(default)]
    pub name: Option<String>,

    /// Templated URL, e.g. `mqtt://{host}:{port}`
    pub url: String,

    /// Protocol identifier, plain or secure variant (e.g. "mqtt", "secure-mqtt")
    pub protocol: String,

    #[serde(rename = "protocolVersion")]
    #[serde(default)]
    pub protocol_version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// URL template variables
    #[serde(default)]
    pub variables: BTreeMap<String, ServerVariable>,

    /// Security requirements: scheme name to scopes
    #[serde(default)]
    pub security: Vec<BTreeMap<String, Vec<String>>>,

    /// Prefix applied to relative channel names
    #[serde(rename = "baseChannel")]
    #[serde(default)]
    pub base_channel: Option<String>,

    /// Everything else, including `x-*` extensions
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Server URL variable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerVariable {
    /// Allowed values
    #[serde(rename = "enum")]
    #[serde(default, deserialize_with = "scalar_list")]
    pub enum_values: Vec<String>,

    #[serde(default, deserialize_with = "optional_scalar")]
    pub default: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// Channel (topic or route)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub parameters: Parameters,

    /// Messages flowing into the generated application
    #[serde(default)]
    pub subscribe: Option<Operation>,

    /// Messages the generated application emits
    #[serde(default)]
    pub publish: Option<Operation>,
}

/// Channel parameters in either list or map form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Parameters {
    List(Vec<Parameter>),
    Map(BTreeMap<String, Parameter>),
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters::List(Vec::new())
    }
}

impl Parameters {
    /// Parameters with their names; unnamed list entries are skipped
    pub fn entries(&self) -> Vec<(String, &Parameter)> {
        match self {
            Parameters::List(list) => list
                .iter()
                .filter_map(|p| p.name.clone().map(|name| (name, p)))
                .collect(),
            Parameters::Map(map) => map.iter().map(|(name, p)| (name.clone(), p)).collect(),
        }
    }
}

/// Channel parameter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameter {
    /// Name, only present in the list layout
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub schema: Option<Value>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Subscribe or publish operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId")]
    #[serde(default)]
    pub operation_id: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Protocol-specific binding info (e.g. `flogo-mqtt: {qos: 1}`)
    #[serde(rename = "protocolInfo", alias = "bindings")]
    #[serde(default)]
    pub protocol_info: Option<Value>,

    #[serde(default)]
    pub message: Option<Value>,
}

/// Reusable components
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    /// Security scheme definitions keyed by name
    #[serde(rename = "securitySchemes")]
    #[serde(default)]
    pub security_schemes: BTreeMap<String, Value>,
}

impl AsyncApiDocument {
    /// Application name: the document id, falling back to the title
    pub fn app_name(&self) -> String {
        self.id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.info.title.clone())
    }

    /// `type` of a named security scheme
    pub fn security_scheme_type(&self, scheme: &str) -> Option<&str> {
        self.components
            .as_ref()?
            .security_schemes
            .get(scheme)?
            .get("type")?
            .as_str()
    }

    /// Whether any of the server's security requirements is user/password auth
    pub fn uses_user_password(&self, server: &Server) -> bool {
        server
            .security
            .iter()
            .flat_map(|requirement| requirement.keys())
            .any(|scheme| self.security_scheme_type(scheme) == Some("userPassword"))
    }
}

/// YAML authors often leave ports unquoted; accept numbers and booleans as text
fn scalar_to_string<E: serde::de::Error>(value: Value) -> Result<String, E> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(E::custom(format!("expected a scalar, found {}", other))),
    }
}

fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_to_string(value).map(Some),
    }
}

fn scalar_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Vec::<Value>::deserialize(deserializer)?
        .into_iter()
        .map(scalar_to_string)
        .collect()
}
