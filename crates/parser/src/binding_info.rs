//! Typed decoding of document extensions and operation binding info
//!
//! Server and parameter `x-*` extensions that the compiler understands must
//! be well typed: a mistyped value aborts compilation. Operation binding info
//! (`flogo-http`, `flogo-mqtt`, `flogo-kafka`) is permissive: wrong-typed or
//! unknown keys are dropped and reported as warnings.

use crate::asyncapi::{Extensions, Parameter};
use asyncapi_flogo_common::{GeneratorError, Result};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Server extensions read by the protocol bindings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerExtensions {
    /// `x-store`: MQTT persistent session store directory
    pub store: Option<String>,
    /// `x-clean-session`
    pub clean_session: Option<bool>,
    /// `x-keep-alive`: seconds
    pub keep_alive: Option<Number>,
    /// `x-auto-reconnect`
    pub auto_reconnect: Option<bool>,
    /// `x-skip-verify`
    pub skip_verify: Option<bool>,
    /// `x-use-systemcert`
    pub use_system_cert: Option<bool>,
    /// `x-trigger-version`: pins the trigger module version
    pub trigger_version: Option<String>,
    /// `x-activity-version`: pins the activity module version
    pub activity_version: Option<String>,
}

impl ServerExtensions {
    /// Decode the extensions of a server
    ///
    /// `owner` names the server in error messages. Module version pins are
    /// read for every server; the connection keys (`x-store`, `x-keep-alive`,
    /// TLS flags, ...) only when `connection` is set, so servers of other
    /// protocols may carry them with any type.
    pub fn decode(owner: &str, extensions: &Extensions, connection: bool) -> Result<Self> {
        let strict = Strict { owner, extensions };
        let mut decoded = Self {
            trigger_version: strict.string("x-trigger-version")?,
            activity_version: strict.string("x-activity-version")?,
            ..Self::default()
        };
        if connection {
            decoded.store = strict.string("x-store")?;
            decoded.clean_session = strict.boolean("x-clean-session")?;
            decoded.keep_alive = strict.number("x-keep-alive")?;
            decoded.auto_reconnect = strict.boolean("x-auto-reconnect")?;
            decoded.skip_verify = strict.boolean("x-skip-verify")?;
            decoded.use_system_cert = strict.boolean("x-use-systemcert")?;
        }
        Ok(decoded)
    }
}

/// Channel parameter with its decoded extension flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelParameter {
    pub name: String,
    /// `x-multilevel`: the parameter spans several topic levels
    pub multilevel: Option<bool>,
}

impl ChannelParameter {
    pub fn decode(channel: &str, name: &str, parameter: &Parameter) -> Result<Self> {
        let owner = format!("parameter {} of channel {}", name, channel);
        let strict = Strict {
            owner: &owner,
            extensions: &parameter.extensions,
        };
        Ok(Self {
            name: name.to_string(),
            multilevel: strict.boolean("x-multilevel")?,
        })
    }

    pub fn is_multilevel(&self) -> bool {
        self.multilevel.unwrap_or(false)
    }
}

struct Strict<'a> {
    owner: &'a str,
    extensions: &'a Extensions,
}

impl Strict<'_> {
    fn present(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key).filter(|v| !v.is_null())
    }

    fn error(&self, key: &str, expected: &str, found: &Value) -> GeneratorError {
        GeneratorError::Extension {
            owner: self.owner.to_string(),
            key: key.to_string(),
            reason: format!("expected {}, found {}", expected, found),
        }
    }

    fn string(&self, key: &str) -> Result<Option<String>> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.error(key, "a string", other)),
        }
    }

    fn boolean(&self, key: &str) -> Result<Option<bool>> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.error(key, "a boolean", other)),
        }
    }

    fn number(&self, key: &str) -> Result<Option<Number>> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some(n.clone())),
            Some(other) => Err(self.error(key, "a number", other)),
        }
    }
}

/// `flogo-http` binding info
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpBindingInfo {
    pub method: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
    pub proxy: Option<String>,
    pub timeout: Option<i64>,
    pub skip_verify: Option<bool>,
    pub use_system_cert: Option<bool>,
}

/// `flogo-mqtt` binding info
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MqttBindingInfo {
    pub reply_topic: Option<String>,
    pub qos: Option<i64>,
    pub store: Option<String>,
    pub clean_session: Option<bool>,
    pub skip_verify: Option<bool>,
    pub use_system_cert: Option<bool>,
}

/// `flogo-kafka` binding info
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KafkaBindingInfo {
    pub partitions: Option<String>,
    pub offset: Option<i64>,
}

/// Binding info of one operation, decoded for every protocol
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationBindings {
    pub http: Option<HttpBindingInfo>,
    pub mqtt: Option<MqttBindingInfo>,
    pub kafka: Option<KafkaBindingInfo>,
}

impl OperationBindings {
    /// Decode an operation's raw binding info
    ///
    /// Problems are appended to `warnings`; decoding itself never fails.
    pub fn decode(owner: &str, raw: Option<&Value>, warnings: &mut Vec<String>) -> Self {
        let Some(raw) = raw.filter(|v| !v.is_null()) else {
            return Self::default();
        };
        let Some(root) = raw.as_object() else {
            report(warnings, format!("{}: binding info is not an object, ignoring", owner));
            return Self::default();
        };

        let mut bindings = Self::default();

        if let Some(map) = section(owner, root, "flogo-http", warnings) {
            let mut fields = Fields::new(owner, "flogo-http", map, warnings);
            bindings.http = Some(HttpBindingInfo {
                method: fields.string("method"),
                headers: fields.string_map("headers"),
                proxy: fields.string("proxy"),
                timeout: fields.integer("timeout"),
                skip_verify: fields.boolean("skipVerify"),
                use_system_cert: fields.boolean("useSystemCert"),
            });
            fields.finish();
        }

        if let Some(map) = section(owner, root, "flogo-mqtt", warnings) {
            let mut fields = Fields::new(owner, "flogo-mqtt", map, warnings);
            bindings.mqtt = Some(MqttBindingInfo {
                reply_topic: fields.string("replyTopic"),
                qos: fields.integer("qos"),
                store: fields.string("store"),
                clean_session: fields.boolean("cleanSession"),
                skip_verify: fields.boolean("skipVerify"),
                use_system_cert: fields.boolean("useSystemCert"),
            });
            fields.finish();
        }

        if let Some(map) = section(owner, root, "flogo-kafka", warnings) {
            let mut fields = Fields::new(owner, "flogo-kafka", map, warnings);
            bindings.kafka = Some(KafkaBindingInfo {
                partitions: fields.string("partitions"),
                offset: fields.integer("offset"),
            });
            fields.finish();
        }

        bindings
    }
}

fn report(warnings: &mut Vec<String>, message: String) {
    warn!("{}", message);
    warnings.push(message);
}

fn section<'a>(
    owner: &str,
    root: &'a Map<String, Value>,
    key: &str,
    warnings: &mut Vec<String>,
) -> Option<&'a Map<String, Value>> {
    let value = root.get(key).filter(|v| !v.is_null())?;
    match value.as_object() {
        Some(map) => Some(map),
        None => {
            report(
                warnings,
                format!("{}: {} is not an object, ignoring", owner, key),
            );
            None
        }
    }
}

/// Permissive field reader over one binding info section
struct Fields<'a, 'w> {
    owner: &'a str,
    section: &'static str,
    map: &'a Map<String, Value>,
    seen: Vec<&'static str>,
    warnings: &'w mut Vec<String>,
}

impl<'a, 'w> Fields<'a, 'w> {
    fn new(
        owner: &'a str,
        section: &'static str,
        map: &'a Map<String, Value>,
        warnings: &'w mut Vec<String>,
    ) -> Self {
        Self {
            owner,
            section,
            map,
            seen: Vec::new(),
            warnings,
        }
    }

    fn take(&mut self, key: &'static str) -> Option<&'a Value> {
        self.seen.push(key);
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn mistyped(&mut self, key: &str, expected: &str, found: &Value) {
        let message = format!(
            "{}: {}.{} should be {}, found {}; ignoring",
            self.owner, self.section, key, expected, found
        );
        report(self.warnings, message);
    }

    fn string(&mut self, key: &'static str) -> Option<String> {
        match self.take(key)? {
            Value::String(s) => Some(s.clone()),
            other => {
                self.mistyped(key, "a string", other);
                None
            }
        }
    }

    fn boolean(&mut self, key: &'static str) -> Option<bool> {
        match self.take(key)? {
            Value::Bool(b) => Some(*b),
            other => {
                self.mistyped(key, "a boolean", other);
                None
            }
        }
    }

    /// Integers; fractional numbers are truncated
    fn integer(&mut self, key: &'static str) -> Option<i64> {
        match self.take(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            other => {
                self.mistyped(key, "a number", other);
                None
            }
        }
    }

    fn string_map(&mut self, key: &'static str) -> Option<BTreeMap<String, String>> {
        let value = self.take(key)?;
        let Some(object) = value.as_object() else {
            self.mistyped(key, "a map of strings", value);
            return None;
        };
        let mut out = BTreeMap::new();
        for (name, entry) in object {
            match entry.as_str() {
                Some(s) => {
                    out.insert(name.clone(), s.to_string());
                }
                None => {
                    self.mistyped(key, "a map of strings", value);
                    return None;
                }
            }
        }
        Some(out)
    }

    fn finish(self) {
        for key in self.map.keys() {
            if !self.seen.iter().any(|seen| *seen == key.as_str()) {
                let message = format!(
                    "{}: unknown key {}.{}; ignoring",
                    self.owner, self.section, key
                );
                report(self.warnings, message);
            }
        }
    }
}
