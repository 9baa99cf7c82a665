//! Protocol bindings
//!
//! Each supported wire protocol is a stateless binding that maps the
//! normalized [`Settings`] of one server/channel/operation into the settings
//! blocks of a Flogo trigger, trigger handler, and outbound service.
//!
//! Bindings are dispatched through the closed [`Protocol`] enumeration. The
//! order of [`Protocol::ALL`] is the order in which protocol passes run.

mod eftl;
mod http;
mod kafka;
mod mqtt;
pub mod tls;
mod websocket;

pub use eftl::EftlBinding;
pub use http::HttpBinding;
pub use kafka::KafkaBinding;
pub use mqtt::MqttBinding;
pub use websocket::WebSocketBinding;

use crate::binding_info::{ChannelParameter, OperationBindings, ServerExtensions};
use asyncapi_flogo_common::SettingsMap;

/// Deferred credential and TLS material references
///
/// The generated application resolves these from its own environment at
/// runtime; the source document never carries secrets.
pub mod env {
    pub const USER: &str = "=$env[USER]";
    pub const PASSWORD: &str = "=$env[PASSWORD]";
    pub const TRUST_STORE: &str = "=$env[TRUST_STORE]";
    pub const CERT_FILE: &str = "=$env[CERT_FILE]";
    pub const KEY_FILE: &str = "=$env[KEY_FILE]";
}

/// Supported protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Kafka,
    Eftl,
    Mqtt,
    WebSocket,
    Http,
}

impl Protocol {
    /// All protocols, in pass order
    pub const ALL: [Protocol; 5] = [
        Protocol::Kafka,
        Protocol::Eftl,
        Protocol::Mqtt,
        Protocol::WebSocket,
        Protocol::Http,
    ];

    pub fn binding(self) -> &'static dyn ProtocolBinding {
        match self {
            Protocol::Kafka => &KafkaBinding,
            Protocol::Eftl => &EftlBinding,
            Protocol::Mqtt => &MqttBinding,
            Protocol::WebSocket => &WebSocketBinding,
            Protocol::Http => &HttpBinding,
        }
    }

    pub fn name(self) -> &'static str {
        self.binding().profile().name
    }

    /// Resolve a server protocol identifier, returning the protocol and
    /// whether it names the secure variant
    ///
    /// # Examples
    /// ```
    /// use asyncapi_flogo_parser::Protocol;
    ///
    /// assert_eq!(Protocol::from_identifier("secure-mqtt"), Some((Protocol::Mqtt, true)));
    /// assert_eq!(Protocol::from_identifier("kafka"), Some((Protocol::Kafka, false)));
    /// assert_eq!(Protocol::from_identifier("amqp"), None);
    /// ```
    pub fn from_identifier(identifier: &str) -> Option<(Protocol, bool)> {
        Self::ALL.into_iter().find_map(|protocol| {
            let profile = protocol.binding().profile();
            if identifier == profile.name {
                Some((protocol, false))
            } else if identifier == profile.secure {
                Some((protocol, true))
            } else {
                None
            }
        })
    }
}

/// Fixed description of a protocol's generated modules and message layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolProfile {
    /// Plain protocol identifier (e.g. "mqtt")
    pub name: &'static str,
    /// Secure variant identifier (e.g. "secure-mqtt")
    pub secure: &'static str,
    /// Trigger module reference
    pub trigger_ref: &'static str,
    /// Trigger import pattern; `{version}` is replaced by the pinned version
    pub trigger_import: &'static str,
    /// Activity module reference, if the protocol supports outbound messages
    pub activity_ref: Option<&'static str>,
    /// Activity import pattern
    pub activity_import: Option<&'static str>,
    /// Port of the generated publish endpoint
    pub port: u16,
    /// Where the inbound payload lives in the trigger output
    pub content_path: &'static str,
    /// Where extracted topic/path parameters live in the trigger output
    pub params_path: Option<&'static str>,
    /// The binding reads the server connection extensions
    pub connection_extensions: bool,
}

impl ProtocolProfile {
    pub fn matches(&self, identifier: &str) -> bool {
        identifier == self.name || identifier == self.secure
    }

    /// Trigger import, pinned to `version` when one is known
    pub fn trigger_import_for(&self, version: Option<&str>) -> String {
        pin(self.trigger_import, self.trigger_ref, version)
    }

    /// Activity import, if the protocol has an activity
    pub fn activity_import_for(&self, version: Option<&str>) -> Option<String> {
        let pattern = self.activity_import?;
        let reference = self.activity_ref?;
        Some(pin(pattern, reference, version))
    }
}

fn pin(pattern: &str, reference: &str, version: Option<&str>) -> String {
    match version {
        Some(version) => pattern.replace("{version}", version),
        None => reference.to_string(),
    }
}

/// Normalized context for one server, channel, and operation
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Protocol name (plain variant)
    pub name: &'static str,
    /// Position of the server in the document
    pub server_index: usize,
    /// The server uses the secure protocol variant
    pub secure: bool,
    /// The server's security requirement resolves to user/password auth
    pub user_password: bool,
    /// Connection URL expression
    pub url: String,
    /// Port expression, when the URL carries a port
    pub port: Option<String>,
    pub user: &'static str,
    pub password: &'static str,
    pub trust_store: &'static str,
    pub cert_file: &'static str,
    pub key_file: &'static str,
    /// Decoded server extensions
    pub extensions: ServerExtensions,
    /// Parameters of the current channel
    pub parameters: Vec<ChannelParameter>,
    /// Resolved topic or path, always starting with `/`
    pub topic: String,
    /// Decoded binding info of the current operation
    pub binding_info: OperationBindings,
}

impl Settings {
    /// Settings for a server, before any channel is applied
    pub fn new(name: &'static str, server_index: usize, url: impl Into<String>) -> Self {
        Self {
            name,
            server_index,
            secure: false,
            user_password: false,
            url: url.into(),
            port: None,
            user: env::USER,
            password: env::PASSWORD,
            trust_store: env::TRUST_STORE,
            cert_file: env::CERT_FILE,
            key_file: env::KEY_FILE,
            extensions: ServerExtensions::default(),
            parameters: Vec::new(),
            topic: "/".to_string(),
            binding_info: OperationBindings::default(),
        }
    }

    /// Topic without its leading `/`
    pub fn relative_topic(&self) -> &str {
        self.topic.strip_prefix('/').unwrap_or(&self.topic)
    }

    /// Channel parameter by name
    pub fn parameter(&self, name: &str) -> Option<&ChannelParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Mapping from normalized settings to Flogo configuration blocks
#[cfg_attr(test, mockall::automock)]
pub trait ProtocolBinding {
    fn profile(&self) -> &ProtocolProfile;

    /// Inbound listener settings for a server
    fn trigger_settings(&self, settings: &Settings) -> SettingsMap;

    /// Handler settings for one inbound channel
    fn handler_settings(&self, settings: &Settings) -> SettingsMap;

    /// Outbound service settings for one channel
    fn service_settings(&self, settings: &Settings) -> SettingsMap;
}

/// Join the segments of a relative topic with a protocol delimiter
pub(crate) fn join_segments(topic: &str, delimiter: &str) -> String {
    topic.split('/').collect::<Vec<_>>().join(delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_order() {
        let names: Vec<_> = Protocol::ALL.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["kafka", "eftl", "mqtt", "ws", "http"]);
    }

    #[test]
    fn test_secure_identifiers() {
        for protocol in Protocol::ALL {
            let profile = protocol.binding().profile();
            assert_eq!(
                Protocol::from_identifier(profile.secure),
                Some((protocol, true))
            );
            assert!(profile.matches(profile.name));
        }
    }

    #[test]
    fn test_import_pinning() {
        let profile = Protocol::Eftl.binding().profile();
        assert_eq!(
            profile.trigger_import_for(Some("v1")),
            "github.com/project-flogo/eftl@v1:/trigger"
        );
        assert_eq!(
            profile.trigger_import_for(None),
            "github.com/project-flogo/eftl/trigger"
        );
        assert!(Protocol::WebSocket
            .binding()
            .profile()
            .activity_import_for(Some("v1"))
            .is_none());
    }

    #[test]
    fn test_relative_topic() {
        let mut settings = Settings::new("kafka", 0, "=$property[kafka0URL]");
        settings.topic = "/orders/created".to_string();
        assert_eq!(settings.relative_topic(), "orders/created");
        assert_eq!(join_segments(settings.relative_topic(), "."), "orders.created");
    }
}
