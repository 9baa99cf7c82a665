//! WebSocket client binding
//!
//! Inbound only: the protocol has no activity, so outbound channels produce
//! no services.

use super::{ProtocolBinding, ProtocolProfile, Settings};
use asyncapi_flogo_common::SettingsMap;

const PROFILE: ProtocolProfile = ProtocolProfile {
    name: "ws",
    secure: "wss",
    trigger_ref: "github.com/project-flogo/websocket/trigger/wsclient",
    trigger_import: "github.com/project-flogo/websocket@{version}:/trigger/wsclient",
    activity_ref: None,
    activity_import: None,
    port: 9099,
    content_path: "content",
    params_path: None,
    connection_extensions: false,
};

pub struct WebSocketBinding;

impl ProtocolBinding for WebSocketBinding {
    fn profile(&self) -> &ProtocolProfile {
        &PROFILE
    }

    fn trigger_settings(&self, settings: &Settings) -> SettingsMap {
        let mut out = SettingsMap::new();
        out.insert("url".into(), settings.url.clone().into());
        out
    }

    fn handler_settings(&self, _settings: &Settings) -> SettingsMap {
        SettingsMap::new()
    }

    fn service_settings(&self, _settings: &Settings) -> SettingsMap {
        SettingsMap::new()
    }
}
