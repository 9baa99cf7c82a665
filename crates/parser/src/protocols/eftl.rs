//! eFTL binding

use super::{join_segments, ProtocolBinding, ProtocolProfile, Settings};
use asyncapi_flogo_common::SettingsMap;

const PROFILE: ProtocolProfile = ProtocolProfile {
    name: "eftl",
    secure: "eftl-secure",
    trigger_ref: "github.com/project-flogo/eftl/trigger",
    trigger_import: "github.com/project-flogo/eftl@{version}:/trigger",
    activity_ref: Some("github.com/project-flogo/eftl/activity"),
    activity_import: Some("github.com/project-flogo/eftl@{version}:/activity"),
    port: 9097,
    content_path: "content",
    params_path: None,
    connection_extensions: false,
};

pub struct EftlBinding;

fn insert_connection(out: &mut SettingsMap, settings: &Settings) {
    out.insert("url".into(), settings.url.clone().into());
    if settings.user_password {
        out.insert("user".into(), settings.user.into());
        out.insert("password".into(), settings.password.into());
    }
    if settings.secure {
        out.insert("ca".into(), settings.trust_store.into());
    }
}

fn destination(settings: &Settings) -> String {
    join_segments(settings.relative_topic(), "_")
}

impl ProtocolBinding for EftlBinding {
    fn profile(&self) -> &ProtocolProfile {
        &PROFILE
    }

    fn trigger_settings(&self, settings: &Settings) -> SettingsMap {
        let mut out = SettingsMap::new();
        out.insert(
            "id".into(),
            format!("{}{}", settings.name, settings.server_index).into(),
        );
        insert_connection(&mut out, settings);
        out
    }

    fn handler_settings(&self, settings: &Settings) -> SettingsMap {
        let mut out = SettingsMap::new();
        out.insert("dest".into(), destination(settings).into());
        out
    }

    fn service_settings(&self, settings: &Settings) -> SettingsMap {
        let mut out = SettingsMap::new();
        out.insert(
            "id".into(),
            format!("{}{}", settings.name, settings.topic).into(),
        );
        insert_connection(&mut out, settings);
        out.insert("dest".into(), destination(settings).into());
        out
    }
}
