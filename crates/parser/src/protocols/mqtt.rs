//! MQTT binding: edge-contrib MQTT trigger and publish activity

use super::tls::TlsPolicy;
use super::{ProtocolBinding, ProtocolProfile, Settings};
use asyncapi_flogo_common::{parse_template, SettingsMap};
use serde_json::Value;

const PROFILE: ProtocolProfile = ProtocolProfile {
    name: "mqtt",
    secure: "secure-mqtt",
    trigger_ref: "github.com/project-flogo/edge-contrib/trigger/mqtt",
    trigger_import: "github.com/project-flogo/edge-contrib/trigger/mqtt@{version}",
    activity_ref: Some("github.com/project-flogo/edge-contrib/activity/mqtt"),
    activity_import: Some("github.com/project-flogo/edge-contrib/activity/mqtt@{version}"),
    port: 9098,
    content_path: "message",
    params_path: Some("topicParams"),
    connection_extensions: true,
};

pub struct MqttBinding;

fn insert_credentials(out: &mut SettingsMap, settings: &Settings) {
    if settings.user_password {
        out.insert("username".into(), settings.user.into());
        out.insert("password".into(), settings.password.into());
    }
}

impl ProtocolBinding for MqttBinding {
    fn profile(&self) -> &ProtocolProfile {
        &PROFILE
    }

    fn trigger_settings(&self, settings: &Settings) -> SettingsMap {
        let mut out = SettingsMap::new();
        out.insert(
            "id".into(),
            format!("{}{}", settings.name, settings.server_index).into(),
        );
        out.insert("broker".into(), settings.url.clone().into());
        insert_credentials(&mut out, settings);

        let ext = &settings.extensions;
        if let Some(store) = ext.store.as_ref().filter(|s| !s.is_empty()) {
            out.insert("store".into(), store.clone().into());
        }
        if let Some(clean_session) = ext.clean_session {
            out.insert("cleanSession".into(), clean_session.into());
        }
        if let Some(keep_alive) = &ext.keep_alive {
            out.insert("keepAlive".into(), Value::Number(keep_alive.clone()));
        }
        if let Some(auto_reconnect) = ext.auto_reconnect {
            out.insert("autoReconnect".into(), auto_reconnect.into());
        }
        if settings.secure {
            TlsPolicy::resolve(ext.skip_verify, ext.use_system_cert)
                .apply_nested(&mut out, settings);
        }
        out
    }

    fn handler_settings(&self, settings: &Settings) -> SettingsMap {
        let topic = parse_template(settings.relative_topic()).render_with(|name| {
            let multilevel = settings
                .parameter(name)
                .map(|p| p.is_multilevel())
                .unwrap_or(false);
            if multilevel {
                format!("#{}", name)
            } else {
                format!("+{}", name)
            }
        });

        let mut out = SettingsMap::new();
        out.insert("topic".into(), topic.into());
        if let Some(info) = &settings.binding_info.mqtt {
            if let Some(reply_topic) = &info.reply_topic {
                out.insert("replyTopic".into(), reply_topic.clone().into());
            }
            if let Some(qos) = info.qos {
                out.insert("qos".into(), qos.into());
            }
        }
        out
    }

    fn service_settings(&self, settings: &Settings) -> SettingsMap {
        let mut out = SettingsMap::new();
        out.insert(
            "id".into(),
            format!("{}{}_{}", settings.name, settings.server_index, settings.topic).into(),
        );
        out.insert("broker".into(), settings.url.clone().into());
        out.insert(
            "topic".into(),
            parse_template(settings.relative_topic())
                .to_colon_params()
                .into(),
        );
        insert_credentials(&mut out, settings);

        let info = settings.binding_info.mqtt.clone().unwrap_or_default();
        if let Some(store) = info.store {
            out.insert("store".into(), store.into());
        }
        if let Some(clean_session) = info.clean_session {
            out.insert("cleanSession".into(), clean_session.into());
        }
        if let Some(qos) = info.qos {
            out.insert("qos".into(), qos.into());
        }
        if settings.secure {
            TlsPolicy::resolve(info.skip_verify, info.use_system_cert)
                .apply_flat(&mut out, settings);
        }
        out
    }
}
