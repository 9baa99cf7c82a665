//! Kafka binding

use super::{join_segments, ProtocolBinding, ProtocolProfile, Settings};
use asyncapi_flogo_common::{parse_template, SettingsMap};

const PROFILE: ProtocolProfile = ProtocolProfile {
    name: "kafka",
    secure: "kafka-secure",
    trigger_ref: "github.com/project-flogo/contrib/trigger/kafka",
    trigger_import: "github.com/project-flogo/contrib/trigger/kafka@{version}",
    activity_ref: Some("github.com/project-flogo/contrib/activity/kafka"),
    activity_import: Some("github.com/project-flogo/contrib/activity/kafka@{version}"),
    port: 9096,
    content_path: "message",
    params_path: None,
    connection_extensions: false,
};

pub struct KafkaBinding;

impl KafkaBinding {
    fn connection(settings: &Settings) -> SettingsMap {
        let mut out = SettingsMap::new();
        out.insert("brokerUrls".into(), settings.url.clone().into());
        if settings.user_password {
            out.insert("user".into(), settings.user.into());
            out.insert("password".into(), settings.password.into());
        }
        if settings.secure {
            out.insert("trustStore".into(), settings.trust_store.into());
        }
        out
    }
}

impl ProtocolBinding for KafkaBinding {
    fn profile(&self) -> &ProtocolProfile {
        &PROFILE
    }

    fn trigger_settings(&self, settings: &Settings) -> SettingsMap {
        Self::connection(settings)
    }

    fn handler_settings(&self, settings: &Settings) -> SettingsMap {
        let mut out = SettingsMap::new();
        out.insert(
            "topic".into(),
            join_segments(settings.relative_topic(), ".").into(),
        );
        if let Some(info) = &settings.binding_info.kafka {
            if let Some(partitions) = &info.partitions {
                out.insert("partitions".into(), partitions.clone().into());
            }
            if let Some(offset) = info.offset {
                out.insert("offset".into(), offset.into());
            }
        }
        out
    }

    fn service_settings(&self, settings: &Settings) -> SettingsMap {
        let mut out = Self::connection(settings);
        let topic = parse_template(settings.relative_topic()).to_colon_params();
        out.insert("topic".into(), join_segments(&topic, ".").into());
        out
    }
}
