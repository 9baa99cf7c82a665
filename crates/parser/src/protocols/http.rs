//! HTTP binding: REST trigger and REST invocation activity

use super::tls::TlsPolicy;
use super::{ProtocolBinding, ProtocolProfile, Settings};
use asyncapi_flogo_common::{parse_template, SettingsMap};
use serde_json::Value;

const PROFILE: ProtocolProfile = ProtocolProfile {
    name: "http",
    secure: "https",
    trigger_ref: "github.com/project-flogo/contrib/trigger/rest",
    trigger_import: "github.com/project-flogo/contrib/trigger/rest@{version}",
    activity_ref: Some("github.com/project-flogo/contrib/activity/rest"),
    activity_import: Some("github.com/project-flogo/contrib/activity/rest@{version}"),
    port: 9100,
    content_path: "content",
    params_path: None,
    connection_extensions: false,
};

pub struct HttpBinding;

impl HttpBinding {
    fn path(settings: &Settings) -> String {
        parse_template(&settings.topic).to_colon_params()
    }
}

impl ProtocolBinding for HttpBinding {
    fn profile(&self) -> &ProtocolProfile {
        &PROFILE
    }

    fn trigger_settings(&self, settings: &Settings) -> SettingsMap {
        let mut out = SettingsMap::new();
        let port = match &settings.port {
            Some(expression) => Value::String(expression.clone()),
            None if settings.secure => Value::from(443),
            None => Value::from(80),
        };
        out.insert("port".into(), port);
        if settings.secure {
            out.insert("enableTLS".into(), Value::Bool(true));
            out.insert("certFile".into(), settings.cert_file.into());
            out.insert("keyFile".into(), settings.key_file.into());
        }
        out
    }

    fn handler_settings(&self, settings: &Settings) -> SettingsMap {
        let mut out = SettingsMap::new();
        out.insert("path".into(), Self::path(settings).into());
        if let Some(method) = settings
            .binding_info
            .http
            .as_ref()
            .and_then(|info| info.method.clone())
        {
            out.insert("method".into(), method.into());
        }
        out
    }

    fn service_settings(&self, settings: &Settings) -> SettingsMap {
        let mut out = SettingsMap::new();
        let base = settings.url.strip_prefix('=').unwrap_or(&settings.url);
        out.insert(
            "uri".into(),
            format!("=string.concat({}, '{}')", base, Self::path(settings)).into(),
        );

        let info = settings.binding_info.http.clone().unwrap_or_default();
        if let Some(method) = info.method {
            out.insert("method".into(), method.into());
        }
        if let Some(headers) = info.headers {
            let headers = headers
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            out.insert("headers".into(), Value::Object(headers));
        }
        if let Some(proxy) = info.proxy {
            out.insert("proxy".into(), proxy.into());
        }
        if let Some(timeout) = info.timeout {
            out.insert("timeout".into(), timeout.into());
        }
        if settings.secure {
            TlsPolicy::resolve(info.skip_verify, info.use_system_cert)
                .apply_flat(&mut out, settings);
        }
        out
    }
}
