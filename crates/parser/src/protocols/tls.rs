//! TLS verification policy shared by the secure protocol variants
//!
//! Certificate verification is skipped unless explicitly enabled. The system
//! certificate pool setting only matters once verification is on, and the
//! trust store is referenced only when the system pool is explicitly refused.

use super::Settings;
use asyncapi_flogo_common::SettingsMap;
use serde_json::Value;

/// Effective TLS verification settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsPolicy {
    pub skip_verify: bool,
    /// `Some` only when verification is enabled and a value was given
    pub use_system_cert: Option<bool>,
}

impl Default for TlsPolicy {
    fn default() -> Self {
        Self::resolve(None, None)
    }
}

impl TlsPolicy {
    /// # Examples
    /// ```
    /// use asyncapi_flogo_parser::protocols::tls::TlsPolicy;
    ///
    /// let policy = TlsPolicy::resolve(None, Some(false));
    /// assert!(policy.skip_verify);
    /// assert_eq!(policy.use_system_cert, None);
    /// assert!(!policy.include_trust_store());
    /// ```
    pub fn resolve(skip_verify: Option<bool>, use_system_cert: Option<bool>) -> Self {
        let skip_verify = skip_verify.unwrap_or(true);
        Self {
            skip_verify,
            use_system_cert: if skip_verify { None } else { use_system_cert },
        }
    }

    pub fn include_trust_store(&self) -> bool {
        self.use_system_cert == Some(false)
    }

    /// Client certificate block, plus the trust store when required
    fn ssl_config(&self, settings: &Settings) -> SettingsMap {
        let mut ssl = SettingsMap::new();
        ssl.insert("certFile".into(), settings.cert_file.into());
        ssl.insert("keyFile".into(), settings.key_file.into());
        if self.include_trust_store() {
            ssl.insert("caFile".into(), settings.trust_store.into());
        }
        ssl
    }

    /// Listener layout: every TLS setting nested under `sslConfig`
    pub fn apply_nested(&self, target: &mut SettingsMap, settings: &Settings) {
        let mut ssl = self.ssl_config(settings);
        ssl.insert("skipVerify".into(), Value::Bool(self.skip_verify));
        if let Some(use_system_cert) = self.use_system_cert {
            ssl.insert("useSystemCert".into(), Value::Bool(use_system_cert));
        }
        target.insert("sslConfig".into(), Value::Object(ssl));
    }

    /// Client layout: certificates under `sslConfig`, verification flags at
    /// the top level
    pub fn apply_flat(&self, target: &mut SettingsMap, settings: &Settings) {
        target.insert("sslConfig".into(), Value::Object(self.ssl_config(settings)));
        target.insert("skipVerify".into(), Value::Bool(self.skip_verify));
        if let Some(use_system_cert) = self.use_system_cert {
            target.insert("useSystemCert".into(), Value::Bool(use_system_cert));
        }
    }
}
