//! AsyncAPI document loader

use super::types::AsyncApiDocument;
use crate::converter::{compile, CompileOptions};
use asyncapi_flogo_common::{Compilation, GeneratorError, Result};
use std::fs;
use std::path::Path;

/// AsyncAPI document parser
///
/// Reads YAML or JSON documents into the typed model consumed by the
/// binding compiler.
pub struct AsyncApiParser {
    document: AsyncApiDocument,
}

impl AsyncApiParser {
    /// Load an AsyncAPI document from a file path
    ///
    /// # Example
    /// ```rust,ignore
    /// let parser = AsyncApiParser::from_file("asyncapi.yml")?;
    /// let compilation = parser.compile(&CompileOptions::embedded()?)?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            GeneratorError::Parse(format!(
                "Failed to read AsyncAPI file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_str(&content)
    }

    /// Parse a document from YAML or JSON text
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let document: AsyncApiDocument = if content.trim_start().starts_with('{') {
            serde_json::from_str(content).map_err(|e| {
                GeneratorError::Parse(format!("Failed to parse AsyncAPI JSON: {}", e))
            })?
        } else {
            serde_yaml::from_str(content).map_err(|e| {
                GeneratorError::Parse(format!("Failed to parse AsyncAPI YAML: {}", e))
            })?
        };

        if document.asyncapi.is_empty() {
            return Err(GeneratorError::Parse(
                "Missing required field 'asyncapi'".to_string(),
            ));
        }

        Ok(Self { document })
    }

    /// Compile the document into a Flogo application
    pub fn compile(&self, options: &CompileOptions) -> Result<Compilation> {
        compile(&self.document, options)
    }

    /// Get reference to the underlying document
    pub fn document(&self) -> &AsyncApiDocument {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asyncapi::Servers;

    #[test]
    fn test_parse_minimal_yaml() {
        let yaml = r#"
asyncapi: "2.0.0"
id: "urn:example:minimal"
info:
  title: Minimal
  version: "1.0.0"
"#;
        let parser = AsyncApiParser::from_str(yaml).unwrap();
        assert_eq!(parser.document().asyncapi, "2.0.0");
        assert_eq!(parser.document().app_name(), "urn:example:minimal");
        assert!(parser.document().servers.is_empty());
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "asyncapi": "2.0.0",
            "info": {"title": "Json API", "version": "1.0.0"},
            "servers": {"prod": {"url": "broker:1883", "protocol": "mqtt"}}
        }"#;
        let parser = AsyncApiParser::from_str(json).unwrap();
        assert_eq!(parser.document().app_name(), "Json API");
        assert!(matches!(parser.document().servers, Servers::Map(_)));
    }

    #[test]
    fn test_server_list_layout() {
        let yaml = r#"
asyncapi: "2.0.0-rc1"
info:
  title: Legacy
  version: "1.0.0"
servers:
  - url: api.example.com:{port}
    protocol: kafka
    baseChannel: events
    variables:
      port:
        enum: ["9092", "9093"]
        default: "9092"
    x-trigger-version: v1.0.0
channels:
  orders:
    parameters:
      - name: id
        x-multilevel: true
    subscribe:
      protocolInfo:
        flogo-kafka:
          offset: 5
"#;
        let parser = AsyncApiParser::from_str(yaml).unwrap();
        let doc = parser.document();
        let entries = doc.servers.entries();
        assert_eq!(entries.len(), 1);
        let (name, server) = &entries[0];
        assert_eq!(name, "0");
        assert_eq!(server.base_channel.as_deref(), Some("events"));
        assert_eq!(server.variables["port"].enum_values, vec!["9092", "9093"]);
        assert_eq!(
            server.extensions.get("x-trigger-version").and_then(|v| v.as_str()),
            Some("v1.0.0")
        );

        let channel = &doc.channels["orders"];
        let params = channel.parameters.entries();
        assert_eq!(params[0].0, "id");
        assert!(channel.subscribe.as_ref().unwrap().protocol_info.is_some());
    }

    #[test]
    fn test_bindings_alias() {
        let yaml = r#"
asyncapi: "2.0.0"
info: {title: T, version: "1"}
channels:
  /a:
    publish:
      bindings:
        flogo-http: {method: PUT}
"#;
        let parser = AsyncApiParser::from_str(yaml).unwrap();
        let op = parser.document().channels["/a"].publish.as_ref().unwrap();
        assert_eq!(op.protocol_info.as_ref().unwrap()["flogo-http"]["method"], "PUT");
    }

    #[test]
    fn test_missing_asyncapi_field() {
        let result = AsyncApiParser::from_str("info: {title: T}\n");
        assert!(matches!(result, Err(GeneratorError::Parse(_))));
    }

    #[test]
    fn test_malformed_document() {
        let result = AsyncApiParser::from_str("asyncapi: [unterminated");
        assert!(matches!(result, Err(GeneratorError::Parse(_))));
    }
}
