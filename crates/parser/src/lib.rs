//! AsyncAPI loading and protocol binding compilation
//!
//! This crate turns an AsyncAPI document into a Flogo application
//! descriptor (`FlogoApp`).
//!
//! ## Compilation Strategy
//!
//! Protocols are compiled in a fixed order of passes (Kafka, eFTL, MQTT,
//! WebSocket, HTTP). Each pass:
//! - registers properties for the URL variables of matching servers
//! - emits one trigger per server, with a handler per inbound channel
//! - collects a service per outbound channel
//! - assembles the microgateway pipelines linking them together
//!
//! All passes write into one `CompileContext`, whose property and import
//! registries keep the first registration of any key.

pub mod asyncapi;
pub mod binding_info;
pub mod converter;
pub mod pipeline;
pub mod protocols;

pub use asyncapi::{AsyncApiDocument, AsyncApiParser};
pub use binding_info::{
    ChannelParameter, HttpBindingInfo, KafkaBindingInfo, MqttBindingInfo, OperationBindings,
    ServerExtensions,
};
pub use converter::{compile, CompileContext, CompileOptions, Role};
pub use protocols::{Protocol, ProtocolBinding, ProtocolProfile, Settings};

use asyncapi_flogo_common::{Compilation, Result};
use std::path::Path;

/// Load and compile an AsyncAPI document
///
/// # Arguments
/// * `path` - AsyncAPI document (YAML or JSON)
/// * `options` - Role and module catalog to compile with
pub fn compile_file<P: AsRef<Path>>(path: P, options: &CompileOptions) -> Result<Compilation> {
    AsyncApiParser::from_file(path)?.compile(options)
}
