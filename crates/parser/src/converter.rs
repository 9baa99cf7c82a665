//! Compiles an AsyncAPI document into a Flogo application
//!
//! Protocols are lowered one pass at a time in [`Protocol::ALL`] order. Each
//! pass walks every server speaking that protocol, registers the server's
//! properties, builds one trigger per server with a handler per inbound
//! channel, collects outbound services, and finally hands off to the
//! pipeline assembler.

use crate::asyncapi::{AsyncApiDocument, Channel, Operation, Server};
use crate::binding_info::{ChannelParameter, OperationBindings, ServerExtensions};
use crate::pipeline;
use crate::protocols::{Protocol, ProtocolBinding, Settings};
use asyncapi_flogo_common::{
    extract_port_template, parse_template, Compilation, FlogoApp, GeneratorError, HandlerConfig,
    ImportRegistry, ModuleCatalog, ParsedTemplate, PropertyAttribute, PropertyRegistry, Result,
    Segment, ServiceConfig, SettingsMap, SupportCode, TriggerConfig,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Which side of the channels the generated application plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// Subscribe operations are inbound, publish operations outbound
    #[default]
    Server,
    /// Operations are inverted
    Client,
}

impl Role {
    fn inbound(&self) -> OperationKind {
        match self {
            Role::Server => OperationKind::Subscribe,
            Role::Client => OperationKind::Publish,
        }
    }

    fn outbound(&self) -> OperationKind {
        match self {
            Role::Server => OperationKind::Publish,
            Role::Client => OperationKind::Subscribe,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum OperationKind {
    Subscribe,
    Publish,
}

impl OperationKind {
    fn of<'a>(&self, channel: &'a Channel) -> Option<&'a Operation> {
        match self {
            OperationKind::Subscribe => channel.subscribe.as_ref(),
            OperationKind::Publish => channel.publish.as_ref(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            OperationKind::Subscribe => "subscribe",
            OperationKind::Publish => "publish",
        }
    }
}

/// Options controlling a compilation
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub role: Role,
    /// Module versions used to pin protocol imports
    pub catalog: ModuleCatalog,
    pub app_version: String,
    pub app_model: String,
}

impl CompileOptions {
    pub fn new(catalog: ModuleCatalog) -> Self {
        Self {
            role: Role::Server,
            catalog,
            app_version: "1.0.0".to_string(),
            app_model: "1.1.0".to_string(),
        }
    }

    /// Options using the embedded module catalog
    pub fn embedded() -> Result<Self> {
        Ok(Self::new(ModuleCatalog::embedded()?))
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// Mutable state shared by every protocol pass
#[derive(Debug)]
pub struct CompileContext {
    pub app: FlogoApp,
    pub properties: PropertyRegistry,
    pub imports: ImportRegistry,
    pub support: SupportCode,
    pub warnings: Vec<String>,
    /// Operation binding info, decoded once per operation
    bindings: BTreeMap<(String, OperationKind), OperationBindings>,
}

impl CompileContext {
    pub fn new(app: FlogoApp) -> Self {
        Self {
            app,
            properties: PropertyRegistry::new(),
            imports: ImportRegistry::new(),
            support: SupportCode::default(),
            warnings: Vec::new(),
            bindings: BTreeMap::new(),
        }
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }

    /// Binding info of an operation
    ///
    /// Every protocol pass looks at the same operations; decoding problems are
    /// reported on first use only.
    fn operation_bindings(
        &mut self,
        channel: &str,
        kind: OperationKind,
        operation: &Operation,
    ) -> OperationBindings {
        let key = (channel.to_string(), kind);
        if let Some(bindings) = self.bindings.get(&key) {
            return bindings.clone();
        }
        let owner = format!("{} operation of channel {}", kind.name(), channel);
        let bindings = OperationBindings::decode(
            &owner,
            operation.protocol_info.as_ref(),
            &mut self.warnings,
        );
        self.bindings.insert(key, bindings.clone());
        bindings
    }

    /// Move the registries into the application
    pub fn finish(self) -> Compilation {
        let mut warnings = self.warnings;
        warnings.extend(self.properties.conflicts().iter().cloned());

        let mut app = self.app;
        app.properties = self.properties.into_properties();
        app.imports = self.imports.into_imports();

        Compilation {
            app,
            support: self.support,
            warnings,
        }
    }
}

/// Compile a document with every protocol binding
pub fn compile(document: &AsyncApiDocument, options: &CompileOptions) -> Result<Compilation> {
    let description = document.info.description.clone().unwrap_or_default();
    let app = FlogoApp::new(
        &document.app_name(),
        &description,
        &options.app_version,
        &options.app_model,
    );
    let mut ctx = CompileContext::new(app);

    for (server_name, server) in document.servers.entries() {
        if Protocol::from_identifier(&server.protocol).is_none() {
            ctx.warn(format!(
                "server {}: protocol {} is not supported, skipping",
                server_name, server.protocol
            ));
        }
    }

    for protocol in Protocol::ALL {
        lower_protocol(protocol.binding(), document, options, &mut ctx)?;
    }

    let compilation = ctx.finish();
    debug!(
        triggers = compilation.app.triggers.len(),
        resources = compilation.app.resources.len(),
        properties = compilation.app.properties.len(),
        "compilation finished"
    );
    Ok(compilation)
}

/// Run one protocol pass
pub fn lower_protocol(
    binding: &dyn ProtocolBinding,
    document: &AsyncApiDocument,
    options: &CompileOptions,
    ctx: &mut CompileContext,
) -> Result<()> {
    let profile = binding.profile();
    let mut services: Vec<ServiceConfig> = Vec::new();
    let mut has_triggers = false;

    for (index, (server_name, server)) in document.servers.entries().into_iter().enumerate() {
        if !profile.matches(&server.protocol) {
            continue;
        }
        debug!(server = %server_name, protocol = profile.name, "compiling server");

        let extensions = ServerExtensions::decode(
            &format!("server {}", server_name),
            &server.extensions,
            profile.connection_extensions,
        )?;
        let prefix = format!("{}{}", profile.name, index);

        register_variables(&prefix, server, ctx);
        let url = resolve_url(&prefix, &server_name, server, ctx);

        let mut settings = Settings::new(profile.name, index, url);
        settings.port = resolve_port(&prefix, server, ctx)?;
        settings.secure = server.protocol == profile.secure;
        settings.user_password = document.uses_user_password(server);
        settings.extensions = extensions;

        let mut trigger = TriggerConfig {
            id: prefix.clone(),
            reference: profile.trigger_ref.to_string(),
            settings: binding.trigger_settings(&settings),
            handlers: Vec::new(),
        };
        let mut server_services = 0;

        for (channel_name, channel) in &document.channels {
            settings.topic = resolve_topic(channel_name, server.base_channel.as_deref());
            settings.parameters = channel
                .parameters
                .entries()
                .into_iter()
                .map(|(name, parameter)| ChannelParameter::decode(channel_name, &name, parameter))
                .collect::<Result<_>>()?;

            let inbound = options.role.inbound();
            if let Some(operation) = inbound.of(channel) {
                debug!(channel = %channel_name, topic = %settings.topic, "adding handler");
                settings.binding_info = ctx.operation_bindings(channel_name, inbound, operation);

                let mut input = SettingsMap::new();
                input.insert("channel".into(), format!("='{}'", settings.topic).into());
                input.insert("message".into(), format!("=$.{}", profile.content_path).into());
                if let Some(params) = profile.params_path {
                    input.insert("params".into(), format!("=$.{}", params).into());
                }

                trigger.handlers.push(HandlerConfig {
                    settings: binding.handler_settings(&settings),
                    actions: vec![pipeline::gateway_action(
                        &pipeline::resource_id(profile.name),
                        input,
                    )],
                });
            }

            let outbound = options.role.outbound();
            if let (Some(operation), Some(activity)) = (outbound.of(channel), profile.activity_ref)
            {
                debug!(channel = %channel_name, "adding service");
                settings.binding_info = ctx.operation_bindings(channel_name, outbound, operation);
                services.push(ServiceConfig {
                    name: format!("{}-name-{}", profile.name, channel_name),
                    reference: activity.to_string(),
                    description: format!("{} service", profile.name),
                    settings: binding.service_settings(&settings),
                });
                server_services += 1;
            }
        }

        if !trigger.handlers.is_empty() {
            let version = settings
                .extensions
                .trigger_version
                .as_deref()
                .or_else(|| options.catalog.trigger_version(profile.name));
            ctx.imports.register(profile.trigger_import_for(version));
            ctx.app.triggers.push(trigger);
            has_triggers = true;
        } else {
            debug!(server = %server_name, "no inbound channels, trigger omitted");
        }

        if server_services > 0 {
            let version = settings
                .extensions
                .activity_version
                .as_deref()
                .or_else(|| options.catalog.activity_version(profile.name));
            if let Some(import) = profile.activity_import_for(version) {
                ctx.imports.register(import);
            }
        }
    }

    pipeline::assemble(profile, has_triggers, &services, ctx);
    Ok(())
}

/// Register one property per variable value
///
/// The default value is named `<prefix>_<var>`; other enum values get their
/// position appended.
fn register_variables(prefix: &str, server: &Server, ctx: &mut CompileContext) {
    for (name, variable) in &server.variables {
        let mut found_default = false;
        for (j, value) in variable.enum_values.iter().enumerate() {
            if variable.default.as_deref() == Some(value.as_str()) {
                found_default = true;
                ctx.properties
                    .register(PropertyAttribute::string(format!("{}_{}", prefix, name), value));
            } else {
                ctx.properties.register(PropertyAttribute::string(
                    format!("{}_{}_{}", prefix, name, j),
                    value,
                ));
            }
        }
        if !found_default {
            ctx.properties.register(PropertyAttribute::string(
                format!("{}_{}", prefix, name),
                variable.default.clone().unwrap_or_default(),
            ));
        }
    }
}

fn property_ref(prefix: &str, variable: &str) -> String {
    format!("$property[{}_{}]", prefix, variable)
}

/// Comma-separated `string.concat` arguments for a template
fn concat_arguments(prefix: &str, template: &ParsedTemplate) -> String {
    template
        .segments
        .iter()
        .map(|segment| match segment {
            Segment::Literal(value) => format!("'{}'", value),
            Segment::Variable(name) => property_ref(prefix, name),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn resolve_url(
    prefix: &str,
    server_name: &str,
    server: &Server,
    ctx: &mut CompileContext,
) -> String {
    let template = parse_template(&server.url);
    if !template.has_variable {
        let property = format!("{}URL", prefix);
        ctx.properties
            .register(PropertyAttribute::string(&property, &server.url));
        return format!("=$property[{}]", property);
    }

    let undeclared: Vec<String> = template
        .variables()
        .filter(|name| !server.variables.contains_key(*name))
        .map(String::from)
        .collect();
    for name in undeclared {
        ctx.warn(format!(
            "server {}: url variable {} is not declared",
            server_name, name
        ));
    }

    match template.segments.as_slice() {
        [Segment::Variable(name)] => format!("={}", property_ref(prefix, name)),
        _ => format!("=string.concat({})", concat_arguments(prefix, &template)),
    }
}

fn resolve_port(prefix: &str, server: &Server, ctx: &mut CompileContext) -> Result<Option<String>> {
    let template = extract_port_template(&server.url);
    if template.is_empty() {
        return Ok(None);
    }

    if template.has_variable {
        let expression = match template.segments.as_slice() {
            [Segment::Variable(name)] => property_ref(prefix, name),
            _ => format!("string.concat({})", concat_arguments(prefix, &template)),
        };
        return Ok(Some(format!("=string.integer({})", expression)));
    }

    let literal = template.literal_text();
    let port: i64 = literal
        .trim()
        .parse()
        .map_err(|_| GeneratorError::InvalidPort {
            url: server.url.clone(),
            port: literal.clone(),
        })?;
    let property = format!("{}Port", prefix);
    ctx.properties
        .register(PropertyAttribute::integer(&property, port));
    Ok(Some(format!("=$property[{}]", property)))
}

/// Topic for a channel, always starting with `/`
///
/// # Examples
/// ```
/// use asyncapi_flogo_parser::converter::resolve_topic;
///
/// assert_eq!(resolve_topic("/orders", Some("base")), "/orders");
/// assert_eq!(resolve_topic("orders", Some("/base/")), "/base/orders");
/// assert_eq!(resolve_topic("orders", None), "/orders");
/// ```
pub fn resolve_topic(channel: &str, base: Option<&str>) -> String {
    if channel.starts_with('/') {
        return channel.to_string();
    }
    match base.map(|b| b.trim_matches('/')).filter(|b| !b.is_empty()) {
        Some(base) => format!("/{}/{}", base, channel),
        None => format!("/{}", channel),
    }
}
