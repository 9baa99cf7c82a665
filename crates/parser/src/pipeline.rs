//! Microgateway pipeline assembly
//!
//! After a protocol pass, inbound triggers are wired to a pipeline that logs
//! the message and invokes a generated placeholder method. Collected outbound
//! services are exposed through a REST publish endpoint whose pipeline
//! declares them.

use crate::converter::CompileContext;
use crate::protocols::ProtocolProfile;
use asyncapi_flogo_common::{
    ActionConfig, HandlerConfig, Microgateway, ResourceConfig, ServiceConfig, SettingsMap,
    StepConfig, TriggerConfig,
};
use serde_json::{json, Value};
use tracing::debug;

pub const MICROGATEWAY_REF: &str = "github.com/project-flogo/microgateway";
pub const LOG_ACTIVITY_REF: &str = "github.com/project-flogo/contrib/activity/log";
pub const METHOD_INVOKER_REF: &str =
    "github.com/nareshkumarthota/flogocomponents/activity/methodinvoker";
pub const REST_TRIGGER_REF: &str = "github.com/project-flogo/contrib/trigger/rest";

/// Resource id of a pipeline
pub fn resource_id(name: &str) -> String {
    format!("microgateway:{}", name)
}

/// Name of the placeholder method invoked by a protocol's pipeline
pub fn method_name(protocol: &str) -> String {
    format!("{}Method", protocol)
}

/// Action dispatching a handler to a microgateway resource
pub fn gateway_action(resource: &str, input: SettingsMap) -> ActionConfig {
    let mut settings = SettingsMap::new();
    settings.insert("uri".into(), resource.into());
    settings.insert("async".into(), Value::Bool(true));
    ActionConfig {
        reference: MICROGATEWAY_REF.to_string(),
        settings,
        input,
    }
}

fn log_service() -> ServiceConfig {
    ServiceConfig {
        name: "log".to_string(),
        reference: LOG_ACTIVITY_REF.to_string(),
        description: "logging service".to_string(),
        settings: SettingsMap::new(),
    }
}

fn method_invoker_service() -> ServiceConfig {
    ServiceConfig {
        name: "methodinvoker".to_string(),
        reference: METHOD_INVOKER_REF.to_string(),
        description: "invoke a method".to_string(),
        settings: SettingsMap::new(),
    }
}

fn step(service: &str, input: Value) -> StepConfig {
    StepConfig {
        service: service.to_string(),
        input: match input {
            Value::Object(map) => map,
            _ => SettingsMap::new(),
        },
    }
}

/// Append the pipelines for one protocol pass
///
/// `has_triggers` tells whether the pass emitted an inbound trigger;
/// `services` are the outbound services it collected.
pub fn assemble(
    profile: &ProtocolProfile,
    has_triggers: bool,
    services: &[ServiceConfig],
    ctx: &mut CompileContext,
) {
    if has_triggers {
        debug!(protocol = profile.name, "assembling inbound pipeline");
        let method = method_name(profile.name);
        let gateway = Microgateway {
            name: profile.name.to_string(),
            steps: vec![
                step("log", json!({"message": "=$.payload.message"})),
                step(
                    "methodinvoker",
                    json!({"methodName": &method, "inputData": "=$.payload"}),
                ),
            ],
            services: vec![log_service(), method_invoker_service()],
        };
        ctx.app.resources.push(ResourceConfig {
            id: resource_id(profile.name),
            data: gateway,
        });
        ctx.support.add_method(method);
        ctx.imports.register(MICROGATEWAY_REF);
        ctx.imports.register(LOG_ACTIVITY_REF);
        ctx.imports.register(METHOD_INVOKER_REF);
    }

    if services.is_empty() {
        return;
    }

    debug!(
        protocol = profile.name,
        services = services.len(),
        "assembling publish pipeline"
    );
    let name = format!("{}Publish", profile.name);
    let resource = resource_id(&name);

    let mut port = SettingsMap::new();
    port.insert("port".into(), profile.port.into());
    let mut route = SettingsMap::new();
    route.insert("method".into(), "POST".into());
    route.insert("path".into(), "/post".into());

    ctx.app.triggers.push(TriggerConfig {
        id: name.clone(),
        reference: REST_TRIGGER_REF.to_string(),
        settings: port,
        handlers: vec![HandlerConfig {
            settings: route,
            actions: vec![gateway_action(&resource, SettingsMap::new())],
        }],
    });

    let mut declared = services.to_vec();
    declared.push(log_service());
    ctx.app.resources.push(ResourceConfig {
        id: resource,
        data: Microgateway {
            name,
            steps: vec![step("log", json!({"message": "=$.payload.content"}))],
            services: declared,
        },
    });

    ctx.imports.register(MICROGATEWAY_REF);
    ctx.imports.register(LOG_ACTIVITY_REF);
    ctx.imports.register(REST_TRIGGER_REF);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::Protocol;
    use asyncapi_flogo_common::FlogoApp;

    fn context() -> CompileContext {
        CompileContext::new(FlogoApp::new("test", "", "1.0.0", "1.1.0"))
    }

    fn service(name: &str) -> ServiceConfig {
        ServiceConfig {
            name: name.to_string(),
            reference: "github.com/project-flogo/contrib/activity/kafka".to_string(),
            description: "kafka service".to_string(),
            settings: SettingsMap::new(),
        }
    }

    #[test]
    fn test_inbound_pipeline() {
        let mut ctx = context();
        let profile = Protocol::Mqtt.binding().profile();
        assemble(profile, true, &[], &mut ctx);

        let resource = ctx.app.resource("microgateway:mqtt").unwrap();
        let steps: Vec<_> = resource.data.steps.iter().map(|s| s.service.as_str()).collect();
        assert_eq!(steps, vec!["log", "methodinvoker"]);
        assert_eq!(resource.data.steps[1].input["methodName"], "mqttMethod");
        assert!(resource.data.undeclared_step_services().is_empty());
        assert_eq!(ctx.support.methods, vec!["mqttMethod"]);
        assert!(ctx.app.trigger("mqttPublish").is_none());
    }

    #[test]
    fn test_publish_pipeline_copies_services() {
        let mut ctx = context();
        let profile = Protocol::Kafka.binding().profile();
        let collected = vec![service("kafka-name-a"), service("kafka-name-b")];
        assemble(profile, false, &collected, &mut ctx);

        // Collected list is left untouched
        assert_eq!(collected.len(), 2);

        let resource = ctx.app.resource("microgateway:kafkaPublish").unwrap();
        let names: Vec<_> = resource.data.services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["kafka-name-a", "kafka-name-b", "log"]);
        assert_eq!(resource.data.steps.len(), 1);
        assert_eq!(resource.data.steps[0].input["message"], "=$.payload.content");

        let trigger = ctx.app.trigger("kafkaPublish").unwrap();
        assert_eq!(trigger.reference, REST_TRIGGER_REF);
        assert_eq!(trigger.settings["port"], 9096);
        assert_eq!(trigger.handlers[0].settings["path"], "/post");
        assert!(ctx.app.dangling_resource_refs().is_empty());
        assert!(ctx.app.resource("microgateway:kafka").is_none());
        assert!(ctx.support.methods.is_empty());
    }

    #[test]
    fn test_nothing_to_assemble() {
        let mut ctx = context();
        assemble(Protocol::Http.binding().profile(), false, &[], &mut ctx);
        assert!(ctx.app.resources.is_empty());
        assert!(ctx.imports.is_empty());
    }
}
