//! Per-protocol compilation of fixture documents, plain and secure variants

use asyncapi_flogo_common::{Compilation, FlogoApp, ServiceConfig};
use asyncapi_flogo_parser::{compile_file, CompileOptions};
use serde_json::{json, Value};
use std::path::PathBuf;

fn compile_fixture(name: &str) -> Compilation {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    compile_file(path, &CompileOptions::embedded().unwrap()).unwrap()
}

fn trigger_ids(app: &FlogoApp) -> Vec<&str> {
    app.triggers.iter().map(|t| t.id.as_str()).collect()
}

fn has_import(app: &FlogoApp, import: &str) -> bool {
    app.imports.iter().any(|i| i == import)
}

fn publish_service<'a>(app: &'a FlogoApp, protocol: &str) -> &'a ServiceConfig {
    let resource = app
        .resource(&format!("microgateway:{}Publish", protocol))
        .unwrap();
    assert_eq!(resource.data.services.last().unwrap().name, "log");
    &resource.data.services[0]
}

fn assert_consistent(compilation: &Compilation) {
    let app = &compilation.app;
    assert!(app.dangling_resource_refs().is_empty());
    for resource in &app.resources {
        assert!(resource.data.undeclared_step_services().is_empty());
    }
    assert!(compilation.warnings.is_empty(), "{:?}", compilation.warnings);
}

#[test]
fn test_eftl() {
    let compilation = compile_fixture("eftl.yml");
    assert_consistent(&compilation);
    let app = &compilation.app;

    assert_eq!(trigger_ids(app), vec!["eftl0", "eftlPublish"]);
    let url = "=string.concat('ws://', $property[eftl0_host], ':9191/channel')";

    let trigger = app.trigger("eftl0").unwrap();
    assert_eq!(trigger.reference, "github.com/project-flogo/eftl/trigger");
    assert_eq!(
        Value::Object(trigger.settings.clone()),
        json!({
            "id": "eftl0",
            "url": url,
            "user": "=$env[USER]",
            "password": "=$env[PASSWORD]"
        })
    );

    let handler = &trigger.handlers[0];
    assert_eq!(
        Value::Object(handler.settings.clone()),
        json!({"dest": "sensors_temperature"})
    );
    let input = &handler.actions[0].input;
    assert_eq!(input["channel"], json!("='/sensors/temperature'"));
    assert_eq!(input["message"], json!("=$.content"));
    assert!(!input.contains_key("params"));

    let service = publish_service(app, "eftl");
    assert_eq!(service.name, "eftl-name-sensors/temperature");
    assert_eq!(service.reference, "github.com/project-flogo/eftl/activity");
    assert_eq!(service.description, "eftl service");
    assert_eq!(
        Value::Object(service.settings.clone()),
        json!({
            "id": "eftl/sensors/temperature",
            "url": url,
            "user": "=$env[USER]",
            "password": "=$env[PASSWORD]",
            "dest": "sensors_temperature"
        })
    );

    assert_eq!(
        app.trigger("eftlPublish").unwrap().settings["port"],
        json!(9097)
    );
    assert_eq!(app.property("eftl0_host").unwrap().value, json!("eftl.local"));
    assert_eq!(app.property("eftl0Port").unwrap().value, json!(9191));

    assert!(has_import(
        app,
        "github.com/project-flogo/eftl@v0.0.0-20190709194620-9c397d37ddf5:/trigger"
    ));
    assert!(has_import(
        app,
        "github.com/project-flogo/eftl@v0.0.0-20190709194620-9c397d37ddf5:/activity"
    ));
    assert_eq!(compilation.support.methods, vec!["eftlMethod"]);
}

#[test]
fn test_eftl_secure() {
    let compilation = compile_fixture("eftl-secure.yml");
    assert_consistent(&compilation);
    let app = &compilation.app;

    assert_eq!(trigger_ids(app), vec!["eftl0", "eftlPublish"]);
    assert_eq!(
        Value::Object(app.trigger("eftl0").unwrap().settings.clone()),
        json!({
            "id": "eftl0",
            "url": "=$property[eftl0URL]",
            "ca": "=$env[TRUST_STORE]"
        })
    );

    let service = publish_service(app, "eftl");
    assert_eq!(service.settings["ca"], json!("=$env[TRUST_STORE]"));
    assert!(!service.settings.contains_key("user"));

    assert_eq!(
        app.property("eftl0URL").unwrap().value,
        json!("wss://eftl.local:9291/channel")
    );
    assert_eq!(app.property("eftl0Port").unwrap().value, json!(9291));
}

#[test]
fn test_kafka_secure() {
    let compilation = compile_fixture("kafka-secure.yml");
    assert_consistent(&compilation);
    let app = &compilation.app;

    assert_eq!(trigger_ids(app), vec!["kafka0", "kafkaPublish"]);
    let connection = json!({
        "brokerUrls": "=$property[kafka0URL]",
        "user": "=$env[USER]",
        "password": "=$env[PASSWORD]",
        "trustStore": "=$env[TRUST_STORE]"
    });

    let trigger = app.trigger("kafka0").unwrap();
    assert_eq!(Value::Object(trigger.settings.clone()), connection);
    assert_eq!(trigger.handlers.len(), 1);
    assert_eq!(
        Value::Object(trigger.handlers[0].settings.clone()),
        json!({"topic": "orders.created", "partitions": "0,1", "offset": 3})
    );
    assert_eq!(
        trigger.handlers[0].actions[0].input["message"],
        json!("=$.message")
    );

    let service = publish_service(app, "kafka");
    assert_eq!(service.name, "kafka-name-orders/{orderId}/shipped");
    let mut expected = connection.clone();
    expected["topic"] = json!("orders.:orderId.shipped");
    assert_eq!(Value::Object(service.settings.clone()), expected);

    assert_eq!(app.property("kafka0URL").unwrap().value, json!("kafka.local:9093"));
    assert_eq!(app.property("kafka0Port").unwrap().value, json!(9093));
    assert!(has_import(
        app,
        "github.com/project-flogo/contrib/trigger/kafka@v0.9.1-0.20190603184501-d845e1d612f8"
    ));
    assert!(has_import(
        app,
        "github.com/project-flogo/contrib/activity/kafka@v0.9.1-0.20190516180541-534215f1b7ac"
    ));
}

#[test]
fn test_https() {
    let compilation = compile_fixture("https.yml");
    assert_consistent(&compilation);
    let app = &compilation.app;

    assert_eq!(trigger_ids(app), vec!["http0", "httpPublish"]);

    let trigger = app.trigger("http0").unwrap();
    assert_eq!(
        Value::Object(trigger.settings.clone()),
        json!({
            "port": "=string.integer($property[http0_port])",
            "enableTLS": true,
            "certFile": "=$env[CERT_FILE]",
            "keyFile": "=$env[KEY_FILE]"
        })
    );
    assert_eq!(
        Value::Object(trigger.handlers[0].settings.clone()),
        json!({"path": "/orders/:orderId", "method": "PUT"})
    );

    let service = publish_service(app, "http");
    assert_eq!(
        Value::Object(service.settings.clone()),
        json!({
            "uri": "=string.concat(string.concat('https://api.local:', $property[http0_port], '/v1'), '/orders/:orderId')",
            "method": "POST",
            "headers": {"Content-Type": "application/json"},
            "timeout": 30,
            "sslConfig": {
                "certFile": "=$env[CERT_FILE]",
                "keyFile": "=$env[KEY_FILE]",
                "caFile": "=$env[TRUST_STORE]"
            },
            "skipVerify": false,
            "useSystemCert": false
        })
    );

    assert_eq!(app.property("http0_port").unwrap().value, json!("8443"));
    assert_eq!(app.property("http0_port_1").unwrap().value, json!("9443"));
    assert!(app.property("http0Port").is_none());

    // The server's pinned trigger import is registered before the publish
    // endpoint's unversioned one
    assert_eq!(
        app.imports,
        vec![
            "github.com/project-flogo/contrib/trigger/rest@v0.9.0-rc.1.0.20190509204259-4246269fb68e",
            "github.com/project-flogo/contrib/activity/rest@v0.9.0-rc.1.0.20190509204259-4246269fb68e",
            "github.com/project-flogo/microgateway",
            "github.com/project-flogo/contrib/activity/log",
            "github.com/nareshkumarthota/flogocomponents/activity/methodinvoker",
        ]
    );
}

#[test]
fn test_secure_mqtt_with_verification() {
    let compilation = compile_fixture("secure-mqtt.yml");
    assert_consistent(&compilation);
    let app = &compilation.app;

    assert_eq!(trigger_ids(app), vec!["mqtt0", "mqttPublish"]);

    let trigger = app.trigger("mqtt0").unwrap();
    assert_eq!(
        Value::Object(trigger.settings.clone()),
        json!({
            "id": "mqtt0",
            "broker": "=$property[mqtt0URL]",
            "store": "/var/lib/flogo",
            "autoReconnect": true,
            "sslConfig": {
                "certFile": "=$env[CERT_FILE]",
                "keyFile": "=$env[KEY_FILE]",
                "caFile": "=$env[TRUST_STORE]",
                "skipVerify": false,
                "useSystemCert": false
            }
        })
    );

    let handler = &trigger.handlers[0];
    assert_eq!(
        Value::Object(handler.settings.clone()),
        json!({"topic": "devices/+deviceId/#rest"})
    );
    assert_eq!(handler.actions[0].input["params"], json!("=$.topicParams"));

    let service = publish_service(app, "mqtt");
    assert_eq!(
        Value::Object(service.settings.clone()),
        json!({
            "id": "mqtt0_/devices/{deviceId}/{rest}",
            "broker": "=$property[mqtt0URL]",
            "topic": "devices/:deviceId/:rest",
            "qos": 2,
            "sslConfig": {"certFile": "=$env[CERT_FILE]", "keyFile": "=$env[KEY_FILE]"},
            "skipVerify": false,
            "useSystemCert": true
        })
    );
}
