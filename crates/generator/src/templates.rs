//! Template loading and management

use asyncapi_flogo_common::{GeneratorError, ImportRegistry, Result};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    // Register custom filters
    tera.register_filter("go_string", go_string_filter);
    tera.register_filter("go_raw_string", go_raw_string_filter);
    tera.register_filter("go_import_path", go_import_path_filter);

    tera.add_raw_template("app.go", include_str!("../templates/app.go.tera"))
        .map_err(|e| GeneratorError::Generation(format!("Failed to load app.go template: {}", e)))?;

    tera.add_raw_template("support.go", include_str!("../templates/support.go.tera"))
        .map_err(|e| {
            GeneratorError::Generation(format!("Failed to load support.go template: {}", e))
        })?;

    Ok(tera)
}

fn expect_str<'a>(value: &'a Value, filter: &str) -> tera::Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("{} filter expects a string", filter)))
}

/// Filter to quote a string as a Go interpreted string literal
fn go_string_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = expect_str(value, "go_string")?;
    // JSON string escapes are a subset of Go's
    let quoted = serde_json::to_string(s).map_err(tera::Error::json)?;
    Ok(Value::String(quoted))
}

/// Filter to quote a string as a Go raw string literal
///
/// Backticks cannot appear inside a raw literal, so they are spliced in as
/// interpreted strings.
fn go_raw_string_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = expect_str(value, "go_raw_string")?;
    Ok(Value::String(format!("`{}`", s.replace('`', "` + \"`\" + `"))))
}

/// Filter to turn a versioned import into a Go package path
fn go_import_path_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = expect_str(value, "go_import_path")?;
    Ok(Value::String(ImportRegistry::key(s)))
}
