//! JSON Schema compilation and component validation.
//!
//! Schemas are authored as YAML (JSON is a subset) and compiled against
//! draft 2020-12. Resolution of external `$ref` targets is not enabled, so
//! a schema reaching outside its own file fails at compile time.

use jsonschema::{Draft, JSONSchema};
use serde_json::{json, Value};

use liteci_core::{Component, Error, Result};

/// Compile one composition's schema document.
pub fn compile(composition: &str, raw: &Value) -> Result<JSONSchema> {
    JSONSchema::options()
        .with_draft(Draft::Draft202012)
        .compile(raw)
        .map_err(|e| Error::SchemaCompile {
            composition: composition.to_string(),
            detail: e.to_string(),
        })
}

/// Validate a component against its composition's compiled schema.
///
/// The validation object mirrors the component's user-facing surface:
/// `{ name, type, inputs, domain, labels }`.
pub fn validate_component(schema: &JSONSchema, component: &Component) -> Result<()> {
    let instance = json!({
        "name": component.name,
        "type": component.type_name,
        "inputs": component.inputs,
        "domain": component.domain,
        "labels": component.labels,
    });

    if let Err(mut errors) = schema.validate(&instance) {
        // Fail fast on the first diagnostic; the pipeline does not collect.
        let detail = match errors.next() {
            Some(e) => format!("{} (at {})", e, e.instance_path),
            None => "schema validation failed".to_string(),
        };
        return Err(Error::SchemaValidation {
            component: component.name.clone(),
            type_name: component.type_name.clone(),
            detail,
        });
    }

    Ok(())
}
