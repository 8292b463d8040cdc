//! Project-specific utilities live here.

use serde_json::{json, Value};

/// Formats a shared log prefix for project logs.
pub fn log_prefix(module: &str) -> String {
    format!("libris::{module}")
}

/// OpenAPI response object with a JSON body.
pub fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

/// OpenAPI response object carrying the shared error envelope.
pub fn error_response(description: &str) -> Value {
    json_response(
        description,
        json!({ "$ref": "#/components/schemas/ErrorResponse" }),
    )
}

/// `$ref` to a component schema.
pub fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

/// Array of a component schema.
pub fn array_of(name: &str) -> Value {
    json!({ "type": "array", "items": schema_ref(name) })
}

/// Request body object for a component schema.
pub fn json_body(name: &str) -> Value {
    json!({
        "required": true,
        "content": { "application/json": { "schema": schema_ref(name) } }
    })
}

/// Integer path parameter named `id`.
pub fn id_parameter() -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int32", "minimum": 1 }
    })
}
