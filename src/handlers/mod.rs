// handlers/mod.rs - HTTP adapters over the single student handler
//
// Public (no auth) → /, /health
// Students (auth gate) → /api/students[/:id] (id in path), /studentapi/ (id in body)
//
// Both student route groups decode the transport into a CrudRequest and hand
// it to the same StudentHandler, so they cannot drift apart.

pub mod api;
pub mod legacy;
pub mod public;
pub mod student;

use std::sync::Arc;

use axum::body::Bytes;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::middleware::AuthGate;

pub use student::{CrudRequest, StudentHandler};

/// Shared state handed to every route
#[derive(Debug, Clone)]
pub struct AppState {
    pub handler: Arc<StudentHandler>,
    pub gate: AuthGate,
}

/// Decode a request body into a JSON object.
/// An empty body is "no payload"; anything that is not an object is malformed.
pub fn parse_payload(body: &Bytes) -> Result<Option<Map<String, Value>>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    match serde_json::from_slice::<Value>(body)? {
        Value::Object(map) => Ok(Some(map)),
        other => Err(ApiError::invalid_json(format!(
            "Invalid data. Expected a JSON object, but got {}.",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
