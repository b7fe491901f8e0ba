// Body-addressed endpoint: one URL for every verb, the record id travels in
// the JSON body as {"id": <int>}. Serves clients that predate /api/students.

use axum::{
    body::Bytes,
    extract::{Extension, State},
    http::Method,
};
use serde_json::{Map, Value};

use crate::auth::Principal;
use crate::error::ApiError;
use crate::middleware::ApiResult;
use crate::student::StudentId;
use crate::types::Verb;

use super::{parse_payload, AppState, CrudRequest};

/// Read the optional id from a body payload. `null` counts as absent.
pub fn body_id(payload: Option<&Map<String, Value>>) -> Result<Option<StudentId>, ApiError> {
    let Some(raw) = payload.and_then(|p| p.get("id")) else {
        return Ok(None);
    };

    match raw {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| ApiError::bad_request("id must be an integer")),
        Value::String(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ApiError::bad_request("id must be an integer")),
        _ => Err(ApiError::bad_request("id must be an integer")),
    }
}

/// ANY /studentapi/ - Dispatch on the HTTP method, id taken from the body
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    principal: Option<Extension<Principal>>,
    body: Bytes,
) -> ApiResult<Value> {
    let verb = Verb::from_method(&method)
        .ok_or_else(|| ApiError::method_not_allowed(format!("Method \"{}\" not allowed.", method)))?;

    let payload = parse_payload(&body)?;
    // Create never addresses an existing record, so a stray id is ignored
    let id = match verb {
        Verb::Post => None,
        _ => body_id(payload.as_ref())?,
    };

    let principal = principal.map(|Extension(p)| p).unwrap_or(Principal::Anonymous);
    let request = CrudRequest::new(verb, id, payload).with_principal(principal);
    state.handler.handle(request).await
}
