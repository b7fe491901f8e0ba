use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
};
use serde_json::Value;

use crate::auth::Principal;
use crate::error::ApiError;
use crate::middleware::ApiResult;
use crate::student::StudentId;
use crate::types::Verb;

use super::{parse_payload, AppState, CrudRequest};

/// Ids that do not parse can never match a record
fn parse_path_id(raw: &str) -> Result<StudentId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found(format!("Student {} not found", raw)))
}

fn principal_of(principal: Option<Extension<Principal>>) -> Principal {
    principal.map(|Extension(p)| p).unwrap_or(Principal::Anonymous)
}

async fn dispatch(
    state: &AppState,
    verb: Verb,
    id: Option<StudentId>,
    body: Option<&Bytes>,
    principal: Option<Extension<Principal>>,
) -> ApiResult<Value> {
    let payload = match body {
        Some(bytes) => parse_payload(bytes)?,
        None => None,
    };
    let request = CrudRequest::new(verb, id, payload).with_principal(principal_of(principal));
    state.handler.handle(request).await
}

/// GET /api/students - List all students
pub async fn list(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
) -> ApiResult<Value> {
    dispatch(&state, Verb::Get, None, None, principal).await
}

/// POST /api/students - Create a student
pub async fn create(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    body: Bytes,
) -> ApiResult<Value> {
    dispatch(&state, Verb::Post, None, Some(&body), principal).await
}

/// GET /api/students/:id - Show a single student
pub async fn retrieve(
    State(state): State<AppState>,
    Path(id): Path<String>,
    principal: Option<Extension<Principal>>,
) -> ApiResult<Value> {
    let id = parse_path_id(&id)?;
    dispatch(&state, Verb::Get, Some(id), None, principal).await
}

/// PUT /api/students/:id - Replace a student
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    principal: Option<Extension<Principal>>,
    body: Bytes,
) -> ApiResult<Value> {
    let id = parse_path_id(&id)?;
    dispatch(&state, Verb::Put, Some(id), Some(&body), principal).await
}

/// PATCH /api/students/:id - Change some fields of a student
pub async fn partial_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    principal: Option<Extension<Principal>>,
    body: Bytes,
) -> ApiResult<Value> {
    let id = parse_path_id(&id)?;
    dispatch(&state, Verb::Patch, Some(id), Some(&body), principal).await
}

/// DELETE /api/students/:id - Remove a student
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    principal: Option<Extension<Principal>>,
) -> ApiResult<Value> {
    let id = parse_path_id(&id)?;
    dispatch(&state, Verb::Delete, Some(id), None, principal).await
}
