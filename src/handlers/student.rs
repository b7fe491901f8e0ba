use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::auth::Principal;
use crate::config::PutPolicy;
use crate::database::StudentStore;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::student::{Student, StudentId, Validator};
use crate::types::{Operation, Verb};

/// One incoming request, already stripped of transport details
#[derive(Debug, Clone)]
pub struct CrudRequest {
    pub verb: Verb,
    pub id: Option<StudentId>,
    pub payload: Option<Map<String, Value>>,
    pub principal: Principal,
}

impl CrudRequest {
    pub fn new(verb: Verb, id: Option<StudentId>, payload: Option<Map<String, Value>>) -> Self {
        Self {
            verb,
            id,
            payload,
            principal: Principal::Anonymous,
        }
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = principal;
        self
    }
}

/// Orchestrates validation and persistence for every student request.
///
/// Each request does at most one store read followed by at most one store
/// write, and writes happen only after validation succeeded.
pub struct StudentHandler {
    store: Arc<dyn StudentStore>,
    validator: Validator,
    put_policy: PutPolicy,
}

impl std::fmt::Debug for StudentHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudentHandler")
            .field("validator", &self.validator)
            .field("put_policy", &self.put_policy)
            .finish_non_exhaustive()
    }
}

impl StudentHandler {
    pub fn new(store: Arc<dyn StudentStore>, validator: Validator, put_policy: PutPolicy) -> Self {
        Self {
            store,
            validator,
            put_policy,
        }
    }

    pub fn store(&self) -> &Arc<dyn StudentStore> {
        &self.store
    }

    /// Map (verb, id presence) to the operation it performs.
    /// A missing id on GET means "list all"; POST never addresses an id.
    pub fn resolve(verb: Verb, id: Option<StudentId>) -> Result<Operation, ApiError> {
        let operation = match (verb, id) {
            (Verb::Get, Some(_)) => Operation::Retrieve,
            (Verb::Get, None) => Operation::List,
            (Verb::Post, _) => Operation::Create,
            (Verb::Put, _) => Operation::Update,
            (Verb::Patch, _) => Operation::PartialUpdate,
            (Verb::Delete, _) => Operation::Destroy,
        };

        if operation.requires_id() && id.is_none() {
            return Err(ApiError::bad_request(format!(
                "{} requires a student id",
                verb.as_str()
            )));
        }
        Ok(operation)
    }

    pub async fn handle(&self, request: CrudRequest) -> ApiResult<Value> {
        let operation = Self::resolve(request.verb, request.id)?;
        let principal = &request.principal;
        if operation.is_write() {
            tracing::info!(
                "{:?} student {:?} by {} (authenticated: {})",
                operation,
                request.id,
                principal.subject(),
                principal.is_authenticated()
            );
        } else {
            tracing::debug!("{:?} student {:?} by {}", operation, request.id, principal.subject());
        }

        let id = request.id;
        let payload = request.payload.unwrap_or_default();

        match (operation, id) {
            (Operation::List, _) => self.list().await,
            (Operation::Create, _) => self.create(&payload).await,
            (Operation::Retrieve, Some(id)) => self.retrieve(id).await,
            (Operation::Update, Some(id)) => match self.put_policy {
                PutPolicy::Full => self.update(id, &payload, false, "data updated at").await,
                PutPolicy::Partial => self.update(id, &payload, true, "partial data updated at").await,
            },
            (Operation::PartialUpdate, Some(id)) => {
                self.update(id, &payload, true, "partial data updated at").await
            }
            (Operation::Destroy, Some(id)) => self.destroy(id).await,
            // resolve() guarantees an id for the remaining operations
            (_, None) => Err(ApiError::bad_request("student id required")),
        }
    }

    async fn list(&self) -> ApiResult<Value> {
        let students = self.store.list().await?;
        Ok(ApiResponse::success(json!(students)))
    }

    async fn retrieve(&self, id: StudentId) -> ApiResult<Value> {
        let student = self.fetch(id).await?;
        Ok(ApiResponse::success(json!(student)))
    }

    async fn create(&self, payload: &Map<String, Value>) -> ApiResult<Value> {
        let fields = self
            .validator
            .validate(payload, None, false)
            .map_err(ApiError::validation_error)?;

        let student = self.store.create(fields).await?;
        tracing::info!("Created student {}", student.id);

        Ok(ApiResponse::created(json!({
            "msg": "data created",
            "id": student.id
        })))
    }

    async fn update(
        &self,
        id: StudentId,
        payload: &Map<String, Value>,
        partial: bool,
        ack: &str,
    ) -> ApiResult<Value> {
        let existing = self.fetch(id).await?;
        let fields = self
            .validator
            .validate(payload, Some(&existing), partial)
            .map_err(ApiError::validation_error)?;

        // The record may have been deleted between the read and the write
        self.store
            .update(id, fields)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!("Updated student {} (partial: {})", id, partial);

        Ok(ApiResponse::success(json!({ "msg": format!("{} {}", ack, id) })))
    }

    async fn destroy(&self, id: StudentId) -> ApiResult<Value> {
        self.fetch(id).await?;
        if !self.store.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!("Deleted student {}", id);

        Ok(ApiResponse::success(json!({
            "msg": format!("Data Deleted Success at {}", id)
        })))
    }

    async fn fetch(&self, id: StudentId) -> Result<Student, ApiError> {
        self.store.get(id).await?.ok_or_else(|| not_found(id))
    }
}

fn not_found(id: StudentId) -> ApiError {
    ApiError::not_found(format!("Student {} not found", id))
}
