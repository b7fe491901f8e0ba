/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Request verbs understood by the student handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    /// Map an HTTP method onto a handler verb. Unsupported methods yield None.
    pub fn from_method(method: &axum::http::Method) -> Option<Self> {
        use axum::http::Method;

        match *method {
            Method::GET => Some(Verb::Get),
            Method::POST => Some(Verb::Post),
            Method::PUT => Some(Verb::Put),
            Method::PATCH => Some(Verb::Patch),
            Method::DELETE => Some(Verb::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
        }
    }
}

/// Record store operations a request resolves to.
/// Resolved from (verb, presence of id) by the student handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Destroy,
}

impl Operation {
    /// Whether the operation needs the id of an existing record
    pub fn requires_id(&self) -> bool {
        !matches!(self, Operation::List | Operation::Create)
    }

    /// Whether the operation writes to the record store
    pub fn is_write(&self) -> bool {
        !matches!(self, Operation::List | Operation::Retrieve)
    }
}
