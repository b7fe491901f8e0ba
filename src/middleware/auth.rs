use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{AuthPolicy, Authenticator, Principal};
use crate::error::ApiError;

/// What the auth gate needs: the policy and something that can verify credentials
#[derive(Clone)]
pub struct AuthGate {
    pub policy: AuthPolicy,
    pub authenticator: Option<Arc<dyn Authenticator>>,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("policy", &self.policy)
            .field("authenticator", &self.authenticator.is_some())
            .finish()
    }
}

impl AuthGate {
    pub fn disabled() -> Self {
        Self {
            policy: AuthPolicy::Disabled,
            authenticator: None,
        }
    }

    pub fn new(policy: AuthPolicy, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            policy,
            authenticator: Some(authenticator),
        }
    }

    /// Decide whether the request may proceed and under which principal
    pub fn admit(&self, request: &Request) -> Result<Principal, ApiError> {
        if self.policy == AuthPolicy::Disabled {
            return Ok(Principal::Anonymous);
        }

        let has_credentials = request
            .headers()
            .contains_key(axum::http::header::AUTHORIZATION);

        if !has_credentials && self.policy.allows_anonymous(request.method()) {
            return Ok(Principal::Anonymous);
        }

        let authenticator = self.authenticator.as_ref().ok_or_else(|| {
            tracing::error!("Auth policy {:?} is active but no authenticator is configured", self.policy);
            ApiError::internal_server_error("Authentication is not available")
        })?;

        Ok(authenticator.authenticate(request.headers())?)
    }
}

/// Rejects unauthenticated requests before they reach a handler.
/// The admitted principal is injected into request extensions.
pub async fn auth_gate_middleware(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.admit(&request) {
        Ok(principal) => {
            tracing::debug!(
                "{} {} admitted as {}",
                request.method(),
                request.uri().path(),
                principal.subject()
            );
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!(
                "{} {} rejected: {}",
                request.method(),
                request.uri().path(),
                err
            );
            err.into_response()
        }
    }
}
