use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{any, get},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{AuthError, AuthPolicy, JwtAuthenticator};
use crate::config::AppConfig;
use crate::database::StudentStore;
use crate::handlers::{api, legacy, public, AppState, StudentHandler};
use crate::middleware::{auth_gate_middleware, AuthGate};
use crate::student::Validator;

/// Wire the handler, validator and auth gate described by the configuration
pub fn build_state(config: &AppConfig, store: Arc<dyn StudentStore>) -> Result<AppState, AuthError> {
    let validator = Validator::from_config(&config.validation);
    let handler = StudentHandler::new(store, validator, config.api.put_policy);

    let gate = match config.security.auth_policy {
        AuthPolicy::Disabled => AuthGate::disabled(),
        policy => {
            let authenticator = JwtAuthenticator::new(&config.security.jwt_secret)?;
            AuthGate::new(policy, Arc::new(authenticator))
        }
    };

    Ok(AppState {
        handler: Arc::new(handler),
        gate,
    })
}

/// The complete route table. Built once at startup and owned by the server.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let students = Router::new()
        .route("/api/students", get(api::list).post(api::create))
        .route(
            "/api/students/:id",
            get(api::retrieve)
                .put(api::update)
                .patch(api::partial_update)
                .delete(api::destroy),
        )
        .route("/studentapi", any(legacy::dispatch))
        .route("/studentapi/", any(legacy::dispatch))
        .route_layer(middleware::from_fn_with_state(
            state.gate.clone(),
            auth_gate_middleware,
        ));

    let mut router = Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(students)
        .layer(DefaultBodyLimit::max(config.server.max_request_size_bytes))
        .with_state(state);

    if config.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    if config.server.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    #[test]
    fn auth_policy_without_secret_fails_to_build() {
        let mut config = AppConfig::for_tests();
        config.security.auth_policy = AuthPolicy::Required;
        config.security.jwt_secret = String::new();
        let err = build_state(&config, Arc::new(MemoryStore::new())).unwrap_err();
        assert_eq!(err, AuthError::InvalidSecret);
    }

    #[test]
    fn disabled_policy_needs_no_secret() {
        let mut config = AppConfig::for_tests();
        config.security.jwt_secret = String::new();
        let state = build_state(&config, Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(state.gate.policy, AuthPolicy::Disabled);
    }
}
