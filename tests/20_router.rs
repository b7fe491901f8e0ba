// In-process router tests: requests go through the full middleware stack
// via tower's oneshot, no socket involved.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use student_api::auth::{generate_jwt, AuthPolicy};
use student_api::config::AppConfig;
use student_api::database::{MemoryStore, StudentStore};
use student_api::{app, build_state};

fn router_with(config: &AppConfig) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(config, store.clone()).expect("state");
    (app(state, config), store)
}

async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<&str>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn student_lifecycle() {
    let (router, _) = router_with(&AppConfig::for_tests());

    let (status, body) = call(&router, Method::GET, "/api/students", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/students",
        Some(r#"{"name": "rahim", "roll": 10, "city": "lahore"}"#),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"msg": "data created", "id": 1}));

    let (status, body) = call(&router, Method::GET, "/api/students/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"name": "rahim", "roll": 10, "city": "lahore"}));

    let (status, body) = call(
        &router,
        Method::PATCH,
        "/api/students/1",
        Some(r#"{"city": "karachi"}"#),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"msg": "partial data updated at 1"}));

    let (status, body) = call(
        &router,
        Method::PUT,
        "/api/students/1",
        Some(r#"{"name": "rahim", "roll": 11, "city": "quetta"}"#),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"msg": "data updated at 1"}));

    let (status, body) = call(&router, Method::GET, "/api/students", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"name": "rahim", "roll": 11, "city": "quetta"}]));

    let (status, body) = call(&router, Method::DELETE, "/api/students/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"msg": "Data Deleted Success at 1"}));

    let (status, body) = call(&router, Method::GET, "/api/students/1", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn validation_errors_are_keyed_by_field() {
    let mut config = AppConfig::for_tests();
    config.validation.name_initial = Some('r');
    let (router, store) = router_with(&config);

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/students",
        Some(r#"{"name": "ali", "roll": "ten"}"#),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "name": ["name should start with r"],
            "roll": ["A valid integer is required."],
            "city": ["This field is required."],
        })
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn malformed_json_is_rejected_before_the_store() {
    let (router, store) = router_with(&AppConfig::for_tests());

    let (status, body) = call(&router, Method::POST, "/api/students", Some("{\"name\": "), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn required_auth_rejects_missing_token() {
    let mut config = AppConfig::for_tests();
    config.security.auth_policy = AuthPolicy::Required;
    let (router, store) = router_with(&config);

    let payload = r#"{"name": "rahim", "roll": 10, "city": "lahore"}"#;
    let (status, body) = call(&router, Method::POST, "/api/students", Some(payload), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert!(store.is_empty().await);

    let (status, _) = call(&router, Method::GET, "/api/students", None, Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = generate_jwt("clerk", &config.security.jwt_secret, 1).unwrap();
    let (status, _) = call(&router, Method::POST, "/api/students", Some(payload), Some(&token)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(store.len().await, 1);

    // Public routes stay open
    let (status, _) = call(&router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn read_only_anonymous_allows_reads() {
    let mut config = AppConfig::for_tests();
    config.security.auth_policy = AuthPolicy::ReadOnlyAnonymous;
    let (router, store) = router_with(&config);

    let (status, _) = call(&router, Method::GET, "/api/students", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &router,
        Method::DELETE,
        "/studentapi/",
        Some(r#"{"id": 1}"#),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn non_numeric_id_is_not_found() {
    let (router, _) = router_with(&AppConfig::for_tests());
    let (status, body) = call(&router, Method::GET, "/api/students/abc", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn collection_rejects_put() {
    let (router, _) = router_with(&AppConfig::for_tests());
    let (status, _) = call(&router, Method::PUT, "/api/students", Some("{}"), None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn body_addressed_endpoint() {
    let (router, _) = router_with(&AppConfig::for_tests());

    for (name, roll) in [("rahim", 1), ("subhan", 2)] {
        let payload = json!({"name": name, "roll": roll, "city": "karachi"}).to_string();
        let (status, _) = call(&router, Method::POST, "/studentapi/", Some(&payload), None).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = call(&router, Method::GET, "/studentapi/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (status, body) = call(&router, Method::GET, "/studentapi/", Some(r#"{"id": 2}"#), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "subhan");

    let (status, body) = call(&router, Method::PUT, "/studentapi/", Some(r#"{"city": "x"}"#), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, _) = call(&router, Method::OPTIONS, "/studentapi", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
