mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn create_read_patch_delete_over_http() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/students"))
        .json(&json!({"name": "rahim", "roll": 10, "city": "lahore"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = res.json::<Value>().await?;
    assert_eq!(created["msg"], "data created");
    let id = created["id"].as_i64().expect("created id");

    let fetched = client
        .get(server.url(&format!("/api/students/{}", id)))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(fetched, json!({"name": "rahim", "roll": 10, "city": "lahore"}));

    let res = client
        .patch(server.url(&format!("/api/students/{}", id)))
        .json(&json!({"city": "karachi"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let fetched = client
        .get(server.url(&format!("/api/students/{}", id)))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(fetched, json!({"name": "rahim", "roll": 10, "city": "karachi"}));

    let res = client.delete(server.url(&format!("/api/students/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(server.url(&format!("/api/students/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn body_addressed_endpoint_reads_id_from_json() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let created = client
        .post(server.url("/studentapi/"))
        .json(&json!({"name": "subhan", "roll": 104, "city": "karachi"}))
        .send()
        .await?
        .json::<Value>()
        .await?;
    let id = created["id"].as_i64().expect("created id");

    let fetched = client
        .get(server.url("/studentapi/"))
        .json(&json!({"id": id}))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(fetched["name"], "subhan");

    // No id in the body lists everything
    let listed = client.get(server.url("/studentapi/")).send().await?.json::<Value>().await?;
    assert!(listed.as_array().map(|rows| !rows.is_empty()).unwrap_or(false), "{}", listed);

    let res = client
        .delete(server.url("/studentapi/"))
        .json(&json!({"id": id}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .delete(server.url("/studentapi/"))
        .json(&json!({"id": id}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn invalid_create_returns_field_errors() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/students"))
        .json(&json!({"name": "rahim"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(
        body,
        json!({"city": ["This field is required."], "roll": ["This field is required."]})
    );
    Ok(())
}
