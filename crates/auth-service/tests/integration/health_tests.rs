//! Integration tests for operational endpoints.

use auth_test_utils::{test_client, TestAuthServer, ALICE_EMAIL, ALICE_PASSWORD};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_health_endpoint() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = test_client()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await?;
    assert_eq!(body, json!({ "status": "healthy", "database": "healthy" }));

    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_is_public() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    // Generate at least one sign-in attempt first
    test_client()
        .post(format!("{}/auth/signin", server.url()))
        .json(&json!({ "email": ALICE_EMAIL, "password": ALICE_PASSWORD }))
        .send()
        .await?;

    let response = test_client()
        .get(format!("{}/metrics", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_404() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = test_client()
        .get(format!("{}/does-not-exist", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}
