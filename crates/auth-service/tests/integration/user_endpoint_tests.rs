//! Integration tests for the protected user endpoints.

use auth_test_utils::{
    test_client, TestAuthServer, ALICE_EMAIL, ALICE_NAME, ALICE_PASSWORD, BOB_EMAIL, BOB_NAME,
    BOB_PASSWORD,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_create_user_with_token() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server
        .create_user(ALICE_NAME, ALICE_EMAIL, ALICE_PASSWORD)
        .await?;
    let token = server.create_token(ALICE_EMAIL)?;

    let response = test_client()
        .post(format!("{}/users", server.url()))
        .bearer_auth(&token)
        .json(&json!({ "name": BOB_NAME, "email": BOB_EMAIL, "password": BOB_PASSWORD }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created: Value = response.json().await?;
    assert_eq!(created["name"], BOB_NAME);
    assert!(created.get("password").is_none());

    // The new user can sign in
    let response = test_client()
        .post(format!("{}/auth/signin", server.url()))
        .json(&json!({ "email": BOB_EMAIL, "password": BOB_PASSWORD }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_list_users_is_ordered_and_omits_secrets() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server
        .create_user(ALICE_NAME, ALICE_EMAIL, ALICE_PASSWORD)
        .await?;
    server.create_user(BOB_NAME, BOB_EMAIL, BOB_PASSWORD).await?;
    let token = server.create_token(ALICE_EMAIL)?;

    let response = test_client()
        .get(format!("{}/users", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.text().await?;
    assert!(!body.contains(ALICE_PASSWORD));
    assert!(!body.contains(BOB_PASSWORD));

    let users: Vec<Value> = serde_json::from_str(&body)?;
    let emails: Vec<&str> = users.iter().filter_map(|u| u["email"].as_str()).collect();
    assert_eq!(emails, vec![ALICE_EMAIL, BOB_EMAIL]);

    Ok(())
}

#[tokio::test]
async fn test_create_user_validation() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server.create_token(ALICE_EMAIL)?;

    let response = test_client()
        .post(format!("{}/users", server.url()))
        .bearer_auth(&token)
        .json(&json!({ "name": "", "email": "nobody", "password": "x" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.user_count().await?, 0);

    Ok(())
}
