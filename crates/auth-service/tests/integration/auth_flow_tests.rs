//! End-to-end sign-up, sign-in and protected access over real HTTP.

use auth_service::config::SecretPolicy;
use auth_test_utils::{
    test_client, TestAuthServer, TokenAssertions, ALICE_EMAIL, ALICE_NAME, ALICE_PASSWORD,
    BOB_EMAIL, TEST_TOKEN_TTL_SECONDS,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn sign_in(
    server: &TestAuthServer,
    email: &str,
    password: &str,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(test_client()
        .post(format!("{}/auth/signin", server.url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?)
}

// ============================================================================
// Full scenario
// ============================================================================

/// Sign up, sign in, use the token, then fail with a wrong secret and with no
/// token at all.
#[tokio::test]
async fn test_sign_up_sign_in_and_access_users() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let client = test_client();

    // Sign up
    let response = client
        .post(format!("{}/auth/signup", server.url()))
        .json(&json!({
            "name": ALICE_NAME,
            "email": ALICE_EMAIL,
            "password": ALICE_PASSWORD,
        }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await?;
    assert_eq!(created["email"], ALICE_EMAIL);
    assert!(created.get("password").is_none(), "secret must not be echoed");

    // Sign in
    let response = sign_in(&server, ALICE_EMAIL, ALICE_PASSWORD).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], TEST_TOKEN_TTL_SECONDS);

    let token = body["token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("token missing from sign-in response"))?
        .to_string();
    token
        .assert_valid_jwt()
        .assert_for_subject(ALICE_EMAIL)
        .assert_expires_in(TEST_TOKEN_TTL_SECONDS);

    // Protected access with the token
    let response = client
        .get(format!("{}/users", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let users: Vec<Value> = response.json().await?;
    assert!(users.iter().any(|u| u["email"] == ALICE_EMAIL));

    // Wrong secret
    let response = sign_in(&server, ALICE_EMAIL, "pw124").await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // No token
    let response = client.get(format!("{}/users", server.url())).send().await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

// ============================================================================
// Sign-in failures
// ============================================================================

/// Unknown identifier and wrong secret produce byte-identical responses.
#[tokio::test]
async fn test_sign_in_failures_are_indistinguishable() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server
        .create_user(ALICE_NAME, ALICE_EMAIL, ALICE_PASSWORD)
        .await?;

    let wrong_secret = sign_in(&server, ALICE_EMAIL, "pw124").await?;
    let unknown_user = sign_in(&server, BOB_EMAIL, ALICE_PASSWORD).await?;

    assert_eq!(wrong_secret.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let wrong_secret_body = wrong_secret.text().await?;
    let unknown_user_body = unknown_user.text().await?;
    assert_eq!(wrong_secret_body, unknown_user_body);

    let body: Value = serde_json::from_str(&wrong_secret_body)?;
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    assert!(!wrong_secret_body.contains("pw124"));

    Ok(())
}

/// Secret comparison is exact: case and surrounding whitespace matter.
#[tokio::test]
async fn test_sign_in_requires_exact_secret() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server
        .create_user(ALICE_NAME, ALICE_EMAIL, ALICE_PASSWORD)
        .await?;

    for attempt in ["PW123", " pw123", "pw123 ", "pw12", ""] {
        let response = sign_in(&server, ALICE_EMAIL, attempt).await?;
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "secret {:?} must not authenticate",
            attempt
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_sign_in_malformed_body() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = test_client()
        .post(format!("{}/auth/signin", server.url()))
        .json(&json!({ "email": ALICE_EMAIL }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "MALFORMED_REQUEST");

    Ok(())
}

#[tokio::test]
async fn test_duplicate_sign_up_conflicts() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server
        .create_user(ALICE_NAME, ALICE_EMAIL, ALICE_PASSWORD)
        .await?;

    let response = test_client()
        .post(format!("{}/auth/signup", server.url()))
        .json(&json!({
            "name": "Another Alice",
            "email": ALICE_EMAIL,
            "password": "different",
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(server.user_count().await?, 1);

    Ok(())
}

// ============================================================================
// Bcrypt policy
// ============================================================================

/// Under the bcrypt policy the stored value is a hash and sign-in still works.
#[tokio::test]
async fn test_bcrypt_policy_round_trip() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn_with_policy(SecretPolicy::Bcrypt).await?;
    let user = server
        .create_user(ALICE_NAME, ALICE_EMAIL, ALICE_PASSWORD)
        .await?;
    assert!(user.password.starts_with("$2"), "stored value must be a bcrypt hash");

    let response = sign_in(&server, ALICE_EMAIL, ALICE_PASSWORD).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = sign_in(&server, ALICE_EMAIL, "pw124").await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = sign_in(&server, BOB_EMAIL, ALICE_PASSWORD).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
