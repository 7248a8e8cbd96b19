//! Integration tests for the access guard on protected routes
//!
//! Every rejection must produce the same 401 body, whatever the reason.

use auth_test_utils::{
    test_client, TestAuthServer, TestTokenBuilder, ALICE_EMAIL, ALICE_NAME, ALICE_PASSWORD,
};
use jsonwebtoken::Algorithm;
use reqwest::StatusCode;

async fn get_users_with_header(
    server: &TestAuthServer,
    authorization: Option<&str>,
) -> Result<(StatusCode, String), anyhow::Error> {
    let mut request = test_client().get(format!("{}/users", server.url()));
    if let Some(value) = authorization {
        request = request.header("authorization", value);
    }
    let response = request.send().await?;
    Ok((response.status(), response.text().await?))
}

#[tokio::test]
async fn test_valid_token_is_admitted() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server
        .create_user(ALICE_NAME, ALICE_EMAIL, ALICE_PASSWORD)
        .await?;
    let token = server.create_token(ALICE_EMAIL)?;

    let (status, _) = get_users_with_header(&server, Some(&format!("Bearer {}", token))).await?;
    assert_eq!(status, StatusCode::OK);

    // Scheme is matched case-insensitively
    let (status, _) = get_users_with_header(&server, Some(&format!("bearer {}", token))).await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_all_rejections_share_one_response() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let valid = server.create_token(ALICE_EMAIL)?;
    let expired = server.create_expired_token(ALICE_EMAIL, 60)?;
    let wrong_secret = TestTokenBuilder::new()
        .for_user(ALICE_EMAIL)
        .sign_with_secret(b"not-the-server-secret-0123456789abc");
    let wrong_algorithm = TestTokenBuilder::new()
        .for_user(ALICE_EMAIL)
        .with_algorithm(Algorithm::HS512)
        .sign();
    let missing_exp = TestTokenBuilder::new()
        .for_user(ALICE_EMAIL)
        .without_claim("exp")
        .sign();
    let empty_subject = TestTokenBuilder::new().for_user("").sign();

    let mut tampered = valid.into_bytes();
    if let Some(last) = tampered.last_mut() {
        *last = if *last == b'A' { b'B' } else { b'A' };
    }
    let tampered = String::from_utf8(tampered)?;

    let cases: Vec<(&str, Option<String>)> = vec![
        ("missing header", None),
        ("empty header", Some(String::new())),
        ("whitespace header", Some("   ".to_string())),
        ("basic scheme", Some("Basic YWxpY2U6cHcxMjM=".to_string())),
        ("bearer without token", Some("Bearer".to_string())),
        ("not a jwt", Some("Bearer not-a-jwt".to_string())),
        ("expired", Some(format!("Bearer {}", expired))),
        ("wrong secret", Some(format!("Bearer {}", wrong_secret))),
        ("wrong algorithm", Some(format!("Bearer {}", wrong_algorithm))),
        ("missing exp", Some(format!("Bearer {}", missing_exp))),
        ("empty subject", Some(format!("Bearer {}", empty_subject))),
        ("tampered signature", Some(format!("Bearer {}", tampered))),
    ];

    let mut bodies = Vec::new();
    for (name, header) in &cases {
        let (status, body) = get_users_with_header(&server, header.as_deref()).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "case: {}", name);
        bodies.push(body);
    }

    let first = bodies.first().cloned().unwrap_or_default();
    assert!(first.contains("UNAUTHENTICATED"));
    for (body, (name, _)) in bodies.iter().zip(&cases) {
        assert_eq!(body, &first, "case {} returned a distinguishable body", name);
    }

    Ok(())
}

/// Oversized tokens are rejected before any decoding.
#[tokio::test]
async fn test_oversized_token_rejected() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let huge = format!("Bearer {}.{}.{}", "a".repeat(4000), "b".repeat(4000), "c".repeat(400));

    let (status, _) = get_users_with_header(&server, Some(&huge)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}
