mod common;

use anyhow::Result;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

#[tokio::test]
async fn missing_authorization_header_is_rejected_before_storage() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/api/v1/dashboard")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");

    let res = client
        .post(server.url("/api/v1/onboarding"))
        .json(&common::onboarding_body("Ada", "Physics"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(server.store.statements(), 0);
    Ok(())
}

#[tokio::test]
async fn header_without_bearer_prefix_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    let bearer = server.bearer("user-123");
    let raw_token = bearer.trim_start_matches("Bearer ");

    for value in [raw_token, "Basic dXNlcjpwYXNz", "Token abc"] {
        let res = client
            .get(server.url("/api/v1/dashboard"))
            .header("Authorization", value)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "value {}", value);
    }

    assert_eq!(server.store.statements(), 0);
    Ok(())
}

#[tokio::test]
async fn token_signed_with_wrong_key_or_algorithm_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let claims = json!({ "sub": "user-123", "exp": Utc::now().timestamp() + 3600 });

    let wrong_key = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"not-the-secret"),
    )?;
    let wrong_alg = encode(
        &Header::new(Algorithm::HS384),
        &claims,
        &EncodingKey::from_secret(common::JWT_SECRET.as_bytes()),
    )?;

    for token in [wrong_key, wrong_alg] {
        let res = client
            .get(server.url("/api/v1/dashboard"))
            .bearer_auth(&token)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = res.json::<Value>().await?;
        assert_eq!(body["message"], "Invalid or expired token");
    }

    assert_eq!(server.store.statements(), 0);
    Ok(())
}

#[tokio::test]
async fn service_key_is_accepted_in_both_forms() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    for value in [format!("Bearer {}", common::SERVICE_KEY), common::SERVICE_KEY.to_string()] {
        let res = client
            .get(server.url("/api/v1/dashboard"))
            .header("Authorization", value)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body = res.json::<Value>().await?;
        assert_eq!(body["welcomeMessage"], "Welcome, Scholar!");
    }

    Ok(())
}

#[tokio::test]
async fn unknown_route_is_not_found_rather_than_unauthorized() -> Result<()> {
    let server = TestServer::spawn().await?;
    let res = reqwest::Client::new()
        .get(server.url("/api/v1/nothing-here"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn token_without_usable_subject_reports_missing_user_id() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let key = EncodingKey::from_secret(common::JWT_SECRET.as_bytes());
    let exp = Utc::now().timestamp() + 3600;

    for claims in [json!({ "exp": exp }), json!({ "sub": 42, "exp": exp })] {
        let token = encode(&Header::new(Algorithm::HS256), &claims, &key)?;
        let res = client
            .get(server.url("/api/v1/dashboard"))
            .bearer_auth(&token)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.json::<Value>().await?["message"], "User ID not found in token");
    }

    assert_eq!(server.store.statements(), 0);
    Ok(())
}

#[tokio::test]
async fn token_used_before_nbf_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let now = Utc::now().timestamp();
    let token = encode(
        &Header::new(Algorithm::HS256),
        &json!({ "sub": "user-123", "exp": now + 7200, "nbf": now + 3600 }),
        &EncodingKey::from_secret(common::JWT_SECRET.as_bytes()),
    )?;

    let res = reqwest::Client::new()
        .get(server.url("/api/v1/dashboard"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(server.store.statements(), 0);
    Ok(())
}
