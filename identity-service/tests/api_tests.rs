mod common;

use auth::Authenticator;
use auth::Claims;
use chrono::Duration;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "a@x.com",
            "password": "longenough1"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["id"].is_i64());
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["email"], "a@x.com");
    assert_eq!(body["data"]["is_active"], true);
    assert!(body["data"]["created_at"].is_string());
    // The hash never leaves the server.
    assert!(body["data"].get("password_hash").is_none());
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = TestApp::spawn().await;

    app.register_user("alice", "a@x.com", "longenough1").await;

    // Same username, different email.
    let response = app
        .post("/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "other@x.com",
            "password": "longenough1"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "Username already registered");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;

    app.register_user("alice", "a@x.com", "longenough1").await;

    let response = app
        .post("/auth/register")
        .json(&json!({
            "username": "alice2",
            "email": "a@x.com",
            "password": "longenough1"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "Email already registered");
}

#[tokio::test]
async fn test_register_invalid_username() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/register")
        .json(&json!({
            "username": "ab",
            "email": "a@x.com",
            "password": "longenough1"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("minimum 3 characters"));
}

#[tokio::test]
async fn test_register_invalid_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "not-an-email",
            "password": "longenough1"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .to_lowercase()
        .contains("email"));
}

#[tokio::test]
async fn test_register_password_too_short() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "a@x.com",
            "password": "short"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("minimum 8 characters"));
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;

    app.register_user("alice", "a@x.com", "longenough1").await;

    let response = app
        .post("/auth/login")
        .json(&json!({
            "username": "alice",
            "password": "longenough1"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(!body["data"]["access_token"].as_str().unwrap().is_empty());
    assert_eq!(body["data"]["token_type"], "bearer");
    assert_eq!(body["data"]["expires_in"], 24 * 60 * 60);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::spawn().await;

    app.register_user("alice", "a@x.com", "correct_password1")
        .await;

    let response = app
        .post("/auth/login")
        .json(&json!({
            "username": "alice",
            "password": "wrong_password1"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "Incorrect username or password");
}

#[tokio::test]
async fn test_login_unknown_user_same_message() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/login")
        .json(&json!({
            "username": "nobody",
            "password": "whatever_pw"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Indistinguishable from the wrong-password case.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "Incorrect username or password");
}

#[tokio::test]
async fn test_login_disabled_account() {
    let app = TestApp::spawn().await;

    app.register_user("alice", "a@x.com", "longenough1").await;
    app.deactivate_user("alice").await;

    let response = app
        .post("/auth/login")
        .json(&json!({
            "username": "alice",
            "password": "longenough1"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "User account is disabled");
}

#[tokio::test]
async fn test_me_without_credential() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/auth/me")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "Authentication required");
}

#[tokio::test]
async fn test_me_with_garbage_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get_authenticated("/auth/me", "not.a.token")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_me_with_expired_token() {
    let app = TestApp::spawn().await;

    app.register_user("alice", "a@x.com", "longenough1").await;

    let expired = app
        .authenticator
        .issue_token(&Claims::for_subject("alice", Duration::hours(-1)))
        .unwrap();

    let response = app
        .get_authenticated("/auth/me", &expired)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_me_with_foreign_secret_token() {
    let app = TestApp::spawn().await;

    app.register_user("alice", "a@x.com", "longenough1").await;

    let forged = Authenticator::new(b"some-other-secret-also-32-bytes-long!!")
        .issue_token(&Claims::for_subject("alice", Duration::hours(1)))
        .unwrap();

    let response = app
        .get_authenticated("/auth/me", &forged)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_success() {
    let app = TestApp::spawn().await;

    app.register_user("alice", "a@x.com", "longenough1").await;
    let token = app.login_user("alice", "longenough1").await;

    let response = app
        .get_authenticated("/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["email"], "a@x.com");
    assert_eq!(body["data"]["is_active"], true);
}

#[tokio::test]
async fn test_me_with_stale_subject() {
    let app = TestApp::spawn().await;

    app.register_user("alice", "a@x.com", "longenough1").await;
    let token = app.login_user("alice", "longenough1").await;
    app.delete_user("alice").await;

    let response = app
        .get_authenticated("/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "User not found");
}

#[tokio::test]
async fn test_me_with_disabled_account() {
    let app = TestApp::spawn().await;

    app.register_user("alice", "a@x.com", "longenough1").await;
    let token = app.login_user("alice", "longenough1").await;
    app.deactivate_user("alice").await;

    let response = app
        .get_authenticated("/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    // Forbidden, not unauthorized: re-authenticating will not help.
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "User account is disabled");
}

#[tokio::test]
async fn test_logout() {
    let app = TestApp::spawn().await;

    app.register_user("alice", "a@x.com", "longenough1").await;
    let token = app.login_user("alice", "longenough1").await;

    let response = app
        .post_authenticated("/auth/logout", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "Successfully logged out");

    // Stateless: the token still works until it expires.
    let response = app
        .get_authenticated("/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_requires_authentication() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/logout")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_anonymous_and_authenticated() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/health")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["status"], "ok");
    assert!(body["data"]["authenticated_as"].is_null());

    app.register_user("alice", "a@x.com", "longenough1").await;
    let token = app.login_user("alice", "longenough1").await;

    let response = app
        .get_authenticated("/health", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["authenticated_as"], "alice");
}

#[tokio::test]
async fn test_health_treats_disabled_caller_as_anonymous() {
    let app = TestApp::spawn().await;

    app.register_user("alice", "a@x.com", "longenough1").await;
    let token = app.login_user("alice", "longenough1").await;
    app.deactivate_user("alice").await;

    // The optional path gives no error and no identity.
    let response = app
        .get_authenticated("/health", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["authenticated_as"].is_null());
}

#[tokio::test]
async fn test_register_login_me_flow() {
    let app = TestApp::spawn().await;

    let registered = app.register_user("alice", "a@x.com", "longenough1").await;
    assert_eq!(registered["data"]["username"], "alice");

    let token = app.login_user("alice", "longenough1").await;

    let response = app
        .get_authenticated("/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["id"], registered["data"]["id"]);
}
