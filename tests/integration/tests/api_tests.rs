//! REST surface tests
//!
//! Each test runs its own server with the in-memory store.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{assert_json, assert_status, fixtures::*, TestServer};
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.unwrap();
    let response = server.get("/health").await.unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_and_login() {
    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest::unique("Ada");

    let response = server.post("/auth/register", &request).await.unwrap();
    let registered: AuthResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(registered.user.name, "Ada");
    assert_eq!(registered.user.email, request.email);
    assert!(!registered.token.is_empty());
    assert!(registered.expires_in > 0);

    let response = server
        .post("/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let logged_in: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(logged_in.user.id, registered.user.id);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest::unique("Ada");

    server.post("/auth/register", &request).await.unwrap();
    let response = server.post("/auth/register", &request).await.unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();
}

#[tokio::test]
async fn test_register_validation() {
    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest {
        name: String::new(),
        email: "not-an-email".into(),
        password: "short".into(),
    };

    let response = server.post("/auth/register", &request).await.unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest::unique("Ada");
    server.post("/auth/register", &request).await.unwrap();

    let response = server
        .post(
            "/auth/login",
            &LoginRequest {
                email: request.email.clone(),
                password: "WrongPass123!".into(),
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_current_user_and_contacts() {
    let server = TestServer::start().await.unwrap();
    let ada = server.register("Ada").await.unwrap();
    let bob = server.register("Bob").await.unwrap();

    let response = server.get_auth("/users/@me", &ada.token).await.unwrap();
    let me: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.id, ada.user.id);
    assert!(!me.online);

    let response = server.get_auth("/users", &ada.token).await.unwrap();
    let contacts: Vec<UserResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].id, bob.user.id);
    assert!(!contacts[0].online);

    // Presence is derived from the live registry
    let _gateway = server.connect(&bob.token).await.unwrap();
    let response = server.get_auth("/users", &ada.token).await.unwrap();
    let contacts: Vec<UserResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(contacts[0].online);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .client
        .get(format!("{}/api/v1/users/@me", server.base_url()))
        .send()
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server.get_auth("/users/@me", "garbage").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_offline_receiver_then_history() {
    let server = TestServer::start().await.unwrap();
    let ada = server.register("Ada").await.unwrap();
    let bob = server.register("Bob").await.unwrap();

    let response = server
        .post_auth("/messages", &ada.token, &SendMessageRequest::new(&bob.user.id, "hi"))
        .await
        .unwrap();
    let sent: MessageResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_ne!(sent.id, "0");
    assert_eq!(sent.sender_id, ada.user.id);
    assert!(!sent.is_read);

    let response = server
        .get_auth(&format!("/messages?with={}", ada.user.id), &bob.token)
        .await
        .unwrap();
    let history: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, sent.id);
    assert_eq!(history[0].content, "hi");
}

#[tokio::test]
async fn test_send_message_rejections() {
    let server = TestServer::start().await.unwrap();
    let ada = server.register("Ada").await.unwrap();

    // Self as receiver
    let response = server
        .post_auth("/messages", &ada.token, &SendMessageRequest::new(&ada.user.id, "hi"))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    // Unknown receiver
    let response = server
        .post_auth("/messages", &ada.token, &SendMessageRequest::new("123456", "hi"))
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    // Too long
    let long = "x".repeat(4001);
    let bob = server.register("Bob").await.unwrap();
    let response = server
        .post_auth("/messages", &ada.token, &SendMessageRequest::new(&bob.user.id, &long))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_mark_read_rules() {
    let server = TestServer::start().await.unwrap();
    let ada = server.register("Ada").await.unwrap();
    let bob = server.register("Bob").await.unwrap();

    let response = server
        .post_auth("/messages", &ada.token, &SendMessageRequest::new(&bob.user.id, "hi"))
        .await
        .unwrap();
    let sent: MessageResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    let path = format!("/messages/{}/read", sent.id);

    // Only the receiver may mark it read
    let response = server.put_auth(&path, &ada.token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server.put_auth(&path, &bob.token).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    // Idempotent
    let response = server.put_auth(&path, &bob.token).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.put_auth("/messages/987654/read", &bob.token).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server
        .get_auth(&format!("/messages?with={}", bob.user.id), &ada.token)
        .await
        .unwrap();
    let history: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(history[0].is_read);
}
