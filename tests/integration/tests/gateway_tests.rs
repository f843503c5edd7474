//! WebSocket gateway tests
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::time::Duration;

use integration_tests::{fixtures::*, GatewayClient, TestServer};
use parley_gateway::{CloseCode, OpCode};
use reqwest::StatusCode;
use serde_json::json;

/// Long enough for any in-flight event to arrive on localhost
const QUIET_WINDOW: Duration = Duration::from_millis(500);

#[tokio::test]
async fn test_hello_then_ready_lists_online_peers() {
    let server = TestServer::start().await.unwrap();
    let ada = server.register("Ada").await.unwrap();
    let bob = server.register("Bob").await.unwrap();

    let _bob_ws = server.connect(&bob.token).await.unwrap();

    let mut ada_ws = GatewayClient::connect(&server.gateway_url(), &ada.token)
        .await
        .unwrap();
    let interval = ada_ws.expect_hello().await.unwrap();
    assert!(interval > 0);

    let ready = ada_ws.expect_dispatch("READY").await.unwrap();
    assert_eq!(ready["userId"], ada.user.id.as_str());
    assert_eq!(ready["onlineUsers"], json!([bob.user.id]));
}

#[tokio::test]
async fn test_send_deliver_and_offline_presence() {
    let server = TestServer::start().await.unwrap();
    let ada = server.register("Ada").await.unwrap();
    let bob = server.register("Bob").await.unwrap();

    let mut ada_ws = server.connect(&ada.token).await.unwrap();
    let mut bob_ws = server.connect(&bob.token).await.unwrap();

    let online = ada_ws.expect_dispatch("PRESENCE_UPDATE").await.unwrap();
    assert_eq!(online, json!({"userId": bob.user.id, "online": true}));

    ada_ws.send_message("n-1", &bob.user.id, "hi").await.unwrap();

    let ack = ada_ws.expect_dispatch("MESSAGE_ACK").await.unwrap();
    assert_eq!(ack["nonce"], "n-1");
    assert_eq!(ack["message"]["content"], "hi");
    assert_ne!(ack["message"]["id"], "0");

    let created = bob_ws.expect_dispatch("MESSAGE_CREATE").await.unwrap();
    assert_eq!(created["id"], ack["message"]["id"]);
    assert_eq!(created["senderId"], ada.user.id.as_str());
    assert_eq!(created["isRead"], false);

    ada_ws.close().await.unwrap();

    let offline = bob_ws.expect_dispatch("PRESENCE_UPDATE").await.unwrap();
    assert_eq!(offline, json!({"userId": ada.user.id, "online": false}));
}

#[tokio::test]
async fn test_mark_read_notifies_sender_once() {
    let server = TestServer::start().await.unwrap();
    let ada = server.register("Ada").await.unwrap();
    let bob = server.register("Bob").await.unwrap();

    let mut ada_ws = server.connect(&ada.token).await.unwrap();
    let mut bob_ws = server.connect(&bob.token).await.unwrap();

    ada_ws.send_message("n-1", &bob.user.id, "hi").await.unwrap();
    let created = bob_ws.expect_dispatch("MESSAGE_CREATE").await.unwrap();
    let message_id = created["id"].as_str().unwrap().to_string();

    bob_ws.mark_read("r-1", &message_id).await.unwrap();
    let ack = bob_ws.expect_dispatch("MARK_READ_ACK").await.unwrap();
    assert_eq!(ack, json!({"nonce": "r-1", "messageId": message_id}));

    bob_ws.mark_read("r-2", &message_id).await.unwrap();
    bob_ws.expect_dispatch("MARK_READ_ACK").await.unwrap();

    let reads = ada_ws.collect_dispatches("MESSAGE_READ", QUIET_WINDOW).await;
    assert_eq!(reads, vec![json!({"messageId": message_id})]);
}

#[tokio::test]
async fn test_rest_send_reaches_receiver_socket() {
    let server = TestServer::start().await.unwrap();
    let ada = server.register("Ada").await.unwrap();
    let bob = server.register("Bob").await.unwrap();
    let mut bob_ws = server.connect(&bob.token).await.unwrap();

    let response = server
        .post_auth("/messages", &ada.token, &SendMessageRequest::new(&bob.user.id, "via rest"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = bob_ws.expect_dispatch("MESSAGE_CREATE").await.unwrap();
    assert_eq!(created["content"], "via rest");
}

#[tokio::test]
async fn test_typing_start_then_auto_clear() {
    let server = TestServer::start().await.unwrap();
    let ada = server.register("Ada").await.unwrap();
    let bob = server.register("Bob").await.unwrap();

    let mut ada_ws = server.connect(&ada.token).await.unwrap();
    let mut bob_ws = server.connect(&bob.token).await.unwrap();

    ada_ws
        .send_op(OpCode::TypingStart, json!({"receiverId": bob.user.id}))
        .await
        .unwrap();

    let started = bob_ws.expect_dispatch("TYPING_INDICATOR").await.unwrap();
    assert_eq!(started, json!({"senderId": ada.user.id, "isTyping": true}));

    // Test servers run with a 300ms typing timeout
    let cleared = bob_ws.expect_dispatch("TYPING_INDICATOR").await.unwrap();
    assert_eq!(cleared, json!({"senderId": ada.user.id, "isTyping": false}));
}

#[tokio::test]
async fn test_second_connection_replaces_first() {
    let server = TestServer::start().await.unwrap();
    let ada = server.register("Ada").await.unwrap();
    let bob = server.register("Bob").await.unwrap();

    let mut bob_ws = server.connect(&bob.token).await.unwrap();
    let mut first = server.connect(&ada.token).await.unwrap();
    bob_ws.expect_dispatch("PRESENCE_UPDATE").await.unwrap();

    let mut second = server.connect(&ada.token).await.unwrap();
    assert_eq!(
        first.expect_close().await.unwrap(),
        CloseCode::SessionReplaced.as_u16()
    );

    // Neither a second online nor an offline for the replaced session
    let presence = bob_ws.collect_dispatches("PRESENCE_UPDATE", QUIET_WINDOW).await;
    assert!(presence.is_empty(), "unexpected presence: {presence:?}");

    // The new connection is the live one
    bob_ws.send_message("n-1", &ada.user.id, "still there?").await.unwrap();
    let created = second.expect_dispatch("MESSAGE_CREATE").await.unwrap();
    assert_eq!(created["content"], "still there?");
}

#[tokio::test]
async fn test_bad_credential_closes_with_auth_failed() {
    let server = TestServer::start().await.unwrap();

    let mut ws = GatewayClient::connect(&server.gateway_url(), "not-a-token")
        .await
        .unwrap();
    ws.expect_hello().await.unwrap();
    assert_eq!(
        ws.expect_close().await.unwrap(),
        CloseCode::AuthenticationFailed.as_u16()
    );
}

#[tokio::test]
async fn test_heartbeat_is_acknowledged() {
    let server = TestServer::start().await.unwrap();
    let ada = server.register("Ada").await.unwrap();
    let mut ws = server.connect(&ada.token).await.unwrap();

    ws.send_op(OpCode::Heartbeat, json!(null)).await.unwrap();
    let ack = ws.next_message().await.unwrap();
    assert_eq!(ack.op, OpCode::HeartbeatAck);
}

#[tokio::test]
async fn test_rejected_request_keeps_connection_open() {
    let server = TestServer::start().await.unwrap();
    let ada = server.register("Ada").await.unwrap();
    let mut ws = server.connect(&ada.token).await.unwrap();

    ws.send_message("n-1", &ada.user.id, "talking to myself").await.unwrap();
    let rejected = ws.expect_dispatch("REQUEST_REJECTED").await.unwrap();
    assert_eq!(rejected["nonce"], "n-1");
    assert_eq!(rejected["code"], "INVALID_REQUEST");
    assert_eq!(rejected["retryable"], false);

    ws.send_op(OpCode::Heartbeat, json!(null)).await.unwrap();
    assert_eq!(ws.next_message().await.unwrap().op, OpCode::HeartbeatAck);
}

#[tokio::test]
async fn test_malformed_payload_is_rejected_not_fatal() {
    let server = TestServer::start().await.unwrap();
    let ada = server.register("Ada").await.unwrap();
    let mut ws = server.connect(&ada.token).await.unwrap();

    // No receiverId
    ws.send_op(OpCode::SendMessage, json!({"nonce": "n-1", "content": "hi"}))
        .await
        .unwrap();
    let rejected = ws.expect_dispatch("REQUEST_REJECTED").await.unwrap();
    assert_eq!(rejected["nonce"], "n-1");
    assert_eq!(rejected["code"], "INVALID_REQUEST");

    ws.send_op(OpCode::Heartbeat, json!(null)).await.unwrap();
    assert_eq!(ws.next_message().await.unwrap().op, OpCode::HeartbeatAck);
}

#[tokio::test]
async fn test_undecodable_frames_close_the_connection() {
    let server = TestServer::start().await.unwrap();
    let ada = server.register("Ada").await.unwrap();

    let mut ws = server.connect(&ada.token).await.unwrap();
    ws.send_raw("this is not json").await.unwrap();
    assert_eq!(ws.expect_close().await.unwrap(), CloseCode::DecodeError.as_u16());

    let mut ws = server.connect(&ada.token).await.unwrap();
    ws.send_raw(r#"{"op": 99}"#).await.unwrap();
    assert_eq!(ws.expect_close().await.unwrap(), CloseCode::UnknownOpcode.as_u16());
}
