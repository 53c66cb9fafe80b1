mod common;

use std::time::Duration;

use common::send_raw;
use tokio::{io::AsyncReadExt, io::AsyncWriteExt, net::TcpStream};
use ytauth::{management::PendingRequests, server::CallbackServer, types::CallbackResult};

async fn server() -> (CallbackServer, std::sync::Arc<PendingRequests>) {
    let pending = PendingRequests::new();
    let server = CallbackServer::bind(pending.clone(), Duration::from_millis(200))
        .await
        .unwrap();
    (server, pending)
}

#[tokio::test]
async fn test_redirect_uri_points_at_bound_port() {
    let (mut server, _pending) = server().await;

    assert!(server.local_addr().ip().is_loopback());
    assert_ne!(server.port(), 0);
    assert_eq!(server.redirect_uri(), format!("http://localhost:{}/", server.port()));

    server.shutdown().await;
}

#[tokio::test]
async fn test_code_is_delivered_to_matching_login() {
    let (mut server, pending) = server().await;
    let login = pending.register().unwrap();
    let request = format!("GET /?state={}&code=ABC123 HTTP/1.1\r\n\r\n", login.nonce());

    let response = send_raw(server.port(), &request).await;

    assert!(response.starts_with("HTTP/1.0 302 Found\r\n"));
    assert!(response.contains("Location: /\r\n"));
    let result = login.wait(Some(Duration::from_secs(1))).await.unwrap();
    assert_eq!(result, CallbackResult::Code("ABC123".to_string()));

    server.shutdown().await;
}

#[tokio::test]
async fn test_error_is_delivered_and_redirected_to_denied() {
    let (mut server, pending) = server().await;
    let login = pending.register().unwrap();
    let request = format!("GET /?error=access_denied&state={} HTTP/1.1\r\n\r\n", login.nonce());

    let response = send_raw(server.port(), &request).await;

    assert!(response.contains("Location: /denied\r\n"));
    let result = login.wait(Some(Duration::from_secs(1))).await.unwrap();
    assert_eq!(result, CallbackResult::Error("access_denied".to_string()));

    server.shutdown().await;
}

#[tokio::test]
async fn test_unknown_state_gets_no_response() {
    let (mut server, pending) = server().await;
    let login = pending.register().unwrap();

    let response = send_raw(server.port(), "GET /?state=unknown&code=ABC123 HTTP/1.1\r\n\r\n").await;

    assert_eq!(response, "");
    assert!(pending.is_pending(login.nonce()));

    server.shutdown().await;
}

#[tokio::test]
async fn test_second_delivery_for_same_state_is_ignored() {
    let (mut server, pending) = server().await;
    let login = pending.register().unwrap();
    let first = format!("GET /?state={}&code=FIRST HTTP/1.1\r\n\r\n", login.nonce());
    let second = format!("GET /?state={}&code=SECOND HTTP/1.1\r\n\r\n", login.nonce());

    assert!(!send_raw(server.port(), &first).await.is_empty());
    assert_eq!(send_raw(server.port(), &second).await, "");

    let result = login.wait(None).await.unwrap();
    assert_eq!(result, CallbackResult::Code("FIRST".to_string()));

    server.shutdown().await;
}

#[tokio::test]
async fn test_protocol_violations_are_abandoned() {
    let (mut server, pending) = server().await;
    let login = pending.register().unwrap();
    let nonce = login.nonce().to_string();

    let requests = [
        "GET /unknown HTTP/1.1\r\n\r\n".to_string(),
        "GET /favicon.ico HTTP/1.1\r\n\r\n".to_string(),
        format!("POST /?state={nonce}&code=X HTTP/1.1\r\n\r\n"),
        format!("GET /?state={nonce} HTTP/1.1\r\n\r\n"),
        format!("GET /?state={nonce}&code=X&error=y HTTP/1.1\r\n\r\n"),
        "GET /?code=X HTTP/1.1\r\n\r\n".to_string(),
        "garbage\r\n\r\n".to_string(),
    ];
    for request in &requests {
        assert_eq!(send_raw(server.port(), request).await, "", "request: {request:?}");
    }
    assert!(pending.is_pending(&nonce));

    server.shutdown().await;
}

#[tokio::test]
async fn test_landing_pages_are_served() {
    let (mut server, _pending) = server().await;

    let success = send_raw(server.port(), "GET / HTTP/1.1\r\n\r\n").await;
    assert!(success.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(success.contains("text/html"));

    let denied = send_raw(server.port(), "GET /denied HTTP/1.1\r\n\r\n").await;
    assert!(denied.contains("You denied the access request"));

    server.shutdown().await;
}

#[tokio::test]
async fn test_silent_client_is_dropped_after_read_timeout() {
    let (mut server, _pending) = server().await;
    let mut stream = TcpStream::connect(("127.0.0.1", server.port())).await.unwrap();
    stream.write_all(b"GET /?state=").await.unwrap();

    let mut buf = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(2), stream.read_to_end(&mut buf))
        .await
        .expect("connection should be closed by the server");
    assert_eq!(read.unwrap_or(0), 0);

    server.shutdown().await;
}

#[tokio::test]
async fn test_oversized_request_line_is_abandoned() {
    let (mut server, _pending) = server().await;
    let request = format!("GET /?state={} HTTP/1.1\r\n\r\n", "a".repeat(2048));

    assert_eq!(send_raw(server.port(), &request).await, "");

    server.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_releases_port() {
    let (mut server, _pending) = server().await;
    let port = server.port();

    server.shutdown().await;

    assert!(TcpStream::connect(("127.0.0.1", port)).await.is_err());
}
