//! Integration tests for the Gemini HTTP backend
//!
//! A one-shot local listener stands in for the upstream endpoint

use gemini_chat::ai::{
    FAILURE_SENTINEL, GeminiBackend, InferenceClient, ReplyOutcome,
};
use gemini_chat::types::{Attachment, Role};
use gemini_chat::{Session, SubmitOutcome};
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

struct CapturedRequest {
    head: String,
    body: Value,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<String> {
        self.head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }

    fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }
}

async fn read_request(socket: &mut TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending a full request");
        buf.extend_from_slice(&chunk[..n]);

        let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (key, value) = line.split_once(':')?;
                key.trim()
                    .eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().unwrap())
            })
            .unwrap_or(0);
        let body_start = head_end + 4;
        if buf.len() >= body_start + content_length {
            let body = serde_json::from_slice(&buf[body_start..body_start + content_length])
                .unwrap_or(Value::Null);
            return CapturedRequest { head, body };
        }
    }
}

/// Answer exactly one request with `status` and `body`.
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (format!("http://{addr}/v1beta"), handle)
}

fn backend(base: &str, timeout: Duration) -> GeminiBackend {
    // Loopback traffic must not be routed through a proxy from the environment.
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    GeminiBackend::with_client(client, base, "gemini-2.5-flash", timeout, timeout)
}

fn reply_body(text: &str) -> String {
    json!({"candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]}).to_string()
}

#[tokio::test]
async fn test_sends_key_header_and_text_part() {
    let (base, server) = serve_once("200 OK", reply_body("Hi there")).await;
    let client = InferenceClient::new(backend(&base, Duration::from_secs(5)));

    let reply = client.send("hi", "k1", None).await;
    let request = server.await.unwrap();

    assert_eq!(reply.text, "Hi there");
    assert_eq!(reply.outcome, ReplyOutcome::Delivered);
    assert_eq!(
        request.request_line(),
        "POST /v1beta/models/gemini-2.5-flash:generateContent HTTP/1.1"
    );
    assert_eq!(request.header("x-goog-api-key").as_deref(), Some("k1"));
    assert_eq!(request.header("authorization"), None);
    assert!(!request.request_line().contains("key="));
    assert_eq!(
        request.body,
        json!({"contents": [{"parts": [{"text": "hi"}]}]})
    );
}

#[tokio::test]
async fn test_sends_inline_audio() {
    let (base, server) = serve_once("200 OK", reply_body("a bird")).await;
    let client = InferenceClient::new(backend(&base, Duration::from_secs(5)));
    let audio = Attachment::new("audio/mp4", b"hello".to_vec());

    let reply = client.send("", "k1", Some(&audio)).await;
    let request = server.await.unwrap();

    assert_eq!(reply.text, "a bird");
    assert_eq!(
        request.body,
        json!({"contents": [{"parts": [{"inlineData": {"mimeType": "audio/mp4", "data": "aGVsbG8="}}]}]})
    );
}

#[tokio::test]
async fn test_non_success_status_is_failure() {
    let body = json!({"error": {"code": 400, "message": "API key not valid"}}).to_string();
    let (base, server) = serve_once("400 Bad Request", body).await;
    let client = InferenceClient::new(backend(&base, Duration::from_secs(5)));

    let reply = client.send("hi", "bad", None).await;
    server.await.unwrap();

    assert_eq!(reply.text, FAILURE_SENTINEL);
    assert_eq!(reply.outcome, ReplyOutcome::Failed);
}

#[tokio::test]
async fn test_malformed_body_is_failure() {
    let (base, server) = serve_once("200 OK", "<html>oops</html>".to_string()).await;
    let client = InferenceClient::new(backend(&base, Duration::from_secs(5)));

    let reply = client.send("hi", "k1", None).await;
    server.await.unwrap();

    assert_eq!(reply.outcome, ReplyOutcome::Failed);
}

#[tokio::test]
async fn test_empty_candidates_is_empty_reply() {
    let (base, server) = serve_once("200 OK", r#"{"candidates":[]}"#.to_string()).await;
    let client = InferenceClient::new(backend(&base, Duration::from_secs(5)));

    let reply = client.send("hi", "k1", None).await;
    server.await.unwrap();

    assert_eq!(reply.outcome, ReplyOutcome::Empty);
}

#[tokio::test]
async fn test_connection_refused_is_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = InferenceClient::new(backend(
        &format!("http://{addr}/v1beta"),
        Duration::from_secs(5),
    ));

    let reply = client.send("hi", "k1", None).await;

    assert_eq!(reply.text, FAILURE_SENTINEL);
}

#[tokio::test]
async fn test_timeout_is_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(socket);
    });
    let client = InferenceClient::new(backend(
        &format!("http://{addr}/v1beta"),
        Duration::from_millis(200),
    ));

    let started = Instant::now();
    let reply = client.send("hi", "k1", None).await;

    assert_eq!(reply.outcome, ReplyOutcome::Failed);
    assert!(started.elapsed() < Duration::from_secs(5));
    server.abort();
}

#[tokio::test]
async fn test_session_over_http() {
    let (base, server) = serve_once("200 OK", reply_body("Hi there")).await;
    let session = Session::new(
        "k1",
        InferenceClient::new(backend(&base, Duration::from_secs(5))),
    );

    let outcome = session.submit("Hello", None).await;
    server.await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Delivered);
    let transcript: Vec<_> = session
        .transcript()
        .all()
        .into_iter()
        .map(|m| (m.role, m.content))
        .collect();
    assert_eq!(
        transcript,
        vec![
            (Role::User, "Hello".to_string()),
            (Role::Assistant, "Hi there".to_string()),
        ]
    );
}
