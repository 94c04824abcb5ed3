//! Minimal HTTP/1.1 mock server shared by the REST client tests.
//!
//! Each accepted connection serves exactly one request with the next canned
//! response and closes, which keeps the parser trivial.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use firebase_sdk::TokenManager;

#[derive(Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }
}

pub struct MockHttpServer {
    addr: SocketAddr,
    requests_rx: mpsc::Receiver<RecordedRequest>,
}

impl MockHttpServer {
    pub async fn start(responses: Vec<(u16, &str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (requests_tx, requests_rx) = mpsc::channel(32);

        let responses: Vec<(u16, String)> = responses
            .into_iter()
            .map(|(status, body)| (status, body.to_string()))
            .collect();

        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                serve_one(stream, status, &body, &requests_tx).await;
            }
        });

        Self { addr, requests_rx }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn next_request(&mut self) -> RecordedRequest {
        tokio::time::timeout(Duration::from_secs(2), self.requests_rx.recv())
            .await
            .expect("Timeout waiting for request")
            .expect("Mock server stopped")
    }
}

async fn serve_one(
    stream: TcpStream,
    status: u16,
    body: &str,
    requests_tx: &mpsc::Sender<RecordedRequest>,
) {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await.is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((k, v)) = line.split_once(':') {
            headers.push((k.trim().to_string(), v.trim().to_string()));
        }
    }

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut raw_body = vec![0u8; content_length];
    if reader.read_exact(&mut raw_body).await.is_err() {
        return;
    }

    let _ = requests_tx
        .send(RecordedRequest {
            method,
            path,
            headers,
            body: String::from_utf8_lossy(&raw_body).into_owned(),
        })
        .await;

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        body.len(),
        body
    );

    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

pub async fn test_token_manager() -> Arc<TokenManager> {
    let tm = Arc::new(TokenManager::new(
        "test_client_id".to_string(),
        "test_secret".to_string(),
        "test_refresh".to_string(),
    ));
    tm.set_token_for_test("ya29.test_token".to_string()).await;
    tm
}
