//! Minimal HTTP/1.1 responder for exercising `HttpSearchClient` end to end.
//!
//! Serves one canned response per connection and captures each request's
//! headers and JSON body.

use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A request received by the stub server
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Canned response served to every connection
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
    /// Send the headers and half the body, then hold the connection for `delay`
    pub stall_body: bool,
}

impl CannedResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
            stall_body: false,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn stalled_mid_body(mut self, stall: Duration) -> Self {
        self.delay = stall;
        self.stall_body = true;
        self
    }
}

/// Running stub server
pub struct HttpStub {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl HttpStub {
    pub async fn start(response: CannedResponse) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let captured = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let response = response.clone();
                let captured = Arc::clone(&captured);
                tokio::spawn(serve(stream, response, captured));
            }
        });

        Self {
            base_url: format!("http://{address}"),
            requests,
        }
    }

    pub fn captured(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve(
    mut stream: TcpStream,
    response: CannedResponse,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let Ok(read) = stream.read(&mut chunk).await else {
            return;
        };
        if read == 0 {
            return;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(position) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break position;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buffer.len() < body_start + content_length {
        match stream.read(&mut chunk).await {
            Ok(read) if read > 0 => buffer.extend_from_slice(&chunk[..read]),
            _ => break,
        }
    }
    let end = buffer.len().min(body_start + content_length);
    let body = serde_json::from_slice(&buffer[body_start..end]).unwrap_or(Value::Null);

    // Captured before replying so the client never observes a response first
    captured.lock().unwrap().push(CapturedRequest {
        request_line,
        headers,
        body,
    });

    let head = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        response.body.len(),
    );

    if response.stall_body {
        let (sent, _) = response.body.split_at(response.body.len() / 2);
        let _ = stream.write_all(head.as_bytes()).await;
        let _ = stream.write_all(sent.as_bytes()).await;
        let _ = stream.flush().await;
        tokio::time::sleep(response.delay).await;
        return;
    }

    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }

    let _ = stream.write_all(head.as_bytes()).await;
    let _ = stream.write_all(response.body.as_bytes()).await;
    let _ = stream.shutdown().await;
}
