//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use mockgate::audit::MemoryAuditSink;
use mockgate::{AppConfig, ConfigStore, HttpServer, Shutdown};

/// A running mockgate instance plus handles into its store and audit sink.
#[allow(dead_code)]
pub struct TestApp {
    pub addr: SocketAddr,
    pub store: Arc<ConfigStore>,
    pub sink: Arc<MemoryAuditSink>,
    pub shutdown: Arc<Shutdown>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Spawn the server on an ephemeral port.
pub async fn spawn_app(config: AppConfig) -> TestApp {
    let store = Arc::new(
        ConfigStore::from_config(&config.routes, &config.mocks, &config.basic_mocks).unwrap(),
    );
    let sink = Arc::new(MemoryAuditSink::new());
    let shutdown = Arc::new(Shutdown::new());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config, store.clone(), sink.clone(), shutdown.clone());
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestApp {
        addr,
        store,
        sink,
        shutdown,
    }
}

/// Start an upstream double that returns a fixed status and body; returns
/// its ephemeral address.
#[allow(dead_code)]
pub async fn start_mock_backend(status: u16, response: &'static str) -> SocketAddr {
    start_programmable_backend(move || async move { (status, response.to_string()) }).await
}

/// Start a programmable upstream double.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 8192];
                        let _ = socket.read(&mut buf).await;

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            201 => "201 Created",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nX-Upstream: yes\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start an upstream double that records every raw request (head and body)
/// it receives, answering 200 "captured".
#[allow(dead_code)]
pub async fn start_capture_backend(captured: Arc<Mutex<Vec<String>>>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let captured = captured.clone();
                    tokio::spawn(async move {
                        let raw = read_full_request(&mut socket).await;
                        captured.lock().unwrap().push(raw);

                        let body = "captured";
                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read one HTTP/1.1 request: the head, then content-length many body bytes.
async fn read_full_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 8192];

    let head_end = loop {
        match socket.read(&mut chunk).await {
            Ok(0) => break buf.len(),
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = find_head_end(&buf) {
                    break pos;
                }
            }
            Err(_) => break buf.len(),
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())?
        })
        .unwrap_or(0);

    let mut total = head_end + 4 + content_length;
    while buf.len() < total {
        match socket.read(&mut chunk).await {
            Ok(0) => total = buf.len(),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(_) => total = buf.len(),
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
