#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crypto_price_flow::domain::errors::{FetchError, LoadError, NotifyError};
use crypto_price_flow::domain::model::quote::PriceQuote;
use crypto_price_flow::domain::model::record::PriceRecord;
use crypto_price_flow::domain::model::table::AppendReceipt;
use crypto_price_flow::domain::traits::{LakeSink, PriceSource, WebhookSender};

pub fn quote(value: Value) -> PriceQuote {
    serde_json::from_value(value).expect("valid quote fixture")
}

/// Fresh lake root under the system temp dir
pub fn temp_lake() -> PathBuf {
    std::env::temp_dir().join(format!("price-lake-test-{}", uuid::Uuid::new_v4()))
}

/// Always returns the same quote and counts calls
pub struct StaticSource {
    pub quote: PriceQuote,
    pub calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(quote: PriceQuote) -> Arc<Self> {
        Arc::new(Self {
            quote,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for StaticSource {
    async fn fetch(&self) -> Result<PriceQuote, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.quote.clone())
    }
}

pub struct FailingSource;

#[async_trait]
impl PriceSource for FailingSource {
    async fn fetch(&self) -> Result<PriceQuote, FetchError> {
        Err(FetchError::Parse("simulated outage".to_string()))
    }
}

/// Storage that rejects every append
pub struct FailingSink {
    pub attempts: AtomicUsize,
}

impl FailingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            attempts: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LakeSink for FailingSink {
    async fn append(&self, _record: &PriceRecord) -> Result<AppendReceipt, LoadError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(LoadError::Catalog("simulated storage failure".to_string()))
    }
}

/// Keeps every delivered message; optionally rejects them
pub struct RecordingWebhook {
    pub messages: Mutex<Vec<String>>,
    pub reject: bool,
}

impl RecordingWebhook {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            messages: Mutex::new(Vec::new()),
            reject: false,
        })
    }

    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            messages: Mutex::new(Vec::new()),
            reject: true,
        })
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebhookSender for RecordingWebhook {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(text.to_string());
        if self.reject {
            return Err(NotifyError::Delivery {
                status: 500,
                body: "channel_is_archived".to_string(),
            });
        }
        Ok(())
    }
}

/// Serve a single canned HTTP response on a random local port.
/// The handle resolves to the raw request that was received.
pub async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
    let (base_url, script) = serve_sequence(vec![(status, body.to_string())]).await;
    let handle = tokio::spawn(async move {
        script
            .await
            .unwrap()
            .into_iter()
            .next()
            .unwrap_or_default()
    });
    (base_url, handle)
}

/// Serve the given responses in order, one connection each.
/// The handle resolves to the raw requests, in arrival order.
pub async fn serve_sequence(responses: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut requests = Vec::with_capacity(responses.len());
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut socket).await);

            let response = format!(
                "HTTP/1.1 {} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
        requests
    });

    (format!("http://{}", addr), handle)
}

/// Body of a raw HTTP request
pub fn request_body(request: &str) -> &str {
    request.split("\r\n\r\n").nth(1).unwrap_or_default()
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).to_string()
}
