//! Shared mocks for the sync tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{Map, Value};

use crate::lookup::{LookupError, WebhookLookup};
use crate::time::Sleeper;
use crate::transport::{HttpClient, HttpError, HttpRequest, HttpResponse};

use super::TaskSyncEntry;

/// HTTP client replaying a scripted sequence of responses.
#[derive(Debug)]
pub struct MockClient {
    responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    call_count: AtomicUsize,
}

impl MockClient {
    pub fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn replying(responses: Vec<HttpResponse>) -> Self {
        Self::new(responses.into_iter().map(Ok).collect())
    }

    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn captured_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for MockClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(req);
        let mut responses = self.responses.lock().unwrap();
        assert!(!responses.is_empty(), "unexpected extra request");
        responses.remove(0)
    }
}

/// Sleeper that records requested delays and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for &RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Lookup counting its calls, yielding once before answering.
#[derive(Debug)]
pub struct CountingLookup {
    outcome: Result<String, ()>,
    calls: AtomicUsize,
}

impl CountingLookup {
    pub fn ok(url: &str) -> Self {
        Self {
            outcome: Ok(url.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            outcome: Err(()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl WebhookLookup for CountingLookup {
    async fn lookup(&self) -> Result<String, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.outcome.clone().map_err(|()| LookupError::NoRecords)
    }
}

pub fn json_response(status: u16, body: &Value) -> HttpResponse {
    text_response(status, &body.to_string())
}

pub fn text_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse::new(
        http::StatusCode::from_u16(status).unwrap(),
        http::HeaderMap::new(),
        body.as_bytes().to_vec(),
    )
}

pub fn url(s: &str) -> url::Url {
    url::Url::parse(s).unwrap()
}

pub fn entry(record_id: &str, payload: Value) -> TaskSyncEntry {
    let payload: Map<String, Value> = match payload {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    TaskSyncEntry::new(record_id, payload)
}

pub fn entries(count: usize) -> Vec<TaskSyncEntry> {
    (1..=count)
        .map(|i| entry(&format!("r{i}"), serde_json::json!({ "task": format!("task {i}") })))
        .collect()
}
