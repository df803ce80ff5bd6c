//! Mock transport for testing

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

use super::transport::ApiTransport;

/// A request captured by the mock, in arrival order
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// Scripted in-memory transport.
///
/// Responses are queued per (method, path) and consumed in FIFO order, so a
/// test can script distinct answers for repeated calls to the same endpoint.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<(String, String), VecDeque<ApiResult<Value>>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next call to `method path`.
    pub fn enqueue(&self, method: &str, path: &str, response: ApiResult<Value>) {
        self.responses
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(response);
    }

    pub fn enqueue_ok(&self, method: &str, path: &str, body: Value) {
        self.enqueue(method, path, Ok(body));
    }

    pub fn enqueue_err(&self, method: &str, path: &str, error: ApiError) {
        self.enqueue(method, path, Err(error));
    }

    /// Every request the mock has seen, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests made to a given path.
    pub fn call_count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    fn take(&self, method: &'static str, path: &str, body: Option<Value>) -> ApiResult<Value> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: path.to_string(),
            body,
        });

        self.responses
            .lock()
            .unwrap()
            .get_mut(&(method.to_string(), path.to_string()))
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(ApiError::Network(format!(
                    "no scripted response for {} {}",
                    method, path
                )))
            })
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn get(&self, path: &str) -> ApiResult<Value> {
        self.take("GET", path, None)
    }

    async fn post(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.take("POST", path, Some(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_replays_responses_in_order() {
        let mock = MockTransport::new();
        mock.enqueue_ok("GET", "books", json!({"first": true}));
        mock.enqueue_ok("GET", "books", json!({"first": false}));

        assert_eq!(mock.get("books").await.unwrap(), json!({"first": true}));
        assert_eq!(mock.get("books").await.unwrap(), json!({"first": false}));
        assert!(mock.get("books").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_records_request_bodies() {
        let mock = MockTransport::new();
        mock.enqueue_ok("POST", "auth/login", json!({}));

        mock.post("auth/login", json!({"email": "a@b.com"}))
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].body, Some(json!({"email": "a@b.com"})));
    }
}
