//! Transport trait definition

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiResult;

/// Trait for backend request execution
///
/// Implementations can be:
/// - `HttpTransport` for production
/// - `MockTransport` for testing
///
/// Paths are relative to the configured base URL (`auth/login`, `books`, ...).
/// Success resolves to the parsed JSON body; failures carry the full error
/// taxonomy, including any server-provided detail list.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Execute a GET request.
    async fn get(&self, path: &str) -> ApiResult<Value>;

    /// Execute a POST request with a JSON body.
    async fn post(&self, path: &str, body: Value) -> ApiResult<Value>;
}
