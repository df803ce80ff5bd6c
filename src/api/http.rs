//! HTTP transport backed by reqwest

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::storage::CredentialStore;

use super::transport::ApiTransport;

/// Real transport for the portal backend
pub struct HttpTransport {
    client: Client,
    config: ApiConfig,
    store: Arc<dyn CredentialStore>,
}

impl HttpTransport {
    pub fn new(config: ApiConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            client: Client::new(),
            config,
            store,
        }
    }

    /// Request headers for the current session.
    ///
    /// Always `Content-Type: application/json`; the `Authorization` header is
    /// attached only when a credential exists, never as `Bearer` with an
    /// empty or placeholder token.
    pub fn auth_headers(&self) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = self.store.token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::Storage(format!("Invalid stored credential: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    async fn handle_response(&self, response: Response) -> ApiResult<Value> {
        let status = response.status();

        if status.is_success() {
            if status == StatusCode::NO_CONTENT {
                return Ok(Value::Null);
            }
            let text = response.text().await?;
            if text.is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_str(&text)?);
        }

        // Non-2xx: pull the structured {message, details} body if there is one.
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        let details: Vec<String> = body
            .get("details")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::debug!(status = %status, "Request rejected as unauthenticated");
            return Err(ApiError::Auth(message));
        }

        Err(ApiError::Server {
            status: status.as_u16(),
            message,
            details,
        })
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn get(&self, path: &str) -> ApiResult<Value> {
        let url = self.config.resolve_url(path);
        let headers = self.auth_headers()?;
        let response = self.client.get(&url).headers(headers).send().await?;
        self.handle_response(response).await
    }

    async fn post(&self, path: &str, body: Value) -> ApiResult<Value> {
        let url = self.config.resolve_url(path);
        let headers = self.auth_headers()?;
        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await?;
        self.handle_response(response).await
    }
}
