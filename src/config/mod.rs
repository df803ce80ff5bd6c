//! API endpoint configuration
//!
//! Resolves full endpoint URLs from a configured base URL. The base is loaded
//! from the environment with a development fallback, mirroring how the portal
//! backend is addressed in every deployment tier.

use std::env;

/// Fallback base URL for local development
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Environment variable holding the backend base URL
pub const API_URL_ENV: &str = "AUTHORHUB_API_URL";

/// Backend endpoint configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    /// Create a config from an explicit base URL.
    ///
    /// Trailing slashes are stripped at construction so that URL resolution
    /// can never produce a double slash.
    pub fn new(base_url: impl Into<String>) -> Self {
        let raw = base_url.into();
        Self {
            base_url: raw.trim_end_matches('/').to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file if present, then `AUTHORHUB_API_URL`, falling back
    /// to the local development backend.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        match env::var(API_URL_ENV) {
            Ok(url) => Self::new(url),
            Err(_) => Self::new(DEFAULT_API_URL),
        }
    }

    /// The configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a relative endpoint path into a full URL.
    ///
    /// Tolerates leading and trailing slashes on `path`: exactly one slash
    /// separates the base from the path in the result.
    pub fn resolve_url(&self, path: &str) -> String {
        let clean = path.trim_start_matches('/').trim_end_matches('/');
        format!("{}/{}", self.base_url, clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url_is_slash_insensitive() {
        let config = ApiConfig::new("http://localhost:5000/api");

        assert_eq!(
            config.resolve_url("books"),
            "http://localhost:5000/api/books"
        );
        assert_eq!(
            config.resolve_url("/books"),
            "http://localhost:5000/api/books"
        );
        assert_eq!(
            config.resolve_url("books/"),
            "http://localhost:5000/api/books"
        );
    }

    #[test]
    fn test_trailing_slash_on_base_is_stripped() {
        let config = ApiConfig::new("http://localhost:5000/api/");
        assert_eq!(config.base_url(), "http://localhost:5000/api");
        assert_eq!(
            config.resolve_url("auth/login"),
            "http://localhost:5000/api/auth/login"
        );
    }

    #[test]
    fn test_resolve_url_is_idempotent_on_nested_paths() {
        let config = ApiConfig::new("http://localhost:5000/api");
        let first = config.resolve_url("orders/verify-payment");
        let second = config.resolve_url("/orders/verify-payment/");
        assert_eq!(first, second);
        assert!(!first.contains("//orders"));
    }

    #[test]
    fn test_resolve_url_keeps_query_strings() {
        let config = ApiConfig::new("http://localhost:5000/api");
        assert_eq!(
            config.resolve_url("author/purchases?page=2&timeframe=month"),
            "http://localhost:5000/api/author/purchases?page=2&timeframe=month"
        );
    }
}
