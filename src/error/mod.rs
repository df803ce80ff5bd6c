//! Centralized error handling for the AuthorHub client
//!
//! One taxonomy covers every failure the session and flow layers can surface:
//! local validation, rejected credentials, unreachable network, structured
//! server errors, and the two payment-specific outcomes that must never be
//! conflated with ordinary faults.

use thiserror::Error;

/// Client error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Local validation failure; never reaches the network layer.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The server rejected the credentials or token.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The request never reached the server.
    #[error("Could not reach the server: {0}. Please check your connection")]
    Network(String),

    /// Non-2xx response with a structured message and optional detail list.
    #[error("Server error ({status}): {message}")]
    Server {
        status: u16,
        message: String,
        /// Field-level validation details; rendered in full, never summarized.
        details: Vec<String>,
    },

    /// The user dismissed the payment widget. Not a fault.
    #[error("Payment cancelled")]
    PaymentCancelled,

    /// Server-side payment verification failed after the gateway reported
    /// success. Funds may have moved; the user must contact support rather
    /// than retry.
    #[error("Payment verification failed: {0}. Please contact support")]
    PaymentVerificationFailed(String),

    /// Durable credential storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Auth(_) => "AUTH_ERROR",
            ApiError::Network(_) => "NETWORK_ERROR",
            ApiError::Server { .. } => "SERVER_ERROR",
            ApiError::PaymentCancelled => "PAYMENT_CANCELLED",
            ApiError::PaymentVerificationFailed(_) => "PAYMENT_VERIFICATION_FAILED",
            ApiError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Whether this error means the current credential is invalid or expired.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }

    /// Detail list from a structured server error, empty otherwise.
    pub fn details(&self) -> &[String] {
        match self {
            ApiError::Server { details, .. } => details,
            _ => &[],
        }
    }
}

// Convenience conversions from common error types

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ApiError::Network(err.to_string())
        } else if err.is_decode() {
            ApiError::Server {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                message: format!("Malformed response: {}", err),
                details: Vec::new(),
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Server {
            status: 0,
            message: format!("Unexpected response shape: {}", err),
            details: Vec::new(),
        }
    }
}

/// Result type alias using ApiError
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ApiError::Validation("test".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            ApiError::Auth("test".to_string()).error_code(),
            "AUTH_ERROR"
        );
        assert_eq!(ApiError::PaymentCancelled.error_code(), "PAYMENT_CANCELLED");
        assert_eq!(
            ApiError::PaymentVerificationFailed("sig mismatch".to_string()).error_code(),
            "PAYMENT_VERIFICATION_FAILED"
        );
    }

    #[test]
    fn test_network_error_message_mentions_connection() {
        let err = ApiError::Network("dns failure".to_string());
        assert!(err.to_string().contains("check your connection"));
    }

    #[test]
    fn test_server_details_are_preserved() {
        let err = ApiError::Server {
            status: 422,
            message: "Order failed".to_string(),
            details: vec![
                "quantity must be positive".to_string(),
                "bookId is required".to_string(),
            ],
        };
        assert_eq!(err.details().len(), 2);
        assert_eq!(err.details()[1], "bookId is required");
    }

    #[test]
    fn test_is_auth() {
        assert!(ApiError::Auth("expired".to_string()).is_auth());
        assert!(!ApiError::Network("down".to_string()).is_auth());
    }
}
