//! Transport-level errors raised by LLM clients

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors that can occur while talking to an LLM provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BackendError {
    /// API request failed with the given message
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// Authentication failed or credentials are invalid
    AuthenticationError { message: String },

    /// Request timed out after the specified duration (in seconds)
    TimeoutError { seconds: u64 },

    /// Rate limit exceeded, retry after the specified duration (in seconds)
    RateLimitError { retry_after: Option<u64> },

    /// Invalid or malformed response from the LLM
    InvalidResponse {
        message: String,
        raw_response: Option<String>,
    },

    /// Configuration error (missing API keys, invalid settings, etc.)
    ConfigurationError { message: String },

    /// Network-related error
    NetworkError { message: String },

    /// Generic error for other cases
    Other { message: String },
}

impl BackendError {
    /// Best-effort classification of a provider error message.
    ///
    /// Providers surface HTTP failures as free-form strings, so the status code
    /// and a few well-known phrases are the only signals available.
    pub fn from_provider_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if lower.contains("401")
            || lower.contains("403")
            || lower.contains("unauthorized")
            || lower.contains("api key")
            || lower.contains("authentication")
        {
            BackendError::AuthenticationError { message }
        } else if lower.contains("429") || lower.contains("rate limit") {
            BackendError::RateLimitError { retry_after: None }
        } else if lower.contains("connection") || lower.contains("dns") {
            BackendError::NetworkError { message }
        } else {
            BackendError::ApiError {
                message,
                status_code: None,
            }
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::ApiError {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "API error ({}): {}", code, message)
                } else {
                    write!(f, "API error: {}", message)
                }
            }
            BackendError::AuthenticationError { message } => {
                write!(f, "Authentication failed: {}", message)
            }
            BackendError::TimeoutError { seconds } => {
                write!(f, "Request timed out after {} seconds", seconds)
            }
            BackendError::RateLimitError { retry_after } => {
                if let Some(seconds) = retry_after {
                    write!(f, "Rate limit exceeded, retry after {} seconds", seconds)
                } else {
                    write!(f, "Rate limit exceeded")
                }
            }
            BackendError::InvalidResponse { message, .. } => {
                write!(f, "Invalid response from LLM: {}", message)
            }
            BackendError::ConfigurationError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            BackendError::NetworkError { message } => {
                write!(f, "Network error: {}", message)
            }
            BackendError::Other { message } => {
                write!(f, "Error: {}", message)
            }
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_timeout() {
        let err = BackendError::TimeoutError { seconds: 30 };
        assert_eq!(err.to_string(), "Request timed out after 30 seconds");
    }

    #[test]
    fn test_display_api_error_with_status() {
        let err = BackendError::ApiError {
            message: "boom".to_string(),
            status_code: Some(500),
        };
        assert_eq!(err.to_string(), "API error (500): boom");
    }

    #[test]
    fn test_from_provider_message_auth() {
        let err = BackendError::from_provider_message("HTTP 401 Unauthorized");
        assert!(matches!(err, BackendError::AuthenticationError { .. }));
    }

    #[test]
    fn test_from_provider_message_rate_limit() {
        let err = BackendError::from_provider_message("status 429: slow down");
        assert!(matches!(err, BackendError::RateLimitError { .. }));
    }

    #[test]
    fn test_from_provider_message_fallback() {
        let err = BackendError::from_provider_message("model exploded");
        assert!(matches!(err, BackendError::ApiError { .. }));
    }
}
