//! Error types for API calls.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

use crate::auth::AuthError;

/// Primary error type for every API client and pagination operation.
///
/// Each transport or decoding failure maps to its own variant so callers can
/// branch on the failure kind.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("No internet connection")]
    NoInternetConnection,

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("Decoding failed: {0}")]
    Decoding(#[source] serde_json::Error),

    #[error("Encoding failed: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("User ID not found")]
    MissingUserId,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("{0}")]
    Custom(String),
}

impl ApiError {
    /// Create an HTTP status error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoInternetConnection => ErrorCategory::Connectivity,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout => ErrorCategory::Timeout,
            Self::Http { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Http,
            },
            Self::Decoding(_) => ErrorCategory::Decoding,
            Self::Encoding(_) => ErrorCategory::Encoding,
            Self::InvalidUrl(_) | Self::InvalidRequest(_) => ErrorCategory::Request,
            Self::MissingUserId | Self::Authentication(_) => ErrorCategory::Authentication,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Storage(_) => ErrorCategory::Storage,
            Self::Custom(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Connectivity
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::RateLimit
                | ErrorCategory::Server
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Connectivity => RecoverySuggestion::CheckConnection,
            ErrorCategory::Network
            | ErrorCategory::Timeout
            | ErrorCategory::RateLimit
            | ErrorCategory::Server => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Authentication => RecoverySuggestion::SignInAgain,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            _ => RecoverySuggestion::ReportBug,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::NoInternetConnection
        } else if error.is_builder() {
            Self::InvalidRequest(error.to_string())
        } else if error.is_decode() {
            Self::Custom(format!("Failed to read response body: {error}"))
        } else {
            Self::Network(error)
        }
    }
}

impl From<serde_json::Error> for ApiError {
    /// Response bodies are the only place the crate parses JSON implicitly.
    fn from(error: serde_json::Error) -> Self {
        Self::Decoding(error)
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ApiError>;
