use thiserror::Error;

/// Authentication and credential-storage errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("The URL for the request is invalid: {0}")]
    InvalidUrl(String),
    #[error("The returned state does not match the original state")]
    StateMismatch,
    #[error("Required token data is missing")]
    MissingTokenData,
    #[error("Token request failed: {0}")]
    TokenRequestFailed(String),
    #[error("Failed to save token data to secure storage")]
    TokenPersistenceFailed,
    #[error("Failed to generate a state parameter")]
    StateGenerationFailed,
    #[error("This authentication flow is not supported on the {0} platform")]
    UnsupportedPlatform(String),
    #[error("The user cancelled the authentication process")]
    UserCancelled,
    #[error("The device code expired before the user authorized it")]
    DeviceCodeExpired,
    #[error("The session was invalidated by a logout while a refresh was in flight")]
    SessionInvalidated,
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(error.to_string())
        }
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Storage(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
