use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Token endpoint success payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    /// Absolute expiry computed from `expires_in`, relative to `now`.
    /// `None` when the server sent no lifetime or one too large to represent.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let secs = self.expires_in?;
        let expires_at =
            Duration::try_seconds(secs).and_then(|delta| now.checked_add_signed(delta));
        if expires_at.is_none() {
            tracing::warn!(expires_in = secs, "expires_in out of range; storing no expiry");
        }
        expires_at
    }
}

/// Token endpoint error payload (RFC 6749 §5.2).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Persisted token record.
///
/// Only ever assembled from a complete set of stored entries; see
/// [`Credentials::load_token`](super::credentials::Credentials::load_token).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
    pub user_email: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        let expires_at = response.expires_at(now);
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            user_id: response.user_id,
            user_email: response.user_email,
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| now >= exp).unwrap_or(false)
    }
}
