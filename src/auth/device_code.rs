use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use super::Token;

/// Device-authorization endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceAuthorizationResponse {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub expires_in: u64,
    #[serde(default = "default_interval")]
    pub interval: u64,
}

fn default_interval() -> u64 {
    5
}

/// Device-code session details shown to the user while polling.
///
/// # Example
/// ```no_run
/// use prasaddys::auth::DeviceCodeSession;
/// use chrono::Utc;
///
/// let session = DeviceCodeSession {
///     verification_uri: "https://auth.example.com/device".to_string(),
///     user_code: "ABCD-EFGH".to_string(),
///     device_code: "device-code".to_string(),
///     interval_secs: 5,
///     expires_in_secs: 600,
///     issued_at: Utc::now(),
/// };
/// assert!(!session.is_expired(Utc::now()));
/// ```
#[derive(Debug, Clone)]
pub struct DeviceCodeSession {
    pub verification_uri: String,
    pub user_code: String,
    pub device_code: String,
    pub interval_secs: u64,
    pub expires_in_secs: u64,
    pub issued_at: DateTime<Utc>,
}

impl DeviceCodeSession {
    pub fn from_response(response: DeviceAuthorizationResponse, issued_at: DateTime<Utc>) -> Self {
        Self {
            verification_uri: response.verification_uri,
            user_code: response.user_code,
            device_code: response.device_code,
            interval_secs: response.interval,
            expires_in_secs: response.expires_in,
            issued_at,
        }
    }

    /// Saturates at the latest representable instant for absurd lifetimes.
    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.expires_in_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|delta| self.issued_at.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    pub fn interval(&self) -> StdDuration {
        StdDuration::from_secs(self.interval_secs)
    }
}

/// Polling outcome for a device-code session.
#[derive(Debug, Clone)]
pub enum DeviceCodePoll {
    Pending { interval_secs: u64 },
    SlowDown { interval_secs: u64 },
    Authorized { token: Token },
    Expired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_interval_defaults_to_five_seconds() {
        let response: DeviceAuthorizationResponse = serde_json::from_str(
            r#"{"device_code":"d","user_code":"U","verification_uri":"https://v","expires_in":600}"#,
        )
        .unwrap();
        assert_eq!(response.interval, 5);
    }

    #[test]
    fn session_expires_after_expires_in() {
        let issued_at = Utc::now();
        let response = DeviceAuthorizationResponse {
            device_code: "d".into(),
            user_code: "U".into(),
            verification_uri: "https://v".into(),
            expires_in: 10,
            interval: 1,
        };
        let session = DeviceCodeSession::from_response(response, issued_at);
        assert!(!session.is_expired(issued_at + Duration::seconds(9)));
        assert!(session.is_expired(issued_at + Duration::seconds(10)));
    }

    #[test]
    fn huge_lifetime_saturates_instead_of_overflowing() {
        let issued_at = Utc::now();
        let response = DeviceAuthorizationResponse {
            device_code: "d".into(),
            user_code: "U".into(),
            verification_uri: "https://v".into(),
            expires_in: u64::MAX,
            interval: 5,
        };
        let session = DeviceCodeSession::from_response(response, issued_at);
        assert_eq!(session.expires_at(), DateTime::<Utc>::MAX_UTC);
        assert!(!session.is_expired(issued_at + Duration::days(365)));
    }
}
