//! Typed access to the secrets kept in a [`SecureStore`].

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::error::AuthError;
use super::store::SecureStore;
use super::token::Token;

/// Secure-storage namespaces, one (service, account) pair per secret.
pub mod keys {
    pub type Key = (&'static str, &'static str);

    pub const ACCESS_TOKEN: Key = ("accessTokenService", "accessToken");
    pub const REFRESH_TOKEN: Key = ("refreshTokenService", "refreshToken");
    pub const ACCESS_TOKEN_EXPIRY: Key = ("accessTokenExpiryService", "accessTokenExpiry");
    pub const USER_ID: Key = ("UserIdService", "UserId");
    pub const USER_EMAIL: Key = ("UserEmail", "AuthenticatedUserEmail");
    pub const DEVICE_UUID: Key = ("deviceService", "deviceUUIDAccount");
    pub const OS_MODEL: Key = ("OsModelService", "OsModelAccount");
    pub const OS_VERSION: Key = ("OsSystemVersionService", "OsSystemVersionAccount");

    /// Entries removed on logout.
    pub const SESSION: [Key; 5] = [
        ACCESS_TOKEN,
        REFRESH_TOKEN,
        ACCESS_TOKEN_EXPIRY,
        USER_ID,
        USER_EMAIL,
    ];
}

use keys::Key;

/// Cheap-to-clone handle over the injected secret store.
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn SecureStore>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn new(store: Arc<dyn SecureStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SecureStore> {
        &self.store
    }

    pub fn read_string(&self, key: Key) -> Result<Option<String>, AuthError> {
        let Some(bytes) = self.store.read(key.0, key.1)? else {
            return Ok(None);
        };
        let value = String::from_utf8(bytes)
            .map_err(|err| AuthError::Serialization(format!("{}: {err}", key.1)))?;
        Ok(Some(value).filter(|v| !v.is_empty()))
    }

    pub fn save_string(&self, key: Key, value: &str) -> Result<(), AuthError> {
        self.store.save(value.as_bytes(), key.0, key.1)
    }

    pub fn delete(&self, key: Key) -> Result<(), AuthError> {
        self.store.delete(key.0, key.1)
    }

    pub fn access_token(&self) -> Result<Option<String>, AuthError> {
        self.read_string(keys::ACCESS_TOKEN)
    }

    pub fn refresh_token(&self) -> Result<Option<String>, AuthError> {
        self.read_string(keys::REFRESH_TOKEN)
    }

    pub fn user_id(&self) -> Result<Option<String>, AuthError> {
        self.read_string(keys::USER_ID)
    }

    pub fn user_email(&self) -> Result<Option<String>, AuthError> {
        self.read_string(keys::USER_EMAIL)
    }

    pub fn save_user_email(&self, email: &str) -> Result<(), AuthError> {
        self.save_string(keys::USER_EMAIL, email)
    }

    /// Persist an absolute expiry as RFC 3339 bytes.
    pub fn save_expiry(&self, expires_at: DateTime<Utc>) -> Result<(), AuthError> {
        self.save_string(keys::ACCESS_TOKEN_EXPIRY, &expires_at.to_rfc3339())
    }

    pub fn expiry(&self) -> Result<Option<DateTime<Utc>>, AuthError> {
        let Some(raw) = self.read_string(keys::ACCESS_TOKEN_EXPIRY)? else {
            return Ok(None);
        };
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|err| AuthError::Serialization(format!("token expiry: {err}")))
    }

    /// A missing or unreadable expiry counts as expired.
    pub fn is_token_expired(&self) -> bool {
        match self.expiry() {
            Ok(Some(expires_at)) => Utc::now() >= expires_at,
            Ok(None) => {
                tracing::debug!("no token expiry stored; treating token as expired");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "unreadable token expiry; treating token as expired");
                true
            }
        }
    }

    /// Persist a token set all-or-nothing.
    ///
    /// A token for a different user without an email drops the stored email.
    /// Every field is attempted. If any write fails, entries already written
    /// by this call are removed and [`AuthError::TokenPersistenceFailed`] is
    /// returned, so readers never see a mixed record.
    pub fn save_token(&self, token: &Token) -> Result<(), AuthError> {
        if token.access_token.is_empty()
            || token.refresh_token.is_empty()
            || token.user_id.is_empty()
        {
            return Err(AuthError::MissingTokenData);
        }

        let previous_user = self.user_id().ok().flatten();
        let mut entries: Vec<(Key, String)> = vec![
            (keys::ACCESS_TOKEN, token.access_token.clone()),
            (keys::REFRESH_TOKEN, token.refresh_token.clone()),
            (keys::USER_ID, token.user_id.clone()),
        ];
        if let Some(email) = token.user_email.as_deref().filter(|e| !e.is_empty()) {
            entries.push((keys::USER_EMAIL, email.to_string()));
        }

        let mut written = Vec::with_capacity(entries.len());
        let mut failed = false;
        for (key, value) in &entries {
            match self.save_string(*key, value) {
                Ok(()) => written.push(*key),
                Err(err) => {
                    tracing::warn!(account = key.1, error = %err, "failed to persist token field");
                    failed = true;
                }
            }
        }

        if failed {
            for key in written {
                if let Err(err) = self.delete(key) {
                    tracing::warn!(account = key.1, error = %err, "rollback of token field failed");
                }
            }
            return Err(AuthError::TokenPersistenceFailed);
        }

        let has_email = token.user_email.as_deref().is_some_and(|e| !e.is_empty());
        if !has_email && previous_user.as_deref() != Some(token.user_id.as_str()) {
            if let Err(err) = self.delete(keys::USER_EMAIL) {
                tracing::warn!(error = %err, "failed to drop previous user's email");
            }
        }

        if let Some(expires_at) = token.expires_at {
            if let Err(err) = self.save_expiry(expires_at) {
                tracing::warn!(error = %err, "failed to persist token expiry");
            }
        }

        tracing::debug!("token set persisted");
        Ok(())
    }

    /// Load the token record; `None` unless access, refresh and user id all exist.
    pub fn load_token(&self) -> Result<Option<Token>, AuthError> {
        let (Some(access_token), Some(refresh_token), Some(user_id)) =
            (self.access_token()?, self.refresh_token()?, self.user_id()?)
        else {
            return Ok(None);
        };
        Ok(Some(Token {
            access_token,
            refresh_token,
            user_id,
            user_email: self.user_email()?,
            expires_at: self.expiry().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "unreadable token expiry; loading token without it");
                None
            }),
        }))
    }

    /// Delete every session entry. All deletes are attempted; the first
    /// failure is returned.
    pub fn clear_session(&self) -> Result<(), AuthError> {
        let mut first_error = None;
        for key in keys::SESSION {
            if let Err(err) = self.delete(key) {
                tracing::warn!(account = key.1, error = %err, "failed to delete session entry");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Stable per-install device identifier, created on first use.
    pub fn device_uuid_or_create(&self) -> Result<String, AuthError> {
        if let Some(existing) = self.read_string(keys::DEVICE_UUID)? {
            return Ok(existing);
        }
        let fresh = uuid::Uuid::new_v4().to_string().to_uppercase();
        self.save_string(keys::DEVICE_UUID, &fresh)?;
        Ok(fresh)
    }

    pub fn device_uuid(&self) -> Result<Option<String>, AuthError> {
        self.read_string(keys::DEVICE_UUID)
    }

    pub fn device_model(&self) -> Result<String, AuthError> {
        self.read_or_init(keys::OS_MODEL, || {
            format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
        })
    }

    pub fn system_version(&self) -> Result<String, AuthError> {
        self.read_or_init(keys::OS_VERSION, || {
            format!("{} {}", std::env::consts::FAMILY, std::env::consts::OS)
        })
    }

    fn read_or_init(&self, key: Key, init: impl FnOnce() -> String) -> Result<String, AuthError> {
        if let Some(existing) = self.read_string(key)? {
            return Ok(existing);
        }
        let value = init();
        if let Err(err) = self.save_string(key, &value) {
            tracing::warn!(account = key.1, error = %err, "failed to cache device attribute");
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemorySecureStore;
    use chrono::Duration;

    fn credentials() -> Credentials {
        Credentials::new(Arc::new(MemorySecureStore::new()))
    }

    fn token() -> Token {
        Token {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            user_id: "user-1".to_string(),
            user_email: Some("me@example.com".to_string()),
            expires_at: None,
        }
    }

    #[test]
    fn save_then_load_token() {
        let creds = credentials();
        creds.save_token(&token()).unwrap();
        let loaded = creds.load_token().unwrap().unwrap();
        assert_eq!(loaded.access_token, "access");
        assert_eq!(loaded.user_email.as_deref(), Some("me@example.com"));
    }

    #[test]
    fn empty_field_is_missing_token_data() {
        let creds = credentials();
        let mut incomplete = token();
        incomplete.user_id.clear();
        assert!(matches!(
            creds.save_token(&incomplete),
            Err(AuthError::MissingTokenData)
        ));
        assert!(creds.access_token().unwrap().is_none());
    }

    #[test]
    fn expiry_round_trips_as_date() {
        let creds = credentials();
        let future = Utc::now() + Duration::hours(1);
        creds.save_expiry(future).unwrap();
        assert_eq!(
            creds.expiry().unwrap().map(|d| d.timestamp()),
            Some(future.timestamp())
        );
        assert!(!creds.is_token_expired());
    }

    #[test]
    fn missing_expiry_counts_as_expired() {
        assert!(credentials().is_token_expired());
    }

    #[test]
    fn clear_session_keeps_device_identity() {
        let creds = credentials();
        creds.save_token(&token()).unwrap();
        let uuid = creds.device_uuid_or_create().unwrap();
        creds.clear_session().unwrap();
        assert!(creds.load_token().unwrap().is_none());
        assert!(creds.user_email().unwrap().is_none());
        assert_eq!(creds.device_uuid().unwrap(), Some(uuid));
    }

    #[test]
    fn new_user_without_email_drops_previous_email() {
        let creds = credentials();
        creds.save_token(&token()).unwrap();

        let mut other = token();
        other.user_id = "user-2".to_string();
        other.user_email = None;
        creds.save_token(&other).unwrap();

        assert_eq!(creds.user_id().unwrap().as_deref(), Some("user-2"));
        assert!(creds.user_email().unwrap().is_none());
    }

    #[test]
    fn same_user_without_email_keeps_stored_email() {
        let creds = credentials();
        creds.save_token(&token()).unwrap();

        let mut refreshed = token();
        refreshed.access_token = "access-2".to_string();
        refreshed.user_email = None;
        creds.save_token(&refreshed).unwrap();

        assert_eq!(creds.user_email().unwrap().as_deref(), Some("me@example.com"));
    }

    #[test]
    fn corrupt_expiry_loads_token_without_expiry() {
        let creds = credentials();
        creds.save_token(&token()).unwrap();
        creds
            .save_string(keys::ACCESS_TOKEN_EXPIRY, "not-a-date")
            .unwrap();

        let loaded = creds.load_token().unwrap().unwrap();
        assert!(loaded.expires_at.is_none());
        assert!(creds.is_token_expired());
    }

    #[test]
    fn device_uuid_is_created_once() {
        let creds = credentials();
        let first = creds.device_uuid_or_create().unwrap();
        let second = creds.device_uuid_or_create().unwrap();
        assert_eq!(first, second);
        assert!(uuid::Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn device_attributes_are_cached() {
        let creds = credentials();
        let model = creds.device_model().unwrap();
        assert_eq!(creds.read_string(keys::OS_MODEL).unwrap(), Some(model));
        assert!(!creds.system_version().unwrap().is_empty());
    }
}
