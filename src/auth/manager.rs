use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use reqwest::{StatusCode, Url};
use serde::Serialize;
use strum::{Display, EnumString};

use super::browser::{callback_scheme, AuthBrowser};
use super::credentials::Credentials;
use super::device_code::{DeviceAuthorizationResponse, DeviceCodePoll, DeviceCodeSession};
use super::error::AuthError;
use super::pkce::PkceSession;
use super::token::{Token, TokenErrorResponse, TokenResponse};
use crate::config::AppConfig;
use crate::error::ApiError;

const AUTHORIZE_PATH: &str = "/authorize";
const TOKEN_PATH: &str = "/token";
const DEVICE_AUTHORIZE_PATH: &str = "/device_authorize";
const SCOPE: &str = "read";
const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Which sign-in flow a host supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Platform {
    /// Browser redirect with PKCE.
    Interactive,
    /// Device authorization grant for input-constrained hosts.
    RemoteControl,
}

/// Authorization URL plus the PKCE state needed to complete it.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: Url,
    pub session: PkceSession,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeviceDetails<'a> {
    device_id: &'a str,
    device_type: &'a str,
    device_os_version: &'a str,
}

/// OAuth client for the media backend's auth server.
///
/// Tokens live only in the injected [`Credentials`]; the manager holds
/// nothing beyond method scope except a logout epoch used to fence
/// in-flight refreshes.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use prasaddys::auth::{AuthManager, Credentials, MemorySecureStore, Platform};
///
/// # async fn run() -> Result<(), prasaddys::auth::AuthError> {
/// let credentials = Credentials::new(Arc::new(MemorySecureStore::new()));
/// let auth = AuthManager::new("https://auth.example.com", "client", Platform::RemoteControl, credentials);
/// let session = auth.start_device_code().await?;
/// println!("Visit {} and enter {}", session.verification_uri, session.user_code);
/// let device_id = auth.credentials().device_uuid_or_create()?;
/// auth.wait_for_device_token(&session, &device_id).await?;
/// # Ok(())
/// # }
/// ```
pub struct AuthManager {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    redirect_uri: Option<String>,
    users_base_url: Option<String>,
    platform: Platform,
    credentials: Credentials,
    browser: Option<Arc<dyn AuthBrowser>>,
    session_epoch: Mutex<u64>,
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("base_url", &self.base_url)
            .field("platform", &self.platform)
            .field("browser", &self.browser.as_ref().map(|_| ".."))
            .finish_non_exhaustive()
    }
}

impl AuthManager {
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        platform: Platform,
        credentials: Credentials,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            redirect_uri: None,
            users_base_url: None,
            platform,
            credentials,
            browser: None,
            session_epoch: Mutex::new(0),
        }
    }

    /// Build from configuration. The interactive platform requires `REDIRECT_URI`.
    pub fn from_config(
        config: &AppConfig,
        platform: Platform,
        credentials: Credentials,
    ) -> Result<Self, ApiError> {
        let mut manager = Self::new(config.auth_url()?, config.client_id()?, platform, credentials)
            .with_users_base_url(config.users_base_url()?);
        if platform == Platform::Interactive {
            manager = manager.with_redirect_uri(config.redirect_uri()?);
        }
        Ok(manager)
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    pub fn with_users_base_url(mut self, url: impl Into<String>) -> Self {
        self.users_base_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn with_browser(mut self, browser: Arc<dyn AuthBrowser>) -> Self {
        self.browser = Some(browser);
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn require_platform(&self, platform: Platform) -> Result<(), AuthError> {
        if self.platform == platform {
            Ok(())
        } else {
            Err(AuthError::UnsupportedPlatform(self.platform.to_string()))
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // Interactive flow

    /// Generate PKCE state and build the authorization URL.
    pub fn begin_authorization(
        &self,
        email: &str,
        device_id: &str,
    ) -> Result<AuthorizationRequest, AuthError> {
        self.require_platform(Platform::Interactive)?;
        let redirect_uri = self
            .redirect_uri
            .as_deref()
            .ok_or_else(|| AuthError::InvalidUrl("redirect URI is not configured".to_string()))?;

        let session = PkceSession::generate()?;
        let challenge = session.code_challenge();
        let authorize_url = self.endpoint(AUTHORIZE_PATH);
        let url = Url::parse_with_params(
            &authorize_url,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("code_challenge", challenge.as_str()),
                ("code_challenge_method", "S256"),
                ("scope", SCOPE),
                ("state", session.state.as_str()),
                ("email", email),
                ("device_id", device_id),
            ],
        )
        .map_err(|err| AuthError::InvalidUrl(format!("{authorize_url}: {err}")))?;

        Ok(AuthorizationRequest { url, session })
    }

    /// Validate a redirect callback and exchange its code for tokens.
    ///
    /// The session is consumed: a failed attempt needs a fresh
    /// [`begin_authorization`](Self::begin_authorization).
    pub async fn complete_authorization(
        &self,
        session: PkceSession,
        callback_url: &Url,
    ) -> Result<Token, AuthError> {
        self.require_platform(Platform::Interactive)?;

        let mut code = None;
        let mut state = None;
        let mut error = None;
        let mut error_description = None;
        for (name, value) in callback_url.query_pairs() {
            match name.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                "error_description" => error_description = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(error) = error {
            return Err(AuthError::TokenRequestFailed(
                error_description.unwrap_or(error),
            ));
        }

        let (Some(code), Some(state)) = (code, state) else {
            return Err(AuthError::StateMismatch);
        };
        if !session.state_matches(&state) {
            tracing::warn!("authorization callback state mismatch");
            return Err(AuthError::StateMismatch);
        }

        let redirect_uri = self.redirect_uri.as_deref().unwrap_or_default();
        let response = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code.as_str()),
                ("client_id", self.client_id.as_str()),
                ("code_verifier", session.code_verifier.as_str()),
                ("redirect_uri", redirect_uri),
                ("state", session.state.as_str()),
            ])
            .await?;
        let token = self.persist(response)?;
        tracing::info!("authorization code exchanged");
        Ok(token)
    }

    /// Run the whole interactive flow through the configured [`AuthBrowser`].
    pub async fn start_authorization(&self, email: &str, device_id: &str) -> Result<Token, AuthError> {
        let browser = self.browser.clone().ok_or_else(|| {
            AuthError::UnsupportedPlatform(format!("{} without a browser", self.platform))
        })?;
        let request = self.begin_authorization(email, device_id)?;
        let scheme = callback_scheme(self.redirect_uri.as_deref().unwrap_or_default())?;

        tracing::debug!(scheme = %scheme, "opening authorization session");
        let callback = browser.authenticate(&request.url, &scheme).await?;
        self.complete_authorization(request.session, &callback).await
    }

    // Device flow

    /// Request a device code for display to the user.
    pub async fn start_device_code(&self) -> Result<DeviceCodeSession, AuthError> {
        self.require_platform(Platform::RemoteControl)?;
        let resp = self
            .client
            .post(self.endpoint(DEVICE_AUTHORIZE_PATH))
            .header("Accept", "application/json")
            .form(&[("client_id", self.client_id.as_str()), ("scope", SCOPE)])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(AuthError::TokenRequestFailed(failure_text(status, body)));
        }
        let payload: DeviceAuthorizationResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            interval = payload.interval,
            expires_in = payload.expires_in,
            "device code issued"
        );
        Ok(DeviceCodeSession::from_response(payload, Utc::now()))
    }

    /// Poll the token endpoint once.
    pub async fn poll_device_code(
        &self,
        session: &DeviceCodeSession,
        device_id: &str,
    ) -> Result<DeviceCodePoll, AuthError> {
        self.require_platform(Platform::RemoteControl)?;
        if session.is_expired(Utc::now()) {
            return Ok(DeviceCodePoll::Expired);
        }

        let sent = self
            .client
            .post(self.endpoint(TOKEN_PATH))
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", DEVICE_CODE_GRANT),
                ("device_code", session.device_code.as_str()),
                ("client_id", self.client_id.as_str()),
                ("deviceid", device_id),
            ])
            .send()
            .await;
        let resp = match sent {
            Ok(resp) => resp,
            Err(err) if err.is_timeout() => {
                tracing::debug!("device token poll timed out; retrying");
                return Ok(DeviceCodePoll::Pending {
                    interval_secs: session.interval_secs,
                });
            }
            Err(err) => return Err(err.into()),
        };

        let status = resp.status();
        let body = resp.text().await?;
        if status == StatusCode::OK {
            let payload: TokenResponse = serde_json::from_str(&body)?;
            let token = self.persist(payload)?;
            return Ok(DeviceCodePoll::Authorized { token });
        }

        let Ok(error) = serde_json::from_str::<TokenErrorResponse>(&body) else {
            return Err(AuthError::TokenRequestFailed(failure_text(status, body)));
        };
        tracing::debug!(error = %error.error, "device token poll");
        match error.error.as_str() {
            "authorization_pending" => Ok(DeviceCodePoll::Pending {
                interval_secs: session.interval_secs,
            }),
            "slow_down" => Ok(DeviceCodePoll::SlowDown {
                interval_secs: session.interval_secs,
            }),
            "expired_token" => Ok(DeviceCodePoll::Expired),
            _ => Err(AuthError::TokenRequestFailed(
                error.error_description.unwrap_or(error.error),
            )),
        }
    }

    /// Poll until the user authorizes the device or the code expires.
    ///
    /// Sleeps the session interval before every poll. Dropping the returned
    /// future stops polling. On success the device details are registered
    /// with the users API, best-effort.
    pub async fn wait_for_device_token(
        &self,
        session: &DeviceCodeSession,
        device_id: &str,
    ) -> Result<Token, AuthError> {
        let started = tokio::time::Instant::now();
        let lifetime = Duration::from_secs(session.expires_in_secs);
        let mut attempt = 0u32;

        loop {
            if started.elapsed() >= lifetime {
                tracing::warn!(attempt, "device code expired before authorization");
                return Err(AuthError::DeviceCodeExpired);
            }
            tokio::time::sleep(session.interval()).await;
            attempt += 1;

            match self.poll_device_code(session, device_id).await? {
                DeviceCodePoll::Pending { .. } | DeviceCodePoll::SlowDown { .. } => continue,
                DeviceCodePoll::Expired => return Err(AuthError::DeviceCodeExpired),
                DeviceCodePoll::Authorized { token } => {
                    tracing::info!(attempt, "device authorized");
                    if self.users_base_url.is_some() {
                        if let Err(err) = self.post_device_details().await {
                            tracing::warn!(error = %err, "failed to register device details");
                        }
                    }
                    return Ok(token);
                }
            }
        }
    }

    /// Register this device with the users API.
    pub async fn post_device_details(&self) -> Result<(), AuthError> {
        let users_base_url = self
            .users_base_url
            .as_deref()
            .ok_or_else(|| AuthError::InvalidUrl("users API URL is not configured".to_string()))?;
        let user_id = self.credentials.user_id()?.ok_or(AuthError::NotLoggedIn)?;
        let device_id = self.credentials.device_uuid_or_create()?;
        let device_type = self.credentials.device_model()?;
        let device_os_version = self.credentials.system_version()?;

        let url = format!("{users_base_url}/user/{user_id}/devices/device");
        let mut request = self.client.post(&url).json(&DeviceDetails {
            device_id: &device_id,
            device_type: &device_type,
            device_os_version: &device_os_version,
        });
        match self.credentials.access_token()? {
            Some(token) => request = request.bearer_auth(token),
            None => tracing::warn!("no access token for device registration"),
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::TokenRequestFailed(format!(
                "device registration failed: {}",
                failure_text(status, body)
            )));
        }
        tracing::debug!("device details registered");
        Ok(())
    }

    // Token lifecycle

    /// Exchange the stored refresh token for a new token set.
    ///
    /// A [`logout`](Self::logout) that lands while the request is in flight
    /// wins: nothing is written and [`AuthError::SessionInvalidated`] is
    /// returned.
    pub async fn refresh_access_token(&self) -> Result<Token, AuthError> {
        let epoch = self.current_epoch()?;
        let refresh_token = self
            .credentials
            .refresh_token()?
            .ok_or(AuthError::MissingTokenData)?;
        let email = self.credentials.user_email()?;
        let user_id = self.credentials.user_id()?;
        let device_id = self.credentials.device_uuid()?;

        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", self.client_id.as_str()),
        ];
        if let Some(email) = email.as_deref() {
            form.push(("email", email));
        }
        if let Some(user_id) = user_id.as_deref() {
            form.push(("userid", user_id));
        }
        if let Some(device_id) = device_id.as_deref() {
            form.push(("deviceid", device_id));
        }

        let response = self.request_token(&form).await?;

        let guard = self.lock_epoch()?;
        if *guard != epoch {
            tracing::info!("logout during refresh; discarding refreshed token");
            return Err(AuthError::SessionInvalidated);
        }
        let token = self.persist(response)?;
        drop(guard);
        tracing::info!("access token refreshed");
        Ok(token)
    }

    pub fn current_access_token(&self) -> Result<Option<String>, AuthError> {
        self.credentials.access_token()
    }

    pub fn user_id(&self) -> Result<Option<String>, AuthError> {
        self.credentials.user_id()
    }

    pub fn is_token_expired(&self) -> bool {
        self.credentials.is_token_expired()
    }

    pub fn is_logged_in(&self) -> Result<bool, AuthError> {
        Ok(self.credentials.load_token()?.is_some())
    }

    /// Remove every persisted session entry and fence in-flight refreshes.
    pub fn logout(&self) -> Result<(), AuthError> {
        let mut guard = self.lock_epoch()?;
        *guard += 1;
        let result = self.credentials.clear_session();
        drop(guard);
        tracing::info!("logged out");
        result
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let resp = self
            .client
            .post(self.endpoint(TOKEN_PATH))
            .header("Accept", "application/json")
            .form(form)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "token request failed");
            return Err(AuthError::TokenRequestFailed(failure_text(status, body)));
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn persist(&self, response: TokenResponse) -> Result<Token, AuthError> {
        let token = Token::from_response(response, Utc::now());
        self.credentials.save_token(&token)?;
        Ok(token)
    }

    fn lock_epoch(&self) -> Result<std::sync::MutexGuard<'_, u64>, AuthError> {
        self.session_epoch
            .lock()
            .map_err(|_| AuthError::Storage("session lock poisoned".to_string()))
    }

    fn current_epoch(&self) -> Result<u64, AuthError> {
        Ok(*self.lock_epoch()?)
    }
}

fn failure_text(status: StatusCode, body: String) -> String {
    if body.trim().is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemorySecureStore;

    fn manager(platform: Platform) -> AuthManager {
        let credentials = Credentials::new(Arc::new(MemorySecureStore::new()));
        AuthManager::new("https://auth.example.com/", "client-1", platform, credentials)
            .with_redirect_uri("prasaddys://callback")
    }

    #[test]
    fn authorization_url_carries_pkce_parameters() {
        let auth = manager(Platform::Interactive);
        let request = auth.begin_authorization("me@example.com", "DEVICE").unwrap();
        let pairs: std::collections::HashMap<_, _> = request.url.query_pairs().into_owned().collect();

        assert_eq!(request.url.path(), "/authorize");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["client_id"], "client-1");
        assert_eq!(pairs["redirect_uri"], "prasaddys://callback");
        assert_eq!(pairs["code_challenge"], request.session.code_challenge());
        assert_eq!(pairs["code_challenge_method"], "S256");
        assert_eq!(pairs["scope"], "read");
        assert_eq!(pairs["state"], request.session.state);
        assert_eq!(pairs["email"], "me@example.com");
        assert_eq!(pairs["device_id"], "DEVICE");
    }

    #[tokio::test]
    async fn device_flow_is_rejected_on_interactive_platform() {
        let auth = manager(Platform::Interactive);
        let result = auth.start_device_code().await;
        assert!(matches!(result, Err(AuthError::UnsupportedPlatform(p)) if p == "interactive"));
    }

    #[test]
    fn pkce_flow_is_rejected_on_remote_control_platform() {
        let auth = manager(Platform::RemoteControl);
        assert!(matches!(
            auth.begin_authorization("me@example.com", "DEVICE"),
            Err(AuthError::UnsupportedPlatform(p)) if p == "remote_control"
        ));
    }

    #[tokio::test]
    async fn callback_without_state_is_rejected() {
        let auth = manager(Platform::Interactive);
        let request = auth.begin_authorization("me@example.com", "DEVICE").unwrap();
        let callback = Url::parse("prasaddys://callback?code=abc").unwrap();
        let result = auth.complete_authorization(request.session, &callback).await;
        assert!(matches!(result, Err(AuthError::StateMismatch)));
    }

    #[tokio::test]
    async fn logout_clears_session_entries() {
        let auth = manager(Platform::Interactive);
        auth.credentials()
            .save_token(&Token {
                access_token: "a".into(),
                refresh_token: "r".into(),
                user_id: "u".into(),
                user_email: None,
                expires_at: None,
            })
            .unwrap();
        assert!(auth.is_logged_in().unwrap());
        auth.logout().unwrap();
        assert!(!auth.is_logged_in().unwrap());
        assert!(auth.current_access_token().unwrap().is_none());
    }
}
