use async_trait::async_trait;
use reqwest::Url;

use super::error::AuthError;

/// Host-provided browser session for the interactive PKCE flow.
///
/// Implementations open `url`, wait for a redirect to `callback_scheme`, and
/// return the full callback URL. A user dismissal maps to
/// [`AuthError::UserCancelled`]. Dropping the returned future must close the
/// session.
#[async_trait]
pub trait AuthBrowser: Send + Sync {
    async fn authenticate(&self, url: &Url, callback_scheme: &str) -> Result<Url, AuthError>;
}

/// Extract the scheme of a redirect URI such as `myapp://callback`.
pub fn callback_scheme(redirect_uri: &str) -> Result<String, AuthError> {
    Url::parse(redirect_uri)
        .map(|url| url.scheme().to_string())
        .map_err(|err| AuthError::InvalidUrl(format!("{redirect_uri}: {err}")))
}
