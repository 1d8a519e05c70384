//! CLI auth command handlers for login, status, logout and refresh.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::auth::{AuthBrowser, AuthError, AuthManager, Platform};
use crate::config::AppConfig;

use super::default_credentials;

/// Terminal stand-in for a browser session: prints the authorization URL and
/// reads the redirect URL the user pastes back.
#[derive(Debug, Default)]
pub struct ConsoleBrowser;

#[async_trait]
impl AuthBrowser for ConsoleBrowser {
    async fn authenticate(&self, url: &Url, callback_scheme: &str) -> Result<Url, AuthError> {
        println!("🔗 Open this URL in a browser:\n\n  {url}\n");
        println!("📋 After signing in, paste the {callback_scheme}:// URL you were redirected to:");

        let mut line = String::new();
        let read = BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await?;
        let line = line.trim();
        if read == 0 || line.is_empty() {
            return Err(AuthError::UserCancelled);
        }

        let callback =
            Url::parse(line).map_err(|err| AuthError::InvalidUrl(format!("{line}: {err}")))?;
        if callback.scheme() != callback_scheme {
            return Err(AuthError::InvalidUrl(format!(
                "expected a {callback_scheme}:// URL, got {}://",
                callback.scheme()
            )));
        }
        Ok(callback)
    }
}

/// Handle `prasaddys auth login`.
pub async fn handle_login(
    config: &AppConfig,
    device: bool,
    email: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let credentials = default_credentials();
    let platform = if device {
        Platform::RemoteControl
    } else {
        Platform::Interactive
    };
    let auth = AuthManager::from_config(config, platform, credentials.clone())?
        .with_browser(Arc::new(ConsoleBrowser));
    let device_id = credentials.device_uuid_or_create()?;

    match platform {
        Platform::RemoteControl => {
            let session = auth.start_device_code().await?;
            println!("🔗 Visit: {}", session.verification_uri);
            println!("📋 Enter code: {}", session.user_code);
            println!("⏳ Waiting for authorization...");
            auth.wait_for_device_token(&session, &device_id).await?;
        }
        Platform::Interactive => {
            let email = email.unwrap_or_default();
            auth.start_authorization(email, &device_id).await?;
        }
    }

    println!("✅ Login successful!");
    Ok(())
}

/// Handle `prasaddys auth status`.
pub async fn handle_status() -> Result<(), Box<dyn std::error::Error>> {
    let credentials = default_credentials();

    println!("🔐 Authentication Status\n");
    match credentials.load_token() {
        Ok(Some(token)) => {
            let status = match token.expires_at {
                Some(expires) if expires > chrono::Utc::now() => format!(
                    "✅ Logged in (expires {})",
                    expires.format("%Y-%m-%d %H:%M")
                ),
                Some(_) => "⚠️  Token expired (run `prasaddys auth refresh`)".to_string(),
                None => "✅ Logged in".to_string(),
            };
            println!("  Session: {status}");
            println!("  User: {}", token.user_id);
            if let Some(email) = token.user_email {
                println!("  Email: {email}");
            }
        }
        Ok(None) => println!("  Session: ❌ Not logged in"),
        Err(e) => println!("  Session: ⚠️  Error: {e}"),
    }
    match credentials.device_uuid() {
        Ok(Some(device)) => println!("  Device: {device}"),
        Ok(None) => println!("  Device: not registered"),
        Err(e) => println!("  Device: ⚠️  Error: {e}"),
    }
    Ok(())
}

/// Handle `prasaddys auth logout`.
pub async fn handle_logout(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let auth = AuthManager::from_config(config, Platform::RemoteControl, default_credentials())?;
    auth.logout()?;
    println!("✅ Logged out");
    Ok(())
}

/// Handle `prasaddys auth refresh`.
pub async fn handle_refresh(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let auth = AuthManager::from_config(config, Platform::RemoteControl, default_credentials())?;
    if !auth.is_logged_in()? {
        return Err(AuthError::NotLoggedIn.into());
    }
    let token = auth.refresh_access_token().await?;
    match token.expires_at {
        Some(expires) => println!("✅ Token refreshed (expires {})", expires.format("%Y-%m-%d %H:%M")),
        None => println!("✅ Token refreshed"),
    }
    Ok(())
}
