//! Prasaddys: client SDK for the Prasaddys media backend.
//!
//! Signs users in with OAuth2 (PKCE in a browser, or the device
//! authorization grant on remote-control hosts), keeps tokens in a secure
//! store, and fetches paginated media metadata as typed records.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use prasaddys::prelude::*;
//!
//! # async fn example() -> prasaddys::error::Result<()> {
//! let config = AppConfig::load()?;
//! config.validate(false)?;
//! let credentials = Credentials::new(Arc::new(FileSecureStore::new_default()));
//!
//! let auth = AuthManager::from_config(&config, Platform::RemoteControl, credentials.clone())?;
//! let session = auth.start_device_code().await?;
//! println!("Open {} and enter {}", session.verification_uri, session.user_code);
//! auth.wait_for_device_token(&session, &credentials.device_uuid_or_create()?).await?;
//!
//! let client = ApiClient::from_config(&config)?.with_credentials(credentials);
//! let albums = client.fetch_albums(1, 20).await?;
//! println!("{} albums on page 1", albums.items.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod pagination;
pub mod prelude;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
