//! OAuth sign-in flows and secret storage.

pub mod browser;
pub mod credentials;
pub mod device_code;
pub mod error;
pub mod manager;
pub mod pkce;
pub mod store;
pub mod token;

pub use browser::AuthBrowser;
pub use credentials::Credentials;
pub use device_code::{DeviceCodePoll, DeviceCodeSession};
pub use error::AuthError;
pub use manager::{AuthManager, AuthorizationRequest, Platform};
pub use pkce::PkceSession;
pub use store::{FileSecureStore, MemorySecureStore, SecureStore, SecureStoreConfig};
pub use token::{Token, TokenResponse};
