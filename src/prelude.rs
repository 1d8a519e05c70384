//! Convenience re-exports for common use.

pub use crate::auth::{
    AuthBrowser, AuthError, AuthManager, Credentials, DeviceCodeSession, FileSecureStore,
    MemorySecureStore, Platform, SecureStore,
};
pub use crate::client::ApiClient;
pub use crate::config::AppConfig;
pub use crate::error::{ApiError, Result};
pub use crate::pagination::{DiskCache, LoadOutcome, Paginator};
pub use crate::types::{Album, Movie, Page, PaginationMeta, PlaybackUpdate, Track};
pub use crate::util::retry::RetryPolicy;
