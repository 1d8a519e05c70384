#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use prasaddys::auth::{AuthBrowser, AuthError, Credentials, MemorySecureStore, SecureStore};
use reqwest::Url;
use serde_json::{json, Value};

/// Secret store that refuses writes to one account and records the rest in memory.
#[derive(Default)]
pub struct FailingStore {
    inner: MemorySecureStore,
    fail_account: String,
}

impl FailingStore {
    pub fn failing_on(account: &str) -> Self {
        Self {
            inner: MemorySecureStore::new(),
            fail_account: account.to_string(),
        }
    }
}

impl SecureStore for FailingStore {
    fn save(&self, data: &[u8], service: &str, account: &str) -> Result<(), AuthError> {
        if account == self.fail_account {
            return Err(AuthError::Storage(format!("refusing to write {account}")));
        }
        self.inner.save(data, service, account)
    }

    fn read(&self, service: &str, account: &str) -> Result<Option<Vec<u8>>, AuthError> {
        self.inner.read(service, account)
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), AuthError> {
        self.inner.delete(service, account)
    }
}

pub fn memory_credentials() -> Credentials {
    Credentials::new(Arc::new(MemorySecureStore::new()))
}

pub fn token_json(access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "refresh_token": format!("refresh-{access_token}"),
        "user_id": "u-1",
        "user_email": "me@example.com",
        "token_type": "Bearer",
        "expires_in": 3600
    })
}

/// Browser stand-in that replays a scripted outcome and records the
/// callback scheme it was asked to wait for.
pub struct FakeBrowser {
    script: BrowserScript,
    schemes: Mutex<Vec<String>>,
}

enum BrowserScript {
    Fixed(Mutex<Option<Result<Url, AuthError>>>),
    ApproveWithCode(String),
}

impl FakeBrowser {
    /// Return `outcome` from the first session.
    pub fn returning(outcome: Result<Url, AuthError>) -> Self {
        Self::with_script(BrowserScript::Fixed(Mutex::new(Some(outcome))))
    }

    /// Redirect to `{scheme}://callback?code=..&state=..`, echoing the
    /// issued state the way a real authorization server does.
    pub fn approving(code: &str) -> Self {
        Self::with_script(BrowserScript::ApproveWithCode(code.to_string()))
    }

    fn with_script(script: BrowserScript) -> Self {
        Self {
            script,
            schemes: Mutex::new(Vec::new()),
        }
    }

    pub fn schemes(&self) -> Vec<String> {
        self.schemes.lock().expect("browser lock poisoned").clone()
    }
}

#[async_trait]
impl AuthBrowser for FakeBrowser {
    async fn authenticate(&self, url: &Url, callback_scheme: &str) -> Result<Url, AuthError> {
        self.schemes
            .lock()
            .expect("browser lock poisoned")
            .push(callback_scheme.to_string());
        match &self.script {
            BrowserScript::Fixed(outcome) => outcome
                .lock()
                .expect("browser lock poisoned")
                .take()
                .unwrap_or(Err(AuthError::UserCancelled)),
            BrowserScript::ApproveWithCode(code) => {
                let state = url
                    .query_pairs()
                    .find(|(name, _)| name == "state")
                    .map(|(_, value)| value.into_owned())
                    .unwrap_or_default();
                let callback = Url::parse_with_params(
                    &format!("{callback_scheme}://callback"),
                    &[("code", code.as_str()), ("state", state.as_str())],
                )
                .expect("valid callback URL");
                Ok(callback)
            }
        }
    }
}
