use std::collections::HashMap;
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use super::error::AuthError;

/// Secret storage capability keyed by a (service, account) pair.
///
/// `save` overwrites any existing entry. `read` returns `Ok(None)` for a key
/// that was never written. `delete` of a missing key succeeds.
pub trait SecureStore: Send + Sync {
    fn save(&self, data: &[u8], service: &str, account: &str) -> Result<(), AuthError>;
    fn read(&self, service: &str, account: &str) -> Result<Option<Vec<u8>>, AuthError>;
    fn delete(&self, service: &str, account: &str) -> Result<(), AuthError>;
}

/// Configuration for file-backed secret storage.
#[derive(Debug, Clone)]
pub struct SecureStoreConfig {
    pub base_dir: PathBuf,
}

impl SecureStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_secure_dir()
    }
}

/// File-backed secret store: one owner-only file per entry.
///
/// All operations go through a single mutex so a read never observes a
/// half-replaced entry.
///
/// # Example
/// ```no_run
/// use prasaddys::auth::{FileSecureStore, SecureStore};
///
/// let store = FileSecureStore::new_default();
/// store.save(b"secret", "accessTokenService", "accessToken")?;
/// # Ok::<(), prasaddys::auth::AuthError>(())
/// ```
#[derive(Debug)]
pub struct FileSecureStore {
    base_dir: PathBuf,
    lock: Mutex<()>,
}

impl FileSecureStore {
    pub fn new(config: SecureStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
            lock: Mutex::new(()),
        }
    }

    pub fn new_default() -> Self {
        Self::new(SecureStoreConfig::new(default_secure_dir()))
    }

    fn entry_path(&self, service: &str, account: &str) -> PathBuf {
        let name = format!(
            "{}.{}.secret",
            normalize_label(service),
            normalize_label(account)
        );
        self.base_dir.join(name)
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>, AuthError> {
        self.lock
            .lock()
            .map_err(|_| AuthError::Storage("secure store lock poisoned".to_string()))
    }
}

impl SecureStore for FileSecureStore {
    fn save(&self, data: &[u8], service: &str, account: &str) -> Result<(), AuthError> {
        let _guard = self.guard()?;
        let path = self.entry_path(service, account);
        atomic_write(&path, data).map_err(|err| {
            tracing::warn!(service, account, error = %err, "secure store save failed");
            AuthError::Storage(err.to_string())
        })
    }

    fn read(&self, service: &str, account: &str) -> Result<Option<Vec<u8>>, AuthError> {
        let _guard = self.guard()?;
        let path = self.entry_path(service, account);
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => {
                tracing::warn!(service, account, error = %err, "secure store read failed");
                Err(AuthError::Storage(err.to_string()))
            }
        }
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), AuthError> {
        let _guard = self.guard()?;
        let path = self.entry_path(service, account);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Storage(err.to_string())),
        }
    }
}

/// In-memory secret store for hosts without a secure facility, and for tests.
#[derive(Debug, Default)]
pub struct MemorySecureStore {
    entries: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemorySecureStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<(String, String), Vec<u8>>>, AuthError> {
        self.entries
            .lock()
            .map_err(|_| AuthError::Storage("secure store lock poisoned".to_string()))
    }
}

impl SecureStore for MemorySecureStore {
    fn save(&self, data: &[u8], service: &str, account: &str) -> Result<(), AuthError> {
        self.entries()?
            .insert((service.to_string(), account.to_string()), data.to_vec());
        Ok(())
    }

    fn read(&self, service: &str, account: &str) -> Result<Option<Vec<u8>>, AuthError> {
        Ok(self
            .entries()?
            .get(&(service.to_string(), account.to_string()))
            .cloned())
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), AuthError> {
        self.entries()?
            .remove(&(service.to_string(), account.to_string()));
        Ok(())
    }
}

fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "entry".to_string());
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_path = path.with_file_name(format!(
        ".{file_name}.tmp-{}-{nonce}",
        std::process::id()
    ));

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let write_result = (|| -> std::io::Result<()> {
        let mut temp_file = options.open(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.sync_all()?;
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

    Ok(())
}

fn default_secure_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".prasaddys").join("secure"))
        .unwrap_or_else(|| PathBuf::from(".prasaddys/secure"))
}

fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    trimmed
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '-'
            }
        })
        .collect()
}
