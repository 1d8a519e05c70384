//! Opaque byte cache keyed by request URL.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One file per cached URL, named by the SHA-256 of the URL.
///
/// There is no expiry; [`clear`](Self::clear) wipes everything.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.prasaddys/cache/pages`
    pub fn new_default() -> Self {
        Self::new(crate::config::prasaddys_home().join("cache").join("pages"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn key_for(url: &str) -> String {
        hex_encode(&Sha256::digest(url.as_bytes()))
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(Self::key_for(url))
    }

    pub fn read(&self, url: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(url)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub fn write(&self, url: &str, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(url);
        let temp_path = path.with_extension(format!(
            "tmp-{}-{}",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&temp_path, bytes)?;
        if let Err(err) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(err);
        }
        Ok(())
    }

    /// Remove every entry and recreate the empty directory.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
        fs::create_dir_all(&self.dir)
    }
}

fn hex_encode(data: &[u8]) -> String {
    use std::fmt::Write;
    data.iter().fold(String::with_capacity(data.len() * 2), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn key_is_sha256_hex_of_url() {
        assert_eq!(
            DiskCache::key_for("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn bytes_round_trip_until_cleared() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path().join("pages"));
        let url = "https://host/api/media/albums?page=1&limit=20";

        assert!(cache.read(url).unwrap().is_none());
        cache.write(url, b"{\"albums\":[]}").unwrap();
        assert_eq!(cache.read(url).unwrap().unwrap(), b"{\"albums\":[]}");
        assert!(cache.read("https://host/api/media/albums?page=2&limit=20").unwrap().is_none());

        cache.clear().unwrap();
        assert!(cache.read(url).unwrap().is_none());
        assert!(cache.dir().is_dir());
    }

    #[test]
    fn concurrent_writes_of_same_url_all_succeed() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path());
        let url = "https://host/api/media/albums?page=1&limit=20";

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let cache = &cache;
                    scope.spawn(move || cache.write(url, format!("[{i}]").as_bytes()))
                })
                .collect();
            for handle in handles {
                handle.join().unwrap().unwrap();
            }
        });

        assert!(cache.read(url).unwrap().is_some());
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn clear_tolerates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path().join("never-created"));
        cache.clear().unwrap();
        assert!(cache.dir().is_dir());
    }
}
