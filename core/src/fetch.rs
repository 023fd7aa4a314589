//! Network and asset-store collaborators.
//!
//! Both are trait seams so the aggregator can be exercised in tests with
//! scripted responses and an in-memory store.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::FetchError;

/// Plain `GET(url) -> bytes` capability. Fallible and never retried.
pub trait Fetch: Send + Sync {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// On-disk store for icon assets, keyed by boss id.
///
/// The existence check is a best-effort de-duplication, not a transactional
/// guarantee: two callers may race to write the same never-before-seen
/// asset, and both writes are idempotent (same content, same path).
pub trait AssetStore: Send + Sync {
    fn exists(&self, id: u64) -> bool;
    fn write(&self, id: u64, bytes: &[u8]) -> Result<(), FetchError>;
}

/// Production fetcher on a blocking reqwest client. Follows redirects;
/// callers run it on worker threads, never on the async runtime.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }
}

/// Directory of `{id:06}.png` files.
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, id: u64) -> PathBuf {
        self.dir.join(format!("{id:06}.png"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl AssetStore for DiskStore {
    fn exists(&self, id: u64) -> bool {
        self.path_for(id).exists()
    }

    fn write(&self, id: u64, bytes: &[u8]) -> Result<(), FetchError> {
        let path = self.path_for(id);
        fs::write(&path, bytes).map_err(|source| FetchError::Store { path, source })
    }
}
