use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use vigil_core::RemoteId;

use crate::error::CacheError;

/// Entries not read for this long are dropped on open.
const TTL: SignedDuration = SignedDuration::from_hours(24 * 30);

/// `(resource kind, remote id)` key of a cached detail payload.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(api_resource: &str, id: &RemoteId) -> Self {
        Self(format!("{api_resource}:{id}"))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    value: Value,
    /// Remote modification marker the value was computed for.
    token: String,
    /// Schema version of whoever wrote the entry.
    version: String,
    expires_at: Timestamp,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    entries: HashMap<String, CacheEntry>,
}

/// Persistent memo of full remote definitions, invalidated per entry when
/// the remote modification token changes and wholesale when the schema
/// version changes.
///
/// Purely an optimization: a missing or unreadable file starts empty and
/// everything is recomputed.
pub struct DetailCache {
    path: Option<PathBuf>,
    version: String,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl DetailCache {
    /// Load the cache file at `path`, dropping expired entries and entries
    /// written by another version.
    pub fn open(path: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        let path = path.into();
        let version = version.into();

        let file = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<CacheFile>(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable detail cache");
                CacheFile::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no detail cache yet");
                CacheFile::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read detail cache");
                CacheFile::default()
            }
        };

        let now = Timestamp::now();
        let entries: HashMap<_, _> = file
            .entries
            .into_iter()
            .filter(|(_, entry)| entry.version == version && entry.expires_at > now)
            .collect();
        tracing::debug!(path = %path.display(), entries = entries.len(), "detail cache loaded");

        Self {
            path: Some(path),
            version,
            entries: Mutex::new(entries),
        }
    }

    /// In-memory cache that is never written to disk.
    pub fn ephemeral(version: impl Into<String>) -> Self {
        Self {
            path: None,
            version: version.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Stored value for `key` if it was computed for `token`, otherwise run
    /// `compute` and remember its result.
    pub async fn fetch<F, Fut, E>(&self, key: &CacheKey, token: &str, compute: F) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(hit) = self.lookup(key, token).await {
            return Ok(hit);
        }
        let value = compute().await?;
        self.entries.lock().await.insert(
            key.0.clone(),
            CacheEntry {
                value: value.clone(),
                token: token.to_string(),
                version: self.version.clone(),
                expires_at: Timestamp::now() + TTL,
            },
        );
        Ok(value)
    }

    async fn lookup(&self, key: &CacheKey, token: &str) -> Option<Value> {
        let mut entries = self.entries.lock().await;
        let entry = entries.get_mut(&key.0)?;
        if entry.token != token || entry.version != self.version {
            return None;
        }
        entry.expires_at = Timestamp::now() + TTL;
        Some(entry.value.clone())
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Write the cache file atomically (tmp + rename). No-op for an
    /// ephemeral cache.
    pub async fn persist(&self) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = CacheFile {
            entries: self.entries.lock().await.clone(),
        };
        let json = serde_json::to_vec(&file)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &json).await?;
        tokio::fs::rename(&tmp_path, path).await?;

        tracing::debug!(path = %path.display(), entries = file.entries.len(), "detail cache persisted");
        Ok(())
    }
}
