//! Durable answer cache stored as one JSON object on disk
//!
//! Writers serialise through an OS advisory lock on `<path>.lock`, re-read the
//! file while holding it, merge their entry and replace the file with an
//! atomic rename. The lock is released when its holder exits, so a crashed
//! writer never blocks the others.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use fd_lock::RwLock as FileLock;
use tempfile::NamedTempFile;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::domain::cache::AnswerCache;
use crate::domain::DomainError;

type Entries = BTreeMap<String, serde_json::Value>;

const MIN_BACKOFF: Duration = Duration::from_millis(10);
const MAX_BACKOFF: Duration = Duration::from_millis(200);

#[derive(Debug)]
pub struct JsonFileAnswerCache {
    path: PathBuf,
    entries: RwLock<Entries>,
    write_lock: Mutex<()>,
    lock_timeout: Duration,
}

impl JsonFileAnswerCache {
    /// Open the cache file, starting empty when it is missing or unreadable
    pub fn open(path: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        let path = path.into();
        let entries = load_entries(&path);

        debug!(path = %path.display(), entries = entries.len(), "Answer cache loaded");

        Self {
            path,
            entries: RwLock::new(entries),
            write_lock: Mutex::new(()),
            lock_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AnswerCache for JsonFileAnswerCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.entries.read().await.get(key).map(|v| v.to_string()))
    }

    async fn set_raw(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let value: serde_json::Value = serde_json::from_str(value)
            .map_err(|e| DomainError::cache(format!("Cache value is not JSON: {}", e)))?;

        let _guard = self.write_lock.lock().await;

        let path = self.path.clone();
        let key = key.to_string();
        let lock_timeout = self.lock_timeout;

        let merged = tokio::task::spawn_blocking(move || write_entry(&path, key, value, lock_timeout))
            .await
            .map_err(|e| DomainError::internal(format!("Cache writer task failed: {}", e)))??;

        *self.entries.write().await = merged;
        Ok(())
    }

    async fn size(&self) -> Result<usize, DomainError> {
        Ok(self.entries.read().await.len())
    }

    fn backend_name(&self) -> &'static str {
        "json_file"
    }
}

fn load_entries(path: &Path) -> Entries {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Entries::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Answer cache unreadable, starting empty");
            return Entries::new();
        }
    };

    if data.trim().is_empty() {
        return Entries::new();
    }

    serde_json::from_str(&data).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Answer cache corrupt, starting empty");
        Entries::new()
    })
}

fn write_entry(
    path: &Path,
    key: String,
    value: serde_json::Value,
    lock_timeout: Duration,
) -> Result<Entries, DomainError> {
    let dir = parent_dir(path);
    fs::create_dir_all(dir)
        .map_err(|e| DomainError::storage(format!("Cannot create {}: {}", dir.display(), e)))?;

    with_exclusive_lock(&lock_path(path), lock_timeout, || {
        let mut entries = load_entries(path);
        entries.insert(key, value);

        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| DomainError::storage(format!("Cannot create temp file: {}", e)))?;
        serde_json::to_writer_pretty(&mut tmp, &entries)
            .map_err(|e| DomainError::storage(format!("Cannot serialize answer cache: {}", e)))?;
        tmp.flush()
            .map_err(|e| DomainError::storage(format!("Cannot flush answer cache: {}", e)))?;
        tmp.persist(path)
            .map_err(|e| DomainError::storage(format!("Cannot replace {}: {}", path.display(), e.error)))?;

        Ok(entries)
    })
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn open_lock(path: &Path) -> Result<FileLock<File>, DomainError> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map(FileLock::new)
        .map_err(|e| DomainError::storage(format!("Cannot open cache lock {}: {}", path.display(), e)))
}

/// Run `f` while holding the exclusive lock on `lock_file`, polling for it
/// until `timeout` elapses. The lock file itself is left in place.
fn with_exclusive_lock<T>(
    lock_file: &Path,
    timeout: Duration,
    f: impl FnOnce() -> Result<T, DomainError>,
) -> Result<T, DomainError> {
    let mut lock = open_lock(lock_file)?;
    let started = Instant::now();
    let mut backoff = MIN_BACKOFF;

    loop {
        match lock.try_write() {
            Ok(_guard) => return f(),
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Cannot lock {}: {}",
                    lock_file.display(),
                    e
                )));
            }
        }

        if started.elapsed() >= timeout {
            return Err(DomainError::storage(format!(
                "Timed out waiting for cache lock {}",
                lock_file.display()
            )));
        }

        std::thread::sleep(backoff);
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}
