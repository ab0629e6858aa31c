//! Semantic cache persisted as an append-only JSON-lines file
//!
//! With `max_entries` set the file is rewritten from the in-memory index once
//! it holds more than twice that many lines, so disk use stays bounded too.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::in_memory::InMemorySemanticCache;
use crate::domain::semantic_cache::{
    SemanticCache, SemanticCacheEntry, SemanticSearchParams, SemanticSearchResult,
};
use crate::domain::DomainError;

/// One entry per line; the in-memory index mirrors the file
#[derive(Debug)]
pub struct JsonlSemanticCache {
    path: PathBuf,
    index: InMemorySemanticCache,
    /// Lines currently in the file
    append_lock: Mutex<usize>,
}

impl JsonlSemanticCache {
    /// Load existing entries, skipping lines that do not parse
    pub async fn open(path: impl Into<PathBuf>, max_entries: Option<usize>) -> Result<Self, DomainError> {
        let path = path.into();
        let entries = load_entries(&path).await?;

        debug!(path = %path.display(), entries = entries.len(), "Semantic cache loaded");

        let lines = entries.len();
        Ok(Self {
            index: InMemorySemanticCache::from_entries(entries, max_entries),
            path,
            append_lock: Mutex::new(lines),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn compact(&self) -> Result<usize, DomainError> {
        let entries = self.index.snapshot()?;
        let path = self.path.clone();
        let kept = entries.len();

        tokio::task::spawn_blocking(move || rewrite_file(&path, &entries))
            .await
            .map_err(|e| DomainError::internal(format!("Semantic cache compaction failed: {}", e)))??;

        debug!(path = %self.path.display(), entries = kept, "Semantic cache compacted");
        Ok(kept)
    }
}

fn rewrite_file(path: &Path, entries: &[SemanticCacheEntry]) -> Result<(), DomainError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| DomainError::storage(format!("Cannot create temp file: {}", e)))?;
    for entry in entries {
        let line = serde_json::to_string(entry)
            .map_err(|e| DomainError::cache(format!("Failed to serialize semantic entry: {}", e)))?;
        writeln!(tmp, "{}", line)
            .map_err(|e| DomainError::storage(format!("Cannot write semantic cache: {}", e)))?;
    }
    tmp.flush()
        .map_err(|e| DomainError::storage(format!("Cannot flush semantic cache: {}", e)))?;
    tmp.persist(path)
        .map_err(|e| DomainError::storage(format!("Cannot replace {}: {}", path.display(), e.error)))?;

    Ok(())
}

async fn load_entries(path: &Path) -> Result<Vec<SemanticCacheEntry>, DomainError> {
    let data = match tokio::fs::read_to_string(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Semantic cache unreadable, starting empty");
            return Ok(Vec::new());
        }
    };

    let mut skipped = 0usize;
    let entries: Vec<SemanticCacheEntry> = data
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(entry) => Some(entry),
            Err(_) => {
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        warn!(path = %path.display(), skipped = skipped, "Skipped corrupt semantic cache lines");
    }

    Ok(entries)
}

#[async_trait]
impl SemanticCache for JsonlSemanticCache {
    async fn search(
        &self,
        embedding: &[f32],
        params: &SemanticSearchParams,
    ) -> Result<Vec<SemanticSearchResult>, DomainError> {
        self.index.search(embedding, params).await
    }

    async fn store(&self, entry: SemanticCacheEntry) -> Result<(), DomainError> {
        let mut line = serde_json::to_string(&entry)
            .map_err(|e| DomainError::cache(format!("Failed to serialize semantic entry: {}", e)))?;
        line.push('\n');

        let mut lines = self.append_lock.lock().await;

        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| DomainError::storage(format!("Cannot create {}: {}", dir.display(), e)))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| DomainError::storage(format!("Cannot open {}: {}", self.path.display(), e)))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| DomainError::storage(format!("Cannot append semantic entry: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| DomainError::storage(format!("Cannot flush semantic cache: {}", e)))?;

        self.index.store(entry).await?;
        *lines += 1;

        if let Some(max) = self.index.max_entries() {
            if *lines > max.saturating_mul(2) {
                *lines = self.compact().await?;
            }
        }

        Ok(())
    }

    async fn size(&self) -> Result<usize, DomainError> {
        self.index.size().await
    }
}
