//! Loading the dataset from disk once and reusing it until the file changes.

use crate::error::PipelineError;
use crate::model::SalesRecord;
use crate::pipeline::load::{load_and_normalize, read_raw_rows, BadRowPolicy, SkippedRow};
use crate::{utils, Result};
use anyhow::Context;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

/// Identifies one version of a source file. If any field changes, the file is loaded again.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SourceKey {
    path: PathBuf,
    modified: Option<SystemTime>,
    len: u64,
}

impl SourceKey {
    /// Reads the current identity of the file at `path`.
    pub async fn probe(path: &Path) -> Result<Self> {
        let path = utils::canonicalize(path).await?;
        let meta = tokio::fs::metadata(&path)
            .await
            .with_context(|| format!("Unable to read metadata of {}", path.display()))?;
        anyhow::ensure!(meta.is_file(), "'{}' is not a file", path.display());
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A loaded, normalized dataset. Immutable once built; share it through `Arc`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Dataset {
    source: SourceKey,
    records: Vec<SalesRecord>,
    skipped: Vec<SkippedRow>,
}

impl Dataset {
    /// Reads and normalizes the file identified by `source`.
    pub async fn load(source: SourceKey, policy: BadRowPolicy) -> Result<Self> {
        let bytes = utils::read_bytes(source.path()).await?;
        let raw = read_raw_rows(bytes.as_slice(), policy)
            .map_err(PipelineError::from)
            .with_context(|| format!("Unable to read {}", source.path().display()))?;
        let normalized = load_and_normalize(raw.rows, policy)
            .with_context(|| format!("Unable to load {}", source.path().display()))?;
        let mut skipped = raw.skipped;
        skipped.extend(normalized.skipped);
        skipped.sort_by_key(|row| row.line);
        Ok(Self {
            source,
            records: normalized.records,
            skipped,
        })
    }

    pub fn source(&self) -> &SourceKey {
        &self.source
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Rows dropped under `BadRowPolicy::Skip`.
    pub fn skipped(&self) -> &[SkippedRow] {
        &self.skipped
    }
}

/// Memoizes `Dataset` loads by canonical path.
///
/// A cached entry is returned only while the file's `SourceKey` is unchanged. Failed loads are
/// never cached.
#[derive(Debug, Default)]
pub struct DatasetCache {
    policy: BadRowPolicy,
    entries: HashMap<PathBuf, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new(policy: BadRowPolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
        }
    }

    /// Returns the dataset for `path`, loading it if it is not cached or the file has changed.
    pub async fn get(&mut self, path: &Path) -> Result<Arc<Dataset>> {
        let key = SourceKey::probe(path).await?;
        if let Some(cached) = self.entries.get(key.path()) {
            if cached.source() == &key {
                debug!("Dataset cache hit for {}", key.path().display());
                return Ok(cached.clone());
            }
            debug!("{} has changed, reloading", key.path().display());
        }

        let canonical = key.path().to_path_buf();
        let dataset = Arc::new(Dataset::load(key, self.policy).await?);
        debug!(
            "Loaded {} records from {}",
            dataset.records().len(),
            canonical.display()
        );
        self.entries.insert(canonical, dataset.clone());
        Ok(dataset)
    }

    /// Drops the entry for `path`. Returns whether there was one.
    pub async fn invalidate(&mut self, path: &Path) -> bool {
        let canonical = utils::canonicalize(path)
            .await
            .unwrap_or_else(|_| path.to_path_buf());
        self.entries.remove(&canonical).is_some()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
