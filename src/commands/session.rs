//! The state shared by command invocations: the configuration and the dataset cache.

use crate::pipeline::{Dataset, DatasetCache, SkippedRow};
use crate::{Config, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Holds the `Config`, the dataset path in use and the cache that loads it.
///
/// The CLI creates one per process. The MCP server creates one per server, so that the dataset
/// is parsed once and reused by every tool call until the file changes or `reload` is called.
#[derive(Debug, Clone)]
pub struct Session {
    config: Arc<Config>,
    data_file: PathBuf,
    cache: Arc<Mutex<DatasetCache>>,
}

impl Session {
    /// `data_file` overrides the data file named in `config`.
    pub fn new(config: Config, data_file: Option<&Path>) -> Self {
        let data_file = data_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.data_file());
        let cache = DatasetCache::new(config.bad_rows());
        Self {
            config: Arc::new(config),
            data_file,
            cache: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// The dataset, loaded on first use and whenever the file has changed.
    pub async fn dataset(&self) -> Result<Arc<Dataset>> {
        self.cache.lock().await.get(&self.data_file).await
    }

    /// Drops the cached dataset and loads it again.
    pub async fn reload(&self) -> Result<Arc<Dataset>> {
        let mut cache = self.cache.lock().await;
        cache.invalidate(&self.data_file).await;
        cache.get(&self.data_file).await
    }
}

/// What was loaded, for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub path: PathBuf,
    pub records: usize,
    pub skipped: Vec<SkippedRow>,
}

impl From<&Dataset> for DatasetSummary {
    fn from(dataset: &Dataset) -> Self {
        Self {
            path: dataset.source().path().to_path_buf(),
            records: dataset.records().len(),
            skipped: dataset.skipped().to_vec(),
        }
    }
}
