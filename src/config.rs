//! Configuration file handling for sales-board.
//!
//! The configuration file is stored at `$SALES_HOME/config.json` and names the input dataset
//! along with export and loading settings.

use crate::exports::Exports;
use crate::pipeline::{BadRowPolicy, EmptySelectionPolicy};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "sales";
const CONFIG_VERSION: u8 = 1;
const EXPORT_COPIES: u32 = 5;
const EXPORTS: &str = "exports";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$SALES_HOME` and from there it loads `$SALES_HOME/config.json`. It provides
/// paths to other items that are either configurable or are expected in a certain location within
/// the sales home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    exports: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, its `exports` subdirectory and an initial `config.json` that
    /// points at `data_file`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the home directory, e.g. `$HOME/sales`
    /// - `data_file` - The sales CSV. It must exist; its absolute path is stored.
    ///
    /// # Errors
    /// - Returns an error if the data file does not exist or any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>, data_file: &Path) -> Result<Self> {
        let data_file = utils::canonicalize(data_file)
            .await
            .context("The data file must exist")?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the sales home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let exports = root.join(EXPORTS);
        utils::make_dir(&exports).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            data_file,
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            exports,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `sales_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the exports directory exists
    /// - return the loaded configuration object
    pub async fn load(sales_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = sales_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Sales Home is missing, run 'sales init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            exports: root.join(EXPORTS),
            root,
            config_path,
            config_file,
        };
        if !config.exports.is_dir() {
            bail!(
                "The exports directory is missing '{}'",
                config.exports.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn exports(&self) -> &Path {
        &self.exports
    }

    /// The configured dataset. A relative path is resolved against the home directory.
    pub fn data_file(&self) -> PathBuf {
        let p = &self.config_file.data_file;
        if p.is_absolute() {
            return p.clone();
        }
        self.root.join(p)
    }

    pub fn export_copies(&self) -> u32 {
        self.config_file.export_copies
    }

    pub fn empty_selection(&self) -> EmptySelectionPolicy {
        self.config_file.empty_selection
    }

    pub fn bad_rows(&self) -> BadRowPolicy {
        self.config_file.bad_rows
    }

    /// Creates a new `Exports` instance for writing rotated export files.
    pub fn exporter(&self) -> Exports {
        Exports::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "sales",
///   "config_version": 1,
///   "data_file": "/home/me/data/Sales Dataset.csv",
///   "export_copies": 5,
///   "empty_selection": "reject",
///   "bad_rows": "skip"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "sales"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Path to the sales CSV, absolute or relative to the home directory
    data_file: PathBuf,

    /// Number of rotated copies to keep per export name
    export_copies: u32,

    /// Whether selecting nothing for a filter is an empty result or means no restriction
    #[serde(default)]
    empty_selection: EmptySelectionPolicy,

    /// What to do with rows that cannot be parsed
    #[serde(default)]
    bad_rows: BadRowPolicy,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            data_file: PathBuf::new(),
            export_copies: EXPORT_COPIES,
            empty_selection: EmptySelectionPolicy::default(),
            bad_rows: BadRowPolicy::default(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: ConfigFile = utils::deserialize(path.as_ref()).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let data_file = dir.path().join("Sales Dataset.csv");
        utils::write(&data_file, "Year-Month\n").await.unwrap();
        let home = dir.path().join("sales_home");

        let created = Config::create(&home, &data_file).await.unwrap();
        assert!(created.exports().is_dir());
        assert!(created.config_path().is_file());
        assert_eq!(created.export_copies(), 5);

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.root(), created.root());
        assert_eq!(
            loaded.data_file(),
            utils::canonicalize(&data_file).await.unwrap()
        );
        assert_eq!(loaded.empty_selection(), EmptySelectionPolicy::Reject);
        assert_eq!(loaded.bad_rows(), BadRowPolicy::Skip);
    }

    #[tokio::test]
    async fn test_config_create_requires_data_file() {
        let dir = TempDir::new().unwrap();
        let result = Config::create(dir.path().join("home"), &dir.path().join("nope.csv")).await;
        assert!(result.is_err());
        assert!(!dir.path().join("home").exists());
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(dir.path().join("missing")).await.is_err());
        // home exists but has no config.json
        assert!(Config::load(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_relative_data_file_and_defaults() {
        let dir = TempDir::new().unwrap();
        utils::make_dir(dir.path().join(EXPORTS)).await.unwrap();
        let json = r#"{
            "app_name": "sales",
            "config_version": 1,
            "data_file": "data/sales.csv",
            "export_copies": 2
        }"#;
        utils::write(dir.path().join(CONFIG_JSON), json)
            .await
            .unwrap();

        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(config.data_file(), config.root().join("data/sales.csv"));
        assert_eq!(config.export_copies(), 2);
        assert_eq!(config.empty_selection(), EmptySelectionPolicy::Reject);
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original = ConfigFile {
            data_file: PathBuf::from("/tmp/sales.csv"),
            export_copies: 7,
            empty_selection: EmptySelectionPolicy::All,
            bad_rows: BadRowPolicy::Abort,
            ..ConfigFile::default()
        };
        original.save(&config_path).await.unwrap();

        let loaded = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_config_file_wrong_app() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let other = ConfigFile {
            app_name: "tiller".to_string(),
            ..ConfigFile::default()
        };
        other.save(&config_path).await.unwrap();
        assert!(ConfigFile::load(&config_path).await.is_err());
    }
}
