use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory, its `exports` subdirectory and a `config.json` that points at
/// `data_file`.
///
/// # Arguments
/// - `sales_home` - The directory that will be the home directory, e.g. `$HOME/sales`
/// - `data_file` - The sales CSV. Its absolute path is stored in the config.
///
/// # Errors
/// - Returns an error if the data file is missing or any file operations fail.
pub async fn init(sales_home: &Path, data_file: &Path) -> Result<Out<()>> {
    let config = Config::create(sales_home, data_file)
        .await
        .context("Unable to create the home directory and config")?;
    Ok(format!(
        "Successfully created {} using data file {}",
        config.config_path().display(),
        config.data_file().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let data_file = dir.path().join("sales.csv");
        utils::write(&data_file, crate::test::SAMPLE_CSV)
            .await
            .unwrap();
        let home = dir.path().join("home");

        let out = init(&home, &data_file).await.unwrap();
        assert!(out.message().starts_with("Successfully created"));
        assert!(out.structure().is_none());
        assert!(Config::load(&home).await.is_ok());
    }
}
