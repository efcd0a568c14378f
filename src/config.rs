use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

pub const DEFAULT_DATABASE: &str = "ml_technologies.db";
pub const DEFAULT_ENV_FILE: &str = "env.main";

/// Project settings read from `mlcatalog.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CatalogConfig {
    /// Path of the SQLite catalog file
    pub database: Option<String>,
    /// Settings file the secret provisioner writes to
    pub env_file: Option<String>,
}

impl CatalogConfig {
    /// Database path: explicit flag, then config, then the default
    pub fn database_path(&self, flag: Option<&Path>) -> PathBuf {
        resolve(flag, self.database.as_deref(), DEFAULT_DATABASE)
    }

    pub fn env_file_path(&self, flag: Option<&Path>) -> PathBuf {
        resolve(flag, self.env_file.as_deref(), DEFAULT_ENV_FILE)
    }
}

fn resolve(flag: Option<&Path>, configured: Option<&str>, default: &str) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| configured.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(default))
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("mlcatalog.toml")
}

/// Load the config file, or `None` when it does not exist
pub fn load_config(path: Option<&Path>) -> Result<Option<CatalogConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: CatalogConfig = toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &CatalogConfig, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    let contents = toml::to_string_pretty(config).map_err(|e| Error::Config(e.to_string()))?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolution_order() {
        let config = CatalogConfig {
            database: Some("data/catalog.db".to_string()),
            env_file: None,
        };

        assert_eq!(
            config.database_path(Some(Path::new("flag.db"))),
            PathBuf::from("flag.db")
        );
        assert_eq!(config.database_path(None), PathBuf::from("data/catalog.db"));
        assert_eq!(config.env_file_path(None), PathBuf::from(DEFAULT_ENV_FILE));
        assert_eq!(
            CatalogConfig::default().database_path(None),
            PathBuf::from(DEFAULT_DATABASE)
        );
    }

    #[test]
    fn test_write_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mlcatalog.toml");
        let config = CatalogConfig {
            database: Some("catalog.db".to_string()),
            env_file: Some(".env".to_string()),
        };

        write_config(&path, &config, false).unwrap();
        assert!(matches!(write_config(&path, &config, false), Err(Error::Config(_))));
        write_config(&path, &config, true).unwrap();

        assert_eq!(load_config(Some(&path)).unwrap(), Some(config));
        assert_eq!(load_config(Some(&dir.path().join("absent.toml"))).unwrap(), None);
    }

    #[test]
    fn test_invalid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mlcatalog.toml");
        std::fs::write(&path, "database = [").unwrap();

        assert!(matches!(load_config(Some(&path)), Err(Error::Config(_))));
    }

    #[test]
    fn test_ensure_db_dir() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("nested").join("catalog.db");

        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());
        ensure_db_dir(Path::new("catalog.db")).unwrap();
    }
}
