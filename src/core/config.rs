//! Configuration loading
//!
//! Settings are layered, later layers winning:
//! 1. built-in defaults
//! 2. global file `<config dir>/greenboard/config.yaml`
//! 3. project file `.greenboard/config.yaml` in the working directory
//! 4. `GREENBOARD_DB` environment variable
//!
//! Command-line flags are applied on top by the CLI.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Project-local configuration directory
pub const PROJECT_DIR: &str = ".greenboard";

/// Configuration file name inside a configuration directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Default database file name inside the project directory
pub const DEFAULT_DB_FILE: &str = "greenboard.db";

/// Environment variable overriding the database path
pub const DB_ENV: &str = "GREENBOARD_DB";

/// Emission factor seeded for the "Other" service type in new databases
pub const DEFAULT_OTHER_FACTOR: f64 = 0.75;

/// One configuration layer as written in YAML; every key is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    database: Option<PathBuf>,
    busy_timeout_ms: Option<u64>,
    default_factor: Option<f64>,
    page_size: Option<usize>,
}

/// Effective configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite database path
    pub database: PathBuf,

    /// How long a writer waits for the database lock
    pub busy_timeout_ms: u64,

    /// Factor seeded for "Other" when a database is created
    pub default_factor: f64,

    /// Rows per page in package listings
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(PROJECT_DIR).join(DEFAULT_DB_FILE),
            busy_timeout_ms: 5000,
            default_factor: DEFAULT_OTHER_FACTOR,
            page_size: 20,
        }
    }
}

impl Config {
    /// Load configuration from all layers
    pub fn load() -> Self {
        let mut config = Config::default();

        if let Some(global) = Self::global_config_path() {
            config.merge_file(&global);
        }
        config.merge_file(&Path::new(PROJECT_DIR).join(CONFIG_FILE));

        if let Ok(db) = std::env::var(DB_ENV) {
            if !db.trim().is_empty() {
                config.database = PathBuf::from(db);
            }
        }

        config
    }

    /// Path of the global configuration file, if the platform has a config dir
    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "greenboard").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Merge one YAML layer; missing files are skipped, malformed ones are logged and skipped
    pub fn merge_file(&mut self, path: &Path) {
        let Ok(content) = fs::read_to_string(path) else {
            return;
        };
        match serde_yml::from_str::<ConfigFile>(&content) {
            Ok(layer) => {
                tracing::debug!(path = %path.display(), "loaded config layer");
                self.apply(layer);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            }
        }
    }

    fn apply(&mut self, layer: ConfigFile) {
        if let Some(db) = layer.database {
            self.database = db;
        }
        if let Some(timeout) = layer.busy_timeout_ms {
            self.busy_timeout_ms = timeout;
        }
        if let Some(factor) = layer.default_factor {
            if factor.is_finite() && factor >= 0.0 {
                self.default_factor = factor;
            } else {
                tracing::warn!(factor, "ignoring invalid default_factor");
            }
        }
        if let Some(size) = layer.page_size {
            self.page_size = size.max(1);
        }
    }

    /// Render the configuration as YAML for `greenboard init`
    pub fn to_yaml(&self) -> Result<String, serde_yml::Error> {
        let layer = ConfigFile {
            database: Some(self.database.clone()),
            busy_timeout_ms: Some(self.busy_timeout_ms),
            default_factor: Some(self.default_factor),
            page_size: Some(self.page_size),
        };
        let body = serde_yml::to_string(&layer)?;
        Ok(format!("# Greenboard configuration\n{}", body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_factor, 0.75);
        assert_eq!(config.page_size, 20);
        assert!(config.database.ends_with("greenboard.db"));
    }

    #[test]
    fn test_merge_file_overrides_set_keys_only() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        fs::write(&path, "database: /tmp/mail.db\npage_size: 50\n").unwrap();

        let mut config = Config::default();
        config.merge_file(&path);

        assert_eq!(config.database, PathBuf::from("/tmp/mail.db"));
        assert_eq!(config.page_size, 50);
        assert_eq!(config.busy_timeout_ms, 5000);
    }

    #[test]
    fn test_malformed_file_is_ignored() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        fs::write(&path, "page_size: [not, a, number]\n").unwrap();

        let mut config = Config::default();
        config.merge_file(&path);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_factor_rejected() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        fs::write(&path, "default_factor: -1.0\n").unwrap();

        let mut config = Config::default();
        config.merge_file(&path);
        assert_eq!(config.default_factor, DEFAULT_OTHER_FACTOR);
    }

    #[test]
    fn test_yaml_roundtrip_through_merge() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        let mut written = Config::default();
        written.page_size = 7;
        fs::write(&path, written.to_yaml().unwrap()).unwrap();

        let mut read = Config::default();
        read.merge_file(&path);
        assert_eq!(read, written);
    }

    #[test]
    fn test_yaml_keeps_database_path_with_comment_and_colon() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        let mut written = Config::default();
        written.database = PathBuf::from("/srv/mail #2/db: main/greenboard.db");
        fs::write(&path, written.to_yaml().unwrap()).unwrap();

        let mut read = Config::default();
        read.merge_file(&path);
        assert_eq!(read.database, written.database);
        assert_eq!(read, written);
    }
}
