//! # Configuration
//!
//! Settings are layered:
//!
//! 1. built-in defaults
//! 2. `config.yaml` in the data directory, if present
//! 3. environment variables
//!
//! ```yaml
//! bind_addr: "0.0.0.0:3000"
//! static_dir: "/srv/chore-board/www"
//! keep_weeks: 10
//! keep_payouts: 50
//! undo_window_secs: 5
//! allowed_origin: "http://wall-tablet.local"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::archive_service::{DEFAULT_KEEP_PAYOUTS, DEFAULT_KEEP_WEEKS};
use crate::domain::board_service::BoardSettings;
use crate::domain::undo::DEFAULT_UNDO_WINDOW_SECS;

pub const CONFIG_FILE: &str = "config.yaml";
pub const ENV_DATA_DIR: &str = "CHORE_BOARD_DATA_DIR";
pub const ENV_BIND: &str = "CHORE_BOARD_BIND";
pub const ENV_PORT: &str = "PORT";
pub const ENV_STATIC_DIR: &str = "CHORE_BOARD_STATIC_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_addr: String,
    /// Directory of the web client served next to the API
    pub static_dir: Option<PathBuf>,
    pub keep_weeks: usize,
    pub keep_payouts: usize,
    pub undo_window_secs: i64,
    /// CORS origin; any origin when unset
    pub allowed_origin: Option<String>,
}

/// `config.yaml` contents; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    bind_addr: Option<String>,
    static_dir: Option<PathBuf>,
    keep_weeks: Option<usize>,
    keep_payouts: Option<usize>,
    undo_window_secs: Option<i64>,
    allowed_origin: Option<String>,
}

impl AppConfig {
    pub fn with_data_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            bind_addr: "0.0.0.0:3000".to_string(),
            static_dir: None,
            keep_weeks: DEFAULT_KEEP_WEEKS,
            keep_payouts: DEFAULT_KEEP_PAYOUTS,
            undo_window_secs: DEFAULT_UNDO_WINDOW_SECS,
            allowed_origin: None,
        }
    }

    /// Load the configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load the configuration with `lookup` standing in for the environment
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = match lookup(ENV_DATA_DIR) {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_data_dir(&lookup)?,
        };
        let mut config = Self::with_data_dir(data_dir);

        let config_path = config.data_dir.join(CONFIG_FILE);
        if config_path.exists() {
            let raw = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let file: ConfigFile = serde_yaml::from_str(&raw)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?;
            config.apply_file(file);
            info!("Loaded configuration from {}", config_path.display());
        }

        config.apply_overrides(&lookup);
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(bind_addr) = file.bind_addr {
            self.bind_addr = bind_addr;
        }
        if file.static_dir.is_some() {
            self.static_dir = file.static_dir;
        }
        if let Some(keep_weeks) = file.keep_weeks {
            self.keep_weeks = keep_weeks;
        }
        if let Some(keep_payouts) = file.keep_payouts {
            self.keep_payouts = keep_payouts;
        }
        if let Some(undo_window_secs) = file.undo_window_secs {
            self.undo_window_secs = undo_window_secs;
        }
        if file.allowed_origin.is_some() {
            self.allowed_origin = file.allowed_origin;
        }
    }

    /// Environment variables win over the file. `PORT` only replaces the
    /// port of the bind address.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind_addr) = lookup(ENV_BIND) {
            self.bind_addr = bind_addr;
        }
        if let Some(port) = lookup(ENV_PORT) {
            let host = self
                .bind_addr
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            self.bind_addr = format!("{}:{}", host, port.trim());
        }
        if let Some(static_dir) = lookup(ENV_STATIC_DIR) {
            self.static_dir = Some(PathBuf::from(static_dir));
        }
    }

    fn validate(&self) -> Result<()> {
        if self.keep_weeks == 0 {
            bail!("keep_weeks must be at least 1");
        }
        if self.keep_payouts == 0 {
            bail!("keep_payouts must be at least 1");
        }
        if self.undo_window_secs < 0 {
            bail!("undo_window_secs cannot be negative");
        }
        Ok(())
    }
}

impl From<&AppConfig> for BoardSettings {
    fn from(config: &AppConfig) -> Self {
        BoardSettings {
            keep_weeks: config.keep_weeks,
            keep_payouts: config.keep_payouts,
            undo_window: chrono::Duration::seconds(config.undo_window_secs),
        }
    }
}

/// `~/Documents/Chore Board`
fn default_data_dir(lookup: &impl Fn(&str) -> Option<String>) -> Result<PathBuf> {
    let home_dir = lookup("HOME")
        .or_else(|| lookup("USERPROFILE"))
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(PathBuf::from(home_dir).join("Documents").join("Chore Board"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_use_home_documents() {
        let config = AppConfig::load_with(env(&[("HOME", "/nonexistent/home")])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/nonexistent/home/Documents/Chore Board"));
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.keep_weeks, 10);
        assert_eq!(config.keep_payouts, 50);
        assert_eq!(config.undo_window_secs, 5);
    }

    #[test]
    fn test_file_then_environment() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILE),
            "bind_addr: \"127.0.0.1:8080\"\nkeep_weeks: 12\nundo_window_secs: 8\n",
        )
        .unwrap();
        let data_dir = temp_dir.path().to_string_lossy().to_string();

        let config = AppConfig::load_with(env(&[(ENV_DATA_DIR, data_dir.as_str()), (ENV_PORT, "4000")])).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:4000");
        assert_eq!(config.keep_weeks, 12);
        assert_eq!(config.keep_payouts, 50);
        assert_eq!(config.undo_window_secs, 8);

        let config = AppConfig::load_with(env(&[(ENV_DATA_DIR, data_dir.as_str()), (ENV_BIND, "[::1]:9000")])).unwrap();
        assert_eq!(config.bind_addr, "[::1]:9000");
    }

    #[test]
    fn test_invalid_file_values_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE), "keep_weeks: 0\n").unwrap();
        let data_dir = temp_dir.path().to_string_lossy().to_string();
        assert!(AppConfig::load_with(env(&[(ENV_DATA_DIR, data_dir.as_str())])).is_err());

        std::fs::write(temp_dir.path().join(CONFIG_FILE), "keep_weeks: [").unwrap();
        assert!(AppConfig::load_with(env(&[(ENV_DATA_DIR, data_dir.as_str())])).is_err());
    }

    #[test]
    fn test_board_settings_from_config() {
        let mut config = AppConfig::with_data_dir("/tmp/board");
        config.keep_weeks = 4;
        config.undo_window_secs = 8;
        let settings = BoardSettings::from(&config);
        assert_eq!(settings.keep_weeks, 4);
        assert_eq!(settings.keep_payouts, DEFAULT_KEEP_PAYOUTS);
        assert_eq!(settings.undo_window, chrono::Duration::seconds(8));
    }
}
