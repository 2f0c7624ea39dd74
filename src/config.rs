use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DaybookConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    pub diary_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let dir = default_daybook_dir();
        Self {
            db_path: dir.join("data.db").to_string_lossy().into_owned(),
            diary_dir: dir.join("diary").to_string_lossy().into_owned(),
        }
    }
}

/// Returns `~/.daybook/`, or `./.daybook/` when there is no home directory.
pub fn default_daybook_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".daybook")
}

/// Returns the default config file path: `~/.daybook/config.toml`
pub fn default_config_path() -> PathBuf {
    default_daybook_dir().join("config.toml")
}

impl DaybookConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            DaybookConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (DAYBOOK_DB, DAYBOOK_DIARY, DAYBOOK_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DAYBOOK_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("DAYBOOK_DIARY") {
            self.storage.diary_dir = val;
        }
        if let Ok(val) = std::env::var("DAYBOOK_LOG_LEVEL") {
            self.server.log_level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn resolved_diary_dir(&self) -> PathBuf {
        expand_tilde(&self.storage.diary_dir)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = DaybookConfig::default();
        assert_eq!(config.server.log_level, "info");
        assert!(config.storage.db_path.ends_with("data.db"));
        assert!(config.storage.diary_dir.ends_with("diary"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"

[storage]
db_path = "/tmp/test.db"
"#;
        let config: DaybookConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        // defaults still apply for unset fields
        assert!(config.storage.diary_dir.ends_with("diary"));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = DaybookConfig::default();
        std::env::set_var("DAYBOOK_DB", "/tmp/override.db");
        std::env::set_var("DAYBOOK_DIARY", "/tmp/override-diary");
        std::env::set_var("DAYBOOK_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.storage.diary_dir, "/tmp/override-diary");
        assert_eq!(config.server.log_level, "trace");

        // Clean up
        std::env::remove_var("DAYBOOK_DB");
        std::env::remove_var("DAYBOOK_DIARY");
        std::env::remove_var("DAYBOOK_LOG_LEVEL");
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/data.db"), PathBuf::from("/var/data.db"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/x/data.db"), home.join("x/data.db"));
        }
    }
}
