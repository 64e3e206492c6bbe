use directories::BaseDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::client::ApiClient;
use crate::error::{AppError, ConfigError};
use crate::view::controller::{Layout, ViewController};

pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub base_id: String,
    pub contacts_table_id: String,
    pub messages_table_id: String,
    pub api_url: String,
    pub layout: Layout,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_id: String::new(),
            contacts_table_id: String::new(),
            messages_table_id: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            layout: Layout::default(),
            log_level: crate::logger::DEFAULT_LEVEL.to_string(),
        }
    }
}

impl Config {
    pub fn path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("airtable-inbox.toml"))
    }

    /// Loads the config file and applies credential overrides from the
    /// environment. A missing or broken file yields defaults.
    pub fn load() -> Self {
        let mut config = match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                warn!("ignoring {}: {e}", path.display());
                Self::default()
            }),
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&text)?;
        config.api_url = crate::utils::normalize_url(&config.api_url);
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Credential overrides; `lookup` is `std::env::var` outside of tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let slots = [
            ("AIRTABLE_API_KEY", &mut self.api_key),
            ("AIRTABLE_BASE_ID", &mut self.base_id),
            ("AIRTABLE_CONTACTS_TABLE_ID", &mut self.contacts_table_id),
            ("AIRTABLE_MESSAGES_TABLE_ID", &mut self.messages_table_id),
        ];
        for (var, slot) in slots {
            if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
                *slot = value.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("api_key", &self.api_key),
            ("base_id", &self.base_id),
            ("contacts_table_id", &self.contacts_table_id),
            ("messages_table_id", &self.messages_table_id),
            ("api_url", &self.api_url),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name));
            }
        }
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }
}

pub async fn run(mut config: Config) -> Result<(), AppError> {
    if !config.is_complete() {
        config = crate::ui::login::show_login_window(config).await?;
    }
    let client = ApiClient::new(&config)?;
    info!("using base {} ({} layout)", config.base_id, config.layout);
    let mut controller = ViewController::new(client, config.layout);
    crate::ui::main_window::show_main_window(&mut controller).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_point_at_airtable() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.layout, Layout::Wide);
        assert!(!config.is_complete());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("airtable-inbox.toml");
        let config = Config {
            api_key: "key".into(),
            base_id: "app".into(),
            contacts_table_id: "tblC".into(),
            messages_table_id: "tblM".into(),
            layout: Layout::Compact,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(loaded.is_complete());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("airtable-inbox.toml");
        fs::write(&path, "base_id = \"app\"\napi_url = \"example.test/v0\"\n").unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.base_id, "app");
        assert_eq!(loaded.api_url, "https://example.test/v0");
        assert_eq!(loaded.log_level, "info");
        assert!(matches!(loaded.validate(), Err(ConfigError::Missing("api_key"))));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("airtable-inbox.toml");
        fs::write(&path, "api_key = [").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn env_overrides_credentials_only() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("AIRTABLE_API_KEY", "patFromEnv"),
            ("AIRTABLE_BASE_ID", "  "),
            ("AIRTABLE_MESSAGES_TABLE_ID", "tblEnv"),
        ]);
        let mut config = Config {
            base_id: "appFile".into(),
            ..Config::default()
        };
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.api_key, "patFromEnv");
        assert_eq!(config.base_id, "appFile");
        assert_eq!(config.messages_table_id, "tblEnv");
        assert_eq!(config.contacts_table_id, "");
    }
}
