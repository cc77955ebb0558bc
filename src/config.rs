use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_storage_path")]
    pub storage_path: String,

    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,

    #[serde(default = "default_posts_table")]
    pub posts_table: String,

    #[serde(default = "default_autosave_delay")]
    pub autosave_delay_ms: u64,

    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_storage_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sidevote");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("local.db").to_string_lossy().to_string()
}

fn default_posts_table() -> String {
    "posts".to_string()
}

fn default_autosave_delay() -> u64 {
    1000
}

fn default_share_base_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            supabase_url: None,
            supabase_anon_key: None,
            posts_table: default_posts_table(),
            autosave_delay_ms: default_autosave_delay(),
            share_base_url: default_share_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::parse(&content)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sidevote")
            .join("config.toml")
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
