use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the remote church API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for individual HTTP requests in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret the admin login is checked against. Defaults from the
    /// STEEPLE_ADMIN_SECRET environment variable; when empty, login is
    /// effectively disabled.
    #[serde(default = "default_admin_secret")]
    pub admin_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_secret: default_admin_secret(),
        }
    }
}

fn default_admin_secret() -> String {
    std::env::var("STEEPLE_ADMIN_SECRET").unwrap_or_default()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Interval between content refresh cycles in seconds (default: 5)
    #[serde(default = "default_content_interval")]
    pub content_interval_secs: u64,
    /// Interval between visitor profile refreshes in seconds (default: 300)
    #[serde(default = "default_visitor_refresh")]
    pub visitor_refresh_secs: u64,
    /// Base delay between visitor registration retries in milliseconds (default: 1000)
    #[serde(default = "default_visitor_retry_delay")]
    pub visitor_retry_delay_ms: u64,
    /// Number of retries after the first failed registration attempt (default: 3)
    #[serde(default = "default_visitor_max_retries")]
    pub visitor_max_retries: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            content_interval_secs: default_content_interval(),
            visitor_refresh_secs: default_visitor_refresh(),
            visitor_retry_delay_ms: default_visitor_retry_delay(),
            visitor_max_retries: default_visitor_max_retries(),
        }
    }
}

fn default_content_interval() -> u64 {
    5
}

fn default_visitor_refresh() -> u64 {
    300
}

fn default_visitor_retry_delay() -> u64 {
    1000
}

fn default_visitor_max_retries() -> u32 {
    3
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| "Failed to parse configuration file")?;
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.polling.content_interval_secs, 5);
        assert_eq!(config.polling.visitor_refresh_secs, 300);
        assert_eq!(config.polling.visitor_retry_delay_ms, 1000);
        assert_eq!(config.polling.visitor_max_retries, 3);
        assert_eq!(config.storage.data_dir, PathBuf::from("./data"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "https://church.example.org"

            [polling]
            content_interval_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://church.example.org");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.polling.content_interval_secs, 30);
        assert_eq!(config.polling.visitor_refresh_secs, 300);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load(Path::new("/nonexistent/steeple.toml")).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000");
    }
}
