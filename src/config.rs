use crate::error::{InspectorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_URL_ENV: &str = "CAR_INSPECTOR_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 検出サービスのベースURL
    pub api_url: String,
    /// 0でタイムアウトなし
    pub request_timeout_seconds: u64,
    pub health_poll_interval_seconds: u64,
    /// オフライン代替の疑似処理時間
    pub fallback_delay_min_ms: u64,
    pub fallback_delay_max_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            request_timeout_seconds: 60,
            health_poll_interval_seconds: 30,
            fallback_delay_min_ms: 2000,
            fallback_delay_max_ms: 3000,
        }
    }
}

impl Config {
    /// 設定ファイルを読み込み、環境変数で上書き
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_url = url;
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| InspectorError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("car-inspector").join("config.json"))
    }

    pub fn set_api_url(&mut self, url: String) -> Result<()> {
        self.api_url = url;
        self.validate()?;
        self.save()
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(InspectorError::Config(format!(
                "api_url must start with http:// or https://: {}",
                self.api_url
            )));
        }
        if self.fallback_delay_min_ms > self.fallback_delay_max_ms {
            return Err(InspectorError::Config(format!(
                "fallback delay range is empty: {}..{} ms",
                self.fallback_delay_min_ms, self.fallback_delay_max_ms
            )));
        }
        Ok(())
    }

    /// 末尾スラッシュなしのベースURL
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_seconds > 0).then(|| Duration::from_secs(self.request_timeout_seconds))
    }

    pub fn health_poll_interval(&self) -> Duration {
        Duration::from_secs(self.health_poll_interval_seconds.max(1))
    }
}
