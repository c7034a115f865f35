use crate::config::{
    validate_provider, DEFAULT_FETCH_LIMIT, DEFAULT_SYNC_INTERVAL_SECS, DEFAULT_TIMEOUT_SECS,
};
use crate::core::{ConfigProvider, SyncPolicy};
use crate::utils::error::{QuoteError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub remote: RemoteConfig,
    pub storage: StorageConfig,
    pub sync: Option<SyncConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
    pub fetch_limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub interval_seconds: Option<u64>,
    pub policy: Option<SyncPolicy>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(QuoteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| QuoteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${QUOTE_API})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| QuoteError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.remote.endpoint
    }

    fn storage_path(&self) -> &str {
        &self.storage.path
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    fn fetch_limit(&self) -> usize {
        self.remote.fetch_limit.unwrap_or(DEFAULT_FETCH_LIMIT)
    }

    fn sync_interval(&self) -> Duration {
        let secs = self
            .sync
            .as_ref()
            .and_then(|s| s.interval_seconds)
            .unwrap_or(DEFAULT_SYNC_INTERVAL_SECS);
        Duration::from_secs(secs)
    }

    fn sync_policy(&self) -> SyncPolicy {
        self.sync
            .as_ref()
            .and_then(|s| s.policy)
            .unwrap_or_default()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
