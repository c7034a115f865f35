#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use toml_config::TomlConfig;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation;

pub const DEFAULT_API_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";
pub const DEFAULT_STORAGE_PATH: &str = "./quote-data";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_FETCH_LIMIT: usize = 5;
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;

/// 兩種配置來源共用的檢查
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validation::validate_url("remote.endpoint", config.api_endpoint())?;
    validation::validate_path("storage.path", config.storage_path())?;
    validation::validate_range(
        "remote.timeout_seconds",
        config.request_timeout().as_secs(),
        1,
        300,
    )?;
    validation::validate_positive_number("remote.fetch_limit", config.fetch_limit(), 1)?;
    validation::validate_range(
        "sync.interval_seconds",
        config.sync_interval().as_secs(),
        5,
        86_400,
    )?;
    Ok(())
}
