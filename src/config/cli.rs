use crate::config::{
    validate_provider, DEFAULT_API_ENDPOINT, DEFAULT_FETCH_LIMIT, DEFAULT_STORAGE_PATH,
    DEFAULT_SYNC_INTERVAL_SECS, DEFAULT_TIMEOUT_SECS,
};
use crate::core::{ConfigProvider, SyncPolicy};
use crate::domain::model::EXPORT_FILE_NAME;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Parser, Subcommand};
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "quote-sync")]
#[command(about = "Keep a local quote collection and sync it with a remote quote source")]
pub struct CliConfig {
    #[arg(long, global = true, default_value = DEFAULT_API_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, global = true, default_value = DEFAULT_STORAGE_PATH)]
    pub storage_path: String,

    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    #[arg(long, global = true, default_value_t = DEFAULT_FETCH_LIMIT)]
    pub fetch_limit: usize,

    #[arg(long, global = true, default_value_t = DEFAULT_SYNC_INTERVAL_SECS)]
    pub sync_interval_seconds: u64,

    #[arg(long, global = true, value_enum, default_value_t = SyncPolicy::Merge)]
    pub sync_policy: SyncPolicy,

    /// TOML config file; replaces the connection and storage flags above
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show a random quote from the selected (or given) category
    Show {
        #[arg(long)]
        category: Option<String>,
    },
    /// List the categories offered by the filter
    Categories,
    /// Add a new quote
    Add { text: String, category: String },
    /// Change the selected category and show a quote from it
    Filter { category: String },
    /// Export all quotes as JSON
    Export {
        #[arg(short, long, default_value = EXPORT_FILE_NAME)]
        output: String,
    },
    /// Import quotes from a JSON file
    Import { file: String },
    /// Sync once with the server
    Sync,
    /// Sync periodically until interrupted
    Watch,
    /// Print the last shown quote
    Last,
}

impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn storage_path(&self) -> &str {
        &self.storage_path
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn fetch_limit(&self) -> usize {
        self.fetch_limit
    }

    fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_seconds)
    }

    fn sync_policy(&self) -> SyncPolicy {
        self.sync_policy
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse_from(["quote-sync", "sync"]);

        assert_eq!(config.api_endpoint(), DEFAULT_API_ENDPOINT);
        assert_eq!(config.fetch_limit(), 5);
        assert_eq!(config.sync_interval(), Duration::from_secs(30));
        assert_eq!(config.sync_policy(), SyncPolicy::Merge);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_add_subcommand_with_global_flags() {
        let config = CliConfig::parse_from([
            "quote-sync",
            "add",
            "Keep going",
            "motivation",
            "--sync-policy",
            "replace",
        ]);

        assert_eq!(config.sync_policy, SyncPolicy::Replace);
        match config.command {
            Command::Add { text, category } => {
                assert_eq!(text, "Keep going");
                assert_eq!(category, "motivation");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let config = CliConfig::parse_from(["quote-sync", "--timeout-seconds", "0", "sync"]);
        assert!(config.validate().is_err());
    }
}
