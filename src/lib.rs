pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::TomlConfig;

pub use adapters::{HttpQuoteSource, LocalStorage, MemoryStorage};
pub use core::{scheduler::SyncScheduler, store::QuoteStore, store::StoreOptions};
pub use domain::model::{Quote, QuotePick, SyncOutcome, SyncPolicy};
pub use utils::error::{QuoteError, Result};
