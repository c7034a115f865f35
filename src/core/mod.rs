pub mod scheduler;
pub mod store;
pub mod sync;

pub use crate::domain::model::{Quote, QuotePick, SyncOutcome, SyncPolicy};
pub use crate::domain::ports::{ConfigProvider, KeyValueStore, QuoteSource};
pub use crate::utils::error::Result;
