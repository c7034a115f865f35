use crate::domain::model::{Quote, RemoteRecord, SyncPolicy};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Page-local style key/value persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> impl std::future::Future<Output = Result<Option<String>>> + Send;
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Remote collaborator the store syncs against.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_records(&self) -> Result<Vec<RemoteRecord>>;
    async fn post_quote(&self, quote: &Quote) -> Result<serde_json::Value>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn storage_path(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn fetch_limit(&self) -> usize;
    fn sync_interval(&self) -> Duration;
    fn sync_policy(&self) -> SyncPolicy;
}
