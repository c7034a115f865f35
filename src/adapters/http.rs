use crate::domain::model::{Quote, RemoteRecord};
use crate::domain::ports::{ConfigProvider, QuoteSource};
use crate::utils::error::{QuoteError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// HTTP quote source: GET for the record list, POST for new quotes.
#[derive(Debug, Clone)]
pub struct HttpQuoteSource {
    endpoint: String,
    client: Client,
}

impl HttpQuoteSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(config.api_endpoint(), config.request_timeout())
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteSource {
    async fn fetch_records(&self) -> Result<Vec<RemoteRecord>> {
        tracing::debug!("Fetching quotes from: {}", self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await?
            .error_for_status()?;

        tracing::debug!("API response status: {}", response.status());

        let json_data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| QuoteError::decode(format!("response body: {}", e)))?;
        let serde_json::Value::Array(items) = json_data else {
            return Err(QuoteError::decode("expected a JSON array of records"));
        };

        // 單筆壞資料不影響其他記錄
        Ok(items.iter().map(RemoteRecord::from_value).collect())
    }

    async fn post_quote(&self, quote: &Quote) -> Result<serde_json::Value> {
        tracing::debug!("Posting quote to: {}", self.endpoint);
        let body = serde_json::to_string(quote)?;
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await?
            .error_for_status()?;

        response
            .json()
            .await
            .map_err(|e| QuoteError::decode(format!("post response: {}", e)))
    }
}
