use crate::core::sync::{reconcile, records_to_quotes};
use crate::domain::model::{
    keys, seed_quotes, Quote, QuotePick, SyncOutcome, SyncPolicy, ALL_CATEGORIES,
};
use crate::domain::ports::{ConfigProvider, KeyValueStore, QuoteSource};
use crate::utils::error::{QuoteError, Result};
use crate::utils::validation::require_non_blank;
use chrono::Utc;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub fetch_limit: usize,
    pub sync_policy: SyncPolicy,
    pub request_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            fetch_limit: 5,
            sync_policy: SyncPolicy::Merge,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl StoreOptions {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            fetch_limit: config.fetch_limit(),
            sync_policy: config.sync_policy(),
            request_timeout: config.request_timeout(),
        }
    }
}

#[derive(Debug)]
struct StoreState {
    quotes: Vec<Quote>,
    selected_category: String,
}

/// Owns the quote collection and the selected category.
///
/// Every mutation goes through the state mutex and is persisted before the
/// lock is released, so `add_quote`, `import_quotes` and `sync_quotes` can be
/// called from concurrent tasks. A failed persist rolls the in-memory change
/// back.
pub struct QuoteStore<S: KeyValueStore, R: QuoteSource> {
    storage: S,
    source: Arc<R>,
    options: StoreOptions,
    state: Mutex<StoreState>,
    pending_posts: std::sync::Mutex<JoinSet<()>>,
}

impl<S: KeyValueStore, R: QuoteSource + 'static> QuoteStore<S, R> {
    /// Creates a store holding the built-in seed quotes. Call [`load`](Self::load)
    /// to pick up persisted state.
    pub fn new(storage: S, source: R, options: StoreOptions) -> Self {
        Self {
            storage,
            source: Arc::new(source),
            options,
            state: Mutex::new(StoreState {
                quotes: seed_quotes(),
                selected_category: ALL_CATEGORIES.to_string(),
            }),
            pending_posts: std::sync::Mutex::new(JoinSet::new()),
        }
    }

    /// `new` + `load`.
    pub async fn open(storage: S, source: R, options: StoreOptions) -> Result<Self> {
        let store = Self::new(storage, source, options);
        store.load().await?;
        Ok(store)
    }

    pub async fn load(&self) -> Result<()> {
        let mut state = self.state.lock().await;

        match self.storage.get(keys::QUOTES).await? {
            Some(raw) => match decode_persisted_quotes(&raw) {
                Some(quotes) => {
                    tracing::debug!("Loaded {} persisted quotes", quotes.len());
                    state.quotes = quotes;
                }
                None => {
                    tracing::warn!("Persisted quotes are not a JSON array, using built-in quotes");
                }
            },
            None => tracing::debug!("No persisted quotes, using built-in quotes"),
        }

        state.selected_category = self
            .storage
            .get(keys::LAST_CATEGORY)
            .await?
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| ALL_CATEGORIES.to_string());

        Ok(())
    }

    pub async fn save(&self) -> Result<()> {
        let state = self.state.lock().await;
        self.persist_quotes(&state.quotes).await
    }

    async fn persist_quotes(&self, quotes: &[Quote]) -> Result<()> {
        let serialized = serde_json::to_string(quotes)?;
        self.storage.set(keys::QUOTES, &serialized).await
    }

    pub async fn quotes(&self) -> Vec<Quote> {
        self.state.lock().await.quotes.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.quotes.len()
    }

    /// Distinct categories in order of first occurrence, without the `all` sentinel.
    pub async fn list_categories(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut seen = HashSet::new();
        state
            .quotes
            .iter()
            .filter(|q| seen.insert(q.category.as_str()))
            .map(|q| q.category.clone())
            .collect()
    }

    /// Categories as offered to a selector: `all` first.
    pub async fn category_options(&self) -> Vec<String> {
        let mut options = vec![ALL_CATEGORIES.to_string()];
        options.extend(self.list_categories().await);
        options
    }

    pub async fn select_random_quote(&self, category: &str) -> QuotePick {
        let state = self.state.lock().await;
        let filtered: Vec<&Quote> = state.quotes.iter().filter(|q| q.is_in(category)).collect();

        let picked = filtered.choose(&mut rand::thread_rng()).map(|q| (*q).clone());
        match picked {
            Some(quote) => QuotePick::Found(quote),
            None => QuotePick::NotFound,
        }
    }

    /// Picks from the selected category and persists the displayed text as the last shown quote.
    pub async fn show_random_quote(&self) -> Result<String> {
        let category = self.selected_category().await;
        self.show_random_quote_in(&category).await
    }

    pub async fn show_random_quote_in(&self, category: &str) -> Result<String> {
        let display = self.select_random_quote(category).await.display_text();
        self.storage.set(keys::LAST_QUOTE, &display).await?;
        Ok(display)
    }

    pub async fn last_shown(&self) -> Result<Option<String>> {
        self.storage.get(keys::LAST_QUOTE).await
    }

    pub async fn selected_category(&self) -> String {
        self.state.lock().await.selected_category.clone()
    }

    pub async fn set_selected_category(&self, category: &str) -> Result<()> {
        let category = require_non_blank("category", category)?;
        let mut state = self.state.lock().await;
        self.storage.set(keys::LAST_CATEGORY, &category).await?;
        tracing::debug!("Selected category: {}", category);
        state.selected_category = category;
        Ok(())
    }

    /// Appends a quote, persists it and pushes it to the remote source in the background.
    /// The push never affects the result of this call.
    pub async fn add_quote(&self, text: &str, category: &str) -> Result<Quote> {
        let text = require_non_blank("quote text", text)?;
        let category = require_non_blank("category", category)?;
        let quote = Quote::new(text, category);

        {
            let mut state = self.state.lock().await;
            state.quotes.push(quote.clone());
            if let Err(e) = self.persist_quotes(&state.quotes).await {
                state.quotes.pop();
                return Err(e);
            }
        }

        tracing::info!("✅ Quote added: {}", quote);
        self.dispatch_post(quote.clone());
        Ok(quote)
    }

    fn dispatch_post(&self, quote: Quote) {
        let source = Arc::clone(&self.source);
        let timeout = self.options.request_timeout;
        let task = async move {
            match tokio::time::timeout(timeout, source.post_quote(&quote)).await {
                Ok(Ok(response)) => tracing::info!("📤 Posted quote to server: {}", response),
                Ok(Err(e)) => tracing::warn!("Failed to post quote to server: {}", e),
                Err(_) => tracing::warn!("Posting quote to server timed out after {:?}", timeout),
            }
        };

        let mut pending = self
            .pending_posts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // 清掉已完成的任務
        while pending.try_join_next().is_some() {}
        pending.spawn(task);
    }

    /// Waits for background posts started by [`add_quote`](Self::add_quote).
    /// Only meant for short-lived callers that are about to exit.
    pub async fn wait_for_pending_posts(&self) {
        let mut pending = {
            let mut guard = self
                .pending_posts
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            std::mem::take(&mut *guard)
        };

        while let Some(result) = pending.join_next().await {
            if let Err(e) = result {
                tracing::warn!("Background post task failed: {}", e);
            }
        }
    }

    /// Pretty-printed JSON array of the whole collection.
    pub async fn export_quotes(&self) -> Result<String> {
        let state = self.state.lock().await;
        Ok(serde_json::to_string_pretty(&state.quotes)?)
    }

    /// Appends every quote in `payload` verbatim (no dedup) and returns the count.
    pub async fn import_quotes(&self, payload: &str) -> Result<usize> {
        let imported = parse_import_payload(payload)?;
        let count = imported.len();

        let mut state = self.state.lock().await;
        let before = state.quotes.len();
        state.quotes.extend(imported);
        if let Err(e) = self.persist_quotes(&state.quotes).await {
            state.quotes.truncate(before);
            return Err(e);
        }

        tracing::info!("✅ Imported {} quote(s)", count);
        Ok(count)
    }

    /// Fetches up to `fetch_limit` server quotes. Failures are logged and yield an empty list.
    pub async fn fetch_remote_quotes(&self) -> Vec<Quote> {
        let timeout = self.options.request_timeout;
        match tokio::time::timeout(timeout, self.source.fetch_records()).await {
            Ok(Ok(records)) => {
                tracing::debug!("Fetched {} remote records", records.len());
                records_to_quotes(records, self.options.fetch_limit)
            }
            Ok(Err(e)) => {
                tracing::warn!("Failed to fetch quotes from server: {}", e);
                Vec::new()
            }
            Err(_) => {
                tracing::warn!("Fetching quotes from server timed out after {:?}", timeout);
                Vec::new()
            }
        }
    }

    /// Reconciles server quotes into the collection using the configured policy.
    ///
    /// Remote failures never surface here; only persistence errors do. An
    /// empty fetch leaves the collection untouched under either policy, so a
    /// failed fetch cannot wipe local quotes.
    pub async fn sync_quotes(&self) -> Result<SyncOutcome> {
        let fetched = self.fetch_remote_quotes().await;
        let fetched_count = fetched.len();
        let policy = self.options.sync_policy;

        let mut state = self.state.lock().await;
        let added = if fetched.is_empty() {
            0
        } else {
            let backup = state.quotes.clone();
            let added = reconcile(&mut state.quotes, fetched, policy);
            let changed = added > 0 || policy == SyncPolicy::Replace;
            if changed {
                if let Err(e) = self.persist_quotes(&state.quotes).await {
                    state.quotes = backup;
                    return Err(e);
                }
            }
            if policy == SyncPolicy::Replace {
                tracing::warn!(
                    "Replace sync discarded {} local quote(s) in favor of {} server quote(s)",
                    backup.len(),
                    fetched_count
                );
            }
            added
        };

        let outcome = SyncOutcome {
            policy,
            fetched: fetched_count,
            added,
            total: state.quotes.len(),
            completed_at: Utc::now(),
        };

        if outcome.changed() {
            tracing::info!("🔄 {}", outcome.summary());
        } else {
            tracing::debug!("Sync finished with no changes ({} fetched)", fetched_count);
        }

        Ok(outcome)
    }
}

/// Reads the persisted collection. Any JSON array is accepted; elements that
/// are not valid quotes are skipped so one bad entry cannot drop the rest.
fn decode_persisted_quotes(raw: &str) -> Option<Vec<Quote>> {
    let items: Vec<serde_json::Value> = serde_json::from_str(raw).ok()?;
    let total = items.len();

    let quotes: Vec<Quote> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Quote>(item) {
            Ok(quote) => Some(quote),
            Err(e) => {
                tracing::warn!("Skipping persisted quote {}: {}", index, e);
                None
            }
        })
        .collect();

    if quotes.len() < total {
        tracing::warn!("Skipped {} unreadable persisted quote(s)", total - quotes.len());
    }
    Some(quotes)
}

/// Decodes an import payload: a JSON array of objects with non-empty `text` and `category`.
pub fn parse_import_payload(payload: &str) -> Result<Vec<Quote>> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| QuoteError::format(format!("payload is not valid JSON: {}", e)))?;

    let serde_json::Value::Array(items) = value else {
        return Err(QuoteError::format("expected a JSON array of quotes"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let quote: Quote = serde_json::from_value(item)
                .map_err(|e| QuoteError::format(format!("element {}: {}", index, e)))?;
            if quote.text.trim().is_empty() || quote.category.trim().is_empty() {
                return Err(QuoteError::format(format!(
                    "element {}: text and category must not be empty",
                    index
                )));
            }
            Ok(quote)
        })
        .collect()
}
