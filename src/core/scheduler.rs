//! Background task that keeps the quote collection in sync with the server.

use crate::core::store::QuoteStore;
use crate::domain::model::SyncOutcome;
use crate::domain::ports::{KeyValueStore, QuoteSource};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs `sync_quotes` on a fixed interval until cancelled. The first tick is
/// immediate, so a sync also happens at startup.
pub struct SyncScheduler {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl SyncScheduler {
    pub fn spawn<S, R>(
        store: Arc<QuoteStore<S, R>>,
        period: Duration,
        token: CancellationToken,
        notifier: Option<mpsc::UnboundedSender<SyncOutcome>>,
    ) -> Self
    where
        S: KeyValueStore + 'static,
        R: QuoteSource + 'static,
    {
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            info!("Quote sync scheduler started ({:?} interval)", period);

            let mut ticker = interval(period.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                match store.sync_quotes().await {
                    Ok(outcome) if outcome.changed() => {
                        if let Some(tx) = &notifier {
                            if tx.send(outcome).is_err() {
                                debug!("Sync outcome receiver dropped");
                            }
                        }
                    }
                    Ok(_) => {}
                    // 失敗不中斷排程，下一輪照常執行
                    Err(e) => warn!("Scheduled quote sync failed: {}", e),
                }
            }

            info!("Quote sync scheduler stopped");
        });

        Self { token, handle }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancels the loop and waits for the in-flight sync, if any, to finish.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            warn!("Quote sync scheduler task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStorage;
    use crate::core::store::StoreOptions;
    use crate::domain::model::{Quote, RemoteRecord};
    use crate::utils::error::{QuoteError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 每次 fetch 都回傳一筆新標題；奇數次失敗
    #[derive(Default)]
    struct FlakySource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl QuoteSource for FlakySource {
        async fn fetch_records(&self) -> Result<Vec<RemoteRecord>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call % 2 == 1 {
                return Err(QuoteError::decode("flaky"));
            }
            Ok(vec![RemoteRecord {
                title: Some(format!("server quote {}", call)),
            }])
        }

        async fn post_quote(&self, _quote: &Quote) -> Result<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }
    }

    #[tokio::test]
    async fn test_scheduler_keeps_running_after_failures() {
        let source = FlakySource::default();
        let calls = Arc::clone(&source.calls);
        let store = Arc::new(QuoteStore::new(
            MemoryStorage::new(),
            source,
            StoreOptions::default(),
        ));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let scheduler = SyncScheduler::spawn(
            Arc::clone(&store),
            Duration::from_millis(10),
            CancellationToken::new(),
            Some(tx),
        );

        // 第 0 次與第 2 次成功，中間那次失敗
        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        scheduler.shutdown().await;

        assert_eq!(first.added, 1);
        assert_eq!(second.added, 1);
        assert!(calls.load(Ordering::SeqCst) >= 3);
        assert!(store
            .quotes()
            .await
            .iter()
            .any(|q| q.text == "server quote 2"));
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_scheduler() {
        let source = FlakySource::default();
        let calls = Arc::clone(&source.calls);
        let store = Arc::new(QuoteStore::new(
            MemoryStorage::new(),
            source,
            StoreOptions::default(),
        ));
        let token = CancellationToken::new();
        token.cancel();

        let scheduler = SyncScheduler::spawn(store, Duration::from_millis(10), token, None);
        assert!(scheduler.is_cancelled());
        scheduler.shutdown().await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
