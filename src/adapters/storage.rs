use crate::domain::ports::KeyValueStore;
use crate::utils::error::{QuoteError, Result};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// File-backed store: one file per key under `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\', '\0']) || key.contains("..") {
            return Err(QuoteError::InvalidConfigValueError {
                field: "storage.key".to_string(),
                value: key.to_string(),
                reason: "Key must be a plain file name".to_string(),
            });
        }
        Ok(Path::new(&self.base_path).join(key))
    }
}

impl KeyValueStore for LocalStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let full_path = self.key_path(key)?;
        match tokio::fs::read_to_string(&full_path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let full_path = self.key_path(key)?;

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // 先寫暫存檔再 rename，避免中途中斷留下半個檔案
        let tmp_path = full_path.with_extension("tmp");
        tokio::fs::write(&tmp_path, value.as_bytes()).await?;
        tokio::fs::rename(&tmp_path, &full_path).await?;

        tracing::debug!("Persisted '{}' ({} bytes)", key, value.len());
        Ok(())
    }
}

/// In-memory store, cloneable so tests can inspect what the store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Arc::new(Mutex::new(map)),
        }
    }
}

impl KeyValueStore for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
