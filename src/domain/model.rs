use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 分類選單的「全部」選項
pub const ALL_CATEGORIES: &str = "all";

/// 伺服器同步下來的名言所使用的分類
pub const SERVER_CATEGORY: &str = "server";

pub const NO_QUOTE_FOUND: &str = "No quote found!";

pub const EXPORT_FILE_NAME: &str = "quotes.json";

/// 持久化使用的 key
pub mod keys {
    pub const QUOTES: &str = "quotes";
    pub const LAST_CATEGORY: &str = "lastCategory";
    pub const LAST_QUOTE: &str = "lastQuote";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub category: String,
}

impl Quote {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }

    pub fn is_in(&self, category: &str) -> bool {
        category == ALL_CATEGORIES || self.category == category
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.text, self.category)
    }
}

/// Built-in quotes used when nothing has been persisted yet.
pub fn seed_quotes() -> Vec<Quote> {
    vec![
        Quote::new("Keep moving forward!", "motivation"),
        Quote::new("Eat. Sleep. Code. Repeat.", "coding"),
    ]
}

/// Result of a category-filtered random pick. An empty filter result is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotePick {
    Found(Quote),
    NotFound,
}

impl QuotePick {
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            QuotePick::Found(quote) => Some(quote),
            QuotePick::NotFound => None,
        }
    }

    pub fn display_text(&self) -> String {
        match self {
            QuotePick::Found(quote) => quote.to_string(),
            QuotePick::NotFound => NO_QUOTE_FOUND.to_string(),
        }
    }
}

/// How fetched server quotes are reconciled with the local collection.
///
/// `Merge` appends quotes whose text is not yet present and never touches
/// existing entries. `Replace` throws the whole local collection away in
/// favor of the fetched list, including every quote the user added; it is
/// kept only for parity with older deployments and must be chosen explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SyncPolicy {
    #[default]
    Merge,
    Replace,
}

impl fmt::Display for SyncPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncPolicy::Merge => write!(f, "merge"),
            SyncPolicy::Replace => write!(f, "replace"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub policy: SyncPolicy,
    pub fetched: usize,
    pub added: usize,
    pub total: usize,
    pub completed_at: DateTime<Utc>,
}

impl SyncOutcome {
    /// 只有集合有變動時才需要刷新分類
    pub fn changed(&self) -> bool {
        self.added > 0
    }

    pub fn summary(&self) -> String {
        match self.policy {
            SyncPolicy::Merge if self.added == 0 => "Quotes are already up to date".to_string(),
            SyncPolicy::Merge => format!("Synced {} new quote(s) from server", self.added),
            SyncPolicy::Replace => {
                format!("Quotes replaced with {} quote(s) from server", self.total)
            }
        }
    }
}

/// A generic record exposed by the remote source. Only `title` is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    #[serde(default)]
    pub title: Option<String>,
}

impl RemoteRecord {
    /// Lenient decode: a non-object element or a non-string `title` becomes an untitled record.
    pub fn from_value(value: &serde_json::Value) -> Self {
        Self {
            title: value
                .get("title")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
        }
    }
}
