use crate::domain::model::{Quote, RemoteRecord, SyncPolicy, SERVER_CATEGORY};
use std::collections::HashSet;

/// Maps the first `limit` remote records into server quotes.
/// Untitled records inside that window are dropped; titles are kept verbatim.
pub fn records_to_quotes(records: Vec<RemoteRecord>, limit: usize) -> Vec<Quote> {
    records
        .into_iter()
        .take(limit)
        .filter_map(|record| {
            let title = record.title?;
            (!title.trim().is_empty()).then(|| Quote::new(title, SERVER_CATEGORY))
        })
        .collect()
}

/// Applies `fetched` to `local` and returns how many quotes were added.
///
/// Merge dedups by exact text only, so a server quote whose text already
/// exists under another category is ignored. Duplicates inside `fetched`
/// are also collapsed.
pub fn reconcile(local: &mut Vec<Quote>, fetched: Vec<Quote>, policy: SyncPolicy) -> usize {
    match policy {
        SyncPolicy::Merge => {
            let mut seen: HashSet<String> = local.iter().map(|q| q.text.clone()).collect();
            let before = local.len();
            for quote in fetched {
                if seen.insert(quote.text.clone()) {
                    local.push(quote);
                }
            }
            local.len() - before
        }
        SyncPolicy::Replace => {
            let added = fetched.len();
            *local = fetched;
            added
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: Option<&str>) -> RemoteRecord {
        RemoteRecord {
            title: title.map(str::to_string),
        }
    }

    #[test]
    fn test_merge_dedups_by_text_only() {
        let mut local = vec![Quote::new("A", "x"), Quote::new("B", "y")];
        let fetched = vec![Quote::new("A", "z"), Quote::new("C", "server")];

        let added = reconcile(&mut local, fetched, SyncPolicy::Merge);

        assert_eq!(added, 1);
        assert_eq!(
            local,
            vec![
                Quote::new("A", "x"),
                Quote::new("B", "y"),
                Quote::new("C", "server"),
            ]
        );
    }

    #[test]
    fn test_merge_collapses_duplicates_within_fetch() {
        let mut local = vec![];
        let fetched = vec![Quote::new("C", "server"), Quote::new("C", "server")];

        assert_eq!(reconcile(&mut local, fetched, SyncPolicy::Merge), 1);
        assert_eq!(local.len(), 1);
    }

    #[test]
    fn test_merge_with_nothing_new_is_noop() {
        let mut local = vec![Quote::new("A", "x")];
        let added = reconcile(&mut local, vec![Quote::new("A", "server")], SyncPolicy::Merge);

        assert_eq!(added, 0);
        assert_eq!(local, vec![Quote::new("A", "x")]);
    }

    /// 測試 replace 策略會丟掉本地新增的名言
    #[test]
    fn test_replace_discards_local_quotes() {
        let mut local = vec![Quote::new("mine", "personal")];
        let fetched = vec![Quote::new("S1", "server"), Quote::new("S2", "server")];

        let added = reconcile(&mut local, fetched.clone(), SyncPolicy::Replace);

        assert_eq!(added, 2);
        assert_eq!(local, fetched);
    }

    #[test]
    fn test_records_to_quotes_caps_and_tags() {
        let records = (1..=8)
            .map(|i| record(Some(&format!("title {}", i))))
            .collect::<Vec<_>>();

        let quotes = records_to_quotes(records, 5);

        assert_eq!(quotes.len(), 5);
        assert_eq!(quotes[0], Quote::new("title 1", SERVER_CATEGORY));
        assert!(quotes.iter().all(|q| q.category == SERVER_CATEGORY));
    }

    #[test]
    fn test_records_without_title_are_skipped() {
        let records = vec![record(None), record(Some("  ")), record(Some("kept"))];

        let quotes = records_to_quotes(records, 5);

        assert_eq!(quotes, vec![Quote::new("kept", SERVER_CATEGORY)]);
    }

    /// 測試無標題的記錄仍佔用前 5 筆的名額
    #[test]
    fn test_untitled_record_counts_toward_limit() {
        let mut records = vec![record(None)];
        records.extend((1..=5).map(|i| record(Some(&format!("t{}", i)))));

        let quotes = records_to_quotes(records, 5);

        let texts: Vec<&str> = quotes.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["t1", "t2", "t3", "t4"]);
    }

    #[test]
    fn test_server_title_is_kept_verbatim() {
        let quotes = records_to_quotes(vec![record(Some("  A  "))], 5);
        assert_eq!(quotes, vec![Quote::new("  A  ", SERVER_CATEGORY)]);

        // 與匯入的相同文字去重
        let mut local = vec![Quote::new("  A  ", "imported")];
        assert_eq!(reconcile(&mut local, quotes, SyncPolicy::Merge), 0);
    }
}
