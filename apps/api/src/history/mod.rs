//! Capped, newest-first history of completed analyses.
//!
//! The whole history is one JSON array under a fixed key. Unreadable data is
//! treated as an empty history rather than an error, so a corrupt entry can
//! never block new analyses.

pub mod handlers;
pub mod store;

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::analysis::{CheckType, ContentType, PolicyAnalysisResult};
use crate::models::history::{HistoryEntry, HistoryFile};
use store::{KeyValueStore, StoreError};

pub const HISTORY_KEY: &str = "adCheckHistory";
pub const MAX_HISTORY_ITEMS: usize = 10;

/// Inputs that produced an analysis, kept so it can be restored later.
#[derive(Debug, Clone)]
pub struct AnalysisInputs {
    pub files: Vec<HistoryFile>,
    pub content: String,
    pub content_type: ContentType,
    pub check_type: CheckType,
}

#[derive(Clone)]
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    /// Serialises the list-modify-write cycle of `record` and `clear`.
    writes: Arc<tokio::sync::Mutex<()>>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            writes: Arc::default(),
        }
    }

    /// All entries, newest first. Absent or corrupt data reads as empty;
    /// only connection failures are errors.
    pub async fn list(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        let raw = match self.store.get(HISTORY_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(vec![]),
            Err(e) if e.is_unreadable_data() => {
                warn!("Stored history has an unreadable value, treating as empty: {e}");
                return Ok(vec![]);
            }
            Err(e) => return Err(e),
        };
        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!("Stored history is unreadable, treating as empty: {e}");
                Ok(vec![])
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<HistoryEntry>, StoreError> {
        Ok(self.list().await?.into_iter().find(|e| e.id == id))
    }

    /// Prepends a new entry for `result` and evicts anything past `MAX_HISTORY_ITEMS`.
    pub async fn record(
        &self,
        result: &PolicyAnalysisResult,
        inputs: AnalysisInputs,
    ) -> Result<HistoryEntry, StoreError> {
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            summary: result.summary.clone(),
            status: result.status,
            result: result.clone(),
            original_files: inputs.files,
            original_content: inputs.content,
            original_content_type: inputs.content_type,
            original_check_type: inputs.check_type,
        };

        let _write = self.writes.lock().await;
        let mut entries = self.list().await?;
        entries.insert(0, entry.clone());
        entries.truncate(MAX_HISTORY_ITEMS);

        self.store
            .set(HISTORY_KEY, serde_json::to_string(&entries)?)
            .await?;
        info!(id = %entry.id, total = entries.len(), "History entry recorded");
        Ok(entry)
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        let _write = self.writes.lock().await;
        self.store.delete(HISTORY_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::mock::sample_result;
    use async_trait::async_trait;
    use redis::{ErrorKind, RedisError};
    use store::MemoryKeyValueStore;
    use tokio::task::JoinSet;

    /// Fails every read with a fixed Redis error kind.
    struct FailingReads(ErrorKind);

    #[async_trait]
    impl KeyValueStore for FailingReads {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(RedisError::from((self.0, "scripted failure")).into())
        }
        async fn set(&self, _key: &str, _value: String) -> Result<(), StoreError> {
            Ok(())
        }
        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    /// Memory store that yields to the scheduler between a read and the next write.
    #[derive(Default)]
    struct YieldingStore(MemoryKeyValueStore);

    #[async_trait]
    impl KeyValueStore for YieldingStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            let value = self.0.get(key).await;
            tokio::task::yield_now().await;
            value
        }
        async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
            self.0.set(key, value).await
        }
        async fn delete(&self, key: &str) -> Result<(), StoreError> {
            self.0.delete(key).await
        }
    }

    fn inputs(content: &str) -> AnalysisInputs {
        AnalysisInputs {
            files: vec![],
            content: content.to_string(),
            content_type: ContentType::TextPost,
            check_type: CheckType::Comprehensive,
        }
    }

    fn history() -> (HistoryStore, Arc<MemoryKeyValueStore>) {
        let kv = Arc::new(MemoryKeyValueStore::default());
        (HistoryStore::new(kv.clone()), kv)
    }

    #[tokio::test]
    async fn test_empty_history_lists_nothing() {
        let (history, _) = history();
        assert!(history.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_prepends_newest() {
        let (history, _) = history();
        history.record(&sample_result(false), inputs("first")).await.unwrap();
        history.record(&sample_result(false), inputs("second")).await.unwrap();

        let entries = history.list().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].original_content, "second");
        assert_eq!(entries[1].original_content, "first");
    }

    #[tokio::test]
    async fn test_eleventh_entry_evicts_oldest() {
        let (history, _) = history();
        for i in 0..=MAX_HISTORY_ITEMS {
            history
                .record(&sample_result(false), inputs(&format!("ad {i}")))
                .await
                .unwrap();
        }

        let entries = history.list().await.unwrap();
        assert_eq!(entries.len(), MAX_HISTORY_ITEMS);
        assert_eq!(entries[0].original_content, "ad 10");
        assert!(entries.iter().all(|e| e.original_content != "ad 0"));
    }

    #[tokio::test]
    async fn test_corrupt_history_reads_as_empty_and_recovers() {
        let (history, kv) = history();
        kv.set(HISTORY_KEY, "{not json".to_string()).await.unwrap();
        assert!(history.list().await.unwrap().is_empty());

        history.record(&sample_result(false), inputs("fresh")).await.unwrap();
        assert_eq!(history.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_and_clear() {
        let (history, _) = history();
        let entry = history.record(&sample_result(true), inputs("x")).await.unwrap();

        let found = history.get(entry.id).await.unwrap().unwrap();
        assert_eq!(found.summary, entry.summary);
        assert!(history.get(Uuid::new_v4()).await.unwrap().is_none());

        history.clear().await.unwrap();
        assert!(history.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_type_value_reads_as_empty_and_record_succeeds() {
        let history = HistoryStore::new(Arc::new(FailingReads(ErrorKind::TypeError)));
        assert!(history.list().await.unwrap().is_empty());
        assert!(history.record(&sample_result(false), inputs("x")).await.is_ok());
    }

    #[tokio::test]
    async fn test_connection_failure_still_propagates() {
        let history = HistoryStore::new(Arc::new(FailingReads(ErrorKind::IoError)));
        assert!(history.list().await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_records_are_all_kept() {
        let history = HistoryStore::new(Arc::new(YieldingStore::default()));
        let mut tasks = JoinSet::new();
        for i in 0..5 {
            let history = history.clone();
            tasks.spawn(async move {
                history
                    .record(&sample_result(false), inputs(&format!("ad {i}")))
                    .await
                    .unwrap();
            });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap();
        }

        assert_eq!(history.list().await.unwrap().len(), 5);
    }
}
