//! 프로세스 내 스냅샷 저장소.
//!
//! `DATABASE_URL`이 없을 때 사용하며, 프로세스가 종료되면 내용이 사라집니다.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{CacheEntry, SnapshotStore};
use crate::error::Result;

/// 메모리 스냅샷 저장소.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemorySnapshotStore {
    /// 빈 저장소 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 초기 항목으로 저장소 생성.
    pub fn with_entries(entries: impl IntoIterator<Item = CacheEntry>) -> Self {
        let map = entries
            .into_iter()
            .map(|entry| (entry.ticker.clone(), entry))
            .collect();
        Self {
            entries: RwLock::new(map),
        }
    }

    /// 저장된 티커 수.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// 비어 있는지 여부.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn lookup(&self, ticker: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.read().await.get(ticker).cloned())
    }

    async fn upsert(&self, entry: &CacheEntry) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(entry.ticker.clone(), entry.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_lookup_missing_is_none() {
        let store = MemorySnapshotStore::new();
        assert!(store.lookup("7203").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_entry() {
        let store = MemorySnapshotStore::new();
        let old = CacheEntry::new("7203", r#"{"v":1}"#, Utc::now() - Duration::hours(2));
        let new = CacheEntry::new("7203", r#"{"v":2}"#, Utc::now());

        store.upsert(&old).await.unwrap();
        store.upsert(&new).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.lookup("7203").await.unwrap(), Some(new));
    }

    #[tokio::test]
    async fn test_keys_are_case_sensitive() {
        let store = MemorySnapshotStore::with_entries([CacheEntry::new("aapl", "{}", Utc::now())]);
        assert!(store.lookup("AAPL").await.unwrap().is_none());
        assert!(store.lookup("aapl").await.unwrap().is_some());
    }
}
