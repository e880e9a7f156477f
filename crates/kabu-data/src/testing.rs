//! 테스트용 수집기/저장소.
//!
//! `test-utils` feature로 다른 crate의 테스트에서도 사용할 수 있습니다.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use kabu_core::{FetchError, SnapshotFetcher, StockSnapshot, Ticker};

use crate::error::{DataError, Result};
use crate::storage::{CacheEntry, MemorySnapshotStore, SnapshotStore};

enum StubResponse {
    Snapshot(StockSnapshot),
    Failure(String),
}

/// 미리 정해진 응답을 돌려주고 호출 횟수를 세는 수집기.
///
/// 등록되지 않은 티커는 `FetchError::MissingField("company name")`으로 실패합니다.
#[derive(Default)]
pub struct StubFetcher {
    responses: Mutex<HashMap<String, StubResponse>>,
    calls: AtomicUsize,
}

impl StubFetcher {
    /// 빈 수집기 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 스냅샷 응답 등록 (키: `snapshot.ticker`).
    pub fn with_snapshot(self, snapshot: StockSnapshot) -> Self {
        self.set_snapshot(snapshot);
        self
    }

    /// 전송 실패 응답 등록.
    pub fn with_failure(self, ticker: &str, message: &str) -> Self {
        self.set_failure(ticker, message);
        self
    }

    /// 스냅샷 응답 등록/교체.
    pub fn set_snapshot(&self, snapshot: StockSnapshot) {
        self.lock()
            .insert(snapshot.ticker.clone(), StubResponse::Snapshot(snapshot));
    }

    /// 실패 응답 등록/교체.
    pub fn set_failure(&self, ticker: &str, message: &str) {
        self.lock()
            .insert(ticker.to_string(), StubResponse::Failure(message.to_string()));
    }

    /// 지금까지의 `fetch` 호출 횟수.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, StubResponse>> {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SnapshotFetcher for StubFetcher {
    fn source_name(&self) -> &str {
        "stub"
    }

    async fn fetch(&self, ticker: &Ticker) -> std::result::Result<StockSnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.lock().get(ticker.as_str()) {
            Some(StubResponse::Snapshot(snapshot)) => Ok(snapshot.clone()),
            Some(StubResponse::Failure(message)) => Err(FetchError::Transport(message.clone())),
            None => Err(FetchError::MissingField("company name")),
        }
    }
}

/// 호출 횟수를 세는 메모리 저장소.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemorySnapshotStore,
    lookups: AtomicUsize,
    upserts: AtomicUsize,
}

impl RecordingStore {
    /// 빈 저장소 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 초기 항목으로 저장소 생성.
    pub fn with_entries(entries: impl IntoIterator<Item = CacheEntry>) -> Self {
        Self {
            inner: MemorySnapshotStore::with_entries(entries),
            ..Default::default()
        }
    }

    /// `lookup` 호출 횟수.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// `upsert` 호출 횟수.
    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    /// 호출 횟수에 영향을 주지 않고 항목을 읽습니다.
    pub async fn peek(&self, ticker: &str) -> Option<CacheEntry> {
        self.inner.lookup(ticker).await.ok().flatten()
    }
}

#[async_trait]
impl SnapshotStore for RecordingStore {
    fn backend_name(&self) -> &'static str {
        "recording"
    }

    async fn lookup(&self, ticker: &str) -> Result<Option<CacheEntry>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup(ticker).await
    }

    async fn upsert(&self, entry: &CacheEntry) -> Result<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(entry).await
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// 모든 작업이 연결 오류로 실패하는 저장소.
#[derive(Debug, Default)]
pub struct UnavailableStore;

#[async_trait]
impl SnapshotStore for UnavailableStore {
    fn backend_name(&self) -> &'static str {
        "unavailable"
    }

    async fn lookup(&self, _ticker: &str) -> Result<Option<CacheEntry>> {
        Err(DataError::ConnectionError("store unavailable".to_string()))
    }

    async fn upsert(&self, _entry: &CacheEntry) -> Result<()> {
        Err(DataError::ConnectionError("store unavailable".to_string()))
    }

    async fn health_check(&self) -> Result<()> {
        Err(DataError::ConnectionError("store unavailable".to_string()))
    }
}
