//! 백그라운드 캐시 저장기.
//!
//! 수집에 성공한 스냅샷은 응답을 먼저 돌려준 뒤 이 저장기를 통해 비동기로 저장됩니다.
//!
//! # 동작 방식
//!
//! 1. `submit`은 제한된 크기의 대기열에 저장 요청을 넣고 즉시 반환 (대기열이 가득 차면 버림)
//! 2. 워커 태스크 하나가 대기열을 순서대로 처리하며 건마다 `write_timeout`을 적용
//! 3. 저장 실패는 로그와 카운터에만 남고 호출자에게 전달되지 않음
//! 4. `shutdown`은 새 요청을 막고 남은 요청을 비운 뒤, 제한 시간이 지나면 워커를 중단

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::storage::{CacheEntry, SnapshotStore};

/// 대기열 명령.
enum WriteCommand {
    Upsert(CacheEntry),
    Flush(oneshot::Sender<()>),
}

/// 저장기 설정.
#[derive(Debug, Clone, Copy)]
pub struct WriterConfig {
    /// 대기열 크기
    pub queue_capacity: usize,
    /// 저장 1건당 타임아웃
    pub write_timeout: Duration,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            write_timeout: Duration::from_secs(5),
        }
    }
}

/// 저장기 통계.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// 대기열에 들어간 저장 요청 수
    pub submitted: u64,
    /// 저장 성공 수
    pub written: u64,
    /// 저장 실패 수 (에러 + 타임아웃)
    pub failed: u64,
    /// 대기열 포화/종료로 버려진 요청 수
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct WriterCounters {
    submitted: AtomicU64,
    written: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl WriterCounters {
    fn snapshot(&self) -> WriterStats {
        WriterStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// 백그라운드 캐시 저장기.
pub struct CacheWriter {
    tx: mpsc::Sender<WriteCommand>,
    shutdown: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
    counters: Arc<WriterCounters>,
}

impl CacheWriter {
    /// 워커 태스크를 시작하고 저장기를 반환합니다.
    ///
    /// tokio 런타임 안에서 호출해야 합니다.
    pub fn spawn(store: Arc<dyn SnapshotStore>, config: WriterConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let shutdown = CancellationToken::new();
        let counters = Arc::new(WriterCounters::default());

        let worker = tokio::spawn(run_worker(
            rx,
            store,
            config.write_timeout,
            counters.clone(),
            shutdown.clone(),
        ));

        Self {
            tx,
            shutdown,
            worker: Mutex::new(Some(worker)),
            counters,
        }
    }

    /// 저장 요청을 대기열에 넣습니다.
    ///
    /// 절대 대기하지 않습니다. 대기열이 가득 찼거나 종료된 경우 요청을 버리고 `false`를 반환합니다.
    pub fn submit(&self, entry: CacheEntry) -> bool {
        let ticker = entry.ticker.clone();
        match self.tx.try_send(WriteCommand::Upsert(entry)) {
            Ok(()) => {
                self.counters.submitted.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(ticker = %ticker, "캐시 저장 대기열 포화, 저장 요청 버림");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(ticker = %ticker, "캐시 저장기 종료됨, 저장 요청 버림");
                false
            }
        }
    }

    /// 지금까지 제출된 저장 요청이 모두 처리될 때까지 기다립니다.
    ///
    /// 저장기가 이미 종료된 경우 즉시 반환합니다.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(WriteCommand::Flush(ack_tx)).await.is_err() {
            return;
        }
        let _ = ack_rx.await;
    }

    /// 대기 중인 요청 수.
    pub fn pending(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    /// 통계 반환.
    pub fn stats(&self) -> WriterStats {
        self.counters.snapshot()
    }

    /// 새 요청을 막고 남은 요청을 비운 뒤 워커를 종료합니다.
    ///
    /// `drain_timeout` 안에 끝나면 `true`, 시간을 넘겨 워커를 중단했으면 `false`를 반환합니다.
    /// 두 번째 호출부터는 아무 일도 하지 않고 `true`를 반환합니다.
    pub async fn shutdown(&self, drain_timeout: Duration) -> bool {
        self.shutdown.cancel();

        let handle = match self.worker.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(mut handle) = handle else {
            return true;
        };

        match tokio::time::timeout(drain_timeout, &mut handle).await {
            Ok(_) => {
                info!(stats = ?self.stats(), "캐시 저장기 종료 완료");
                true
            }
            Err(_) => {
                handle.abort();
                warn!(
                    pending = self.pending(),
                    timeout_secs = drain_timeout.as_secs_f64(),
                    "캐시 저장기 종료 타임아웃, 남은 저장 요청 중단"
                );
                false
            }
        }
    }
}

impl Drop for CacheWriter {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<WriteCommand>,
    store: Arc<dyn SnapshotStore>,
    write_timeout: Duration,
    counters: Arc<WriterCounters>,
    shutdown: CancellationToken,
) {
    let mut closing = false;

    loop {
        let command = tokio::select! {
            biased;
            command = rx.recv() => command,
            _ = shutdown.cancelled(), if !closing => {
                // 새 요청은 막고 이미 들어온 요청은 계속 처리
                rx.close();
                closing = true;
                continue;
            }
        };

        match command {
            Some(WriteCommand::Upsert(entry)) => {
                write_entry(store.as_ref(), &entry, write_timeout, &counters).await;
            }
            Some(WriteCommand::Flush(ack)) => {
                let _ = ack.send(());
            }
            None => break,
        }
    }

    debug!("캐시 저장 워커 종료");
}

async fn write_entry(
    store: &dyn SnapshotStore,
    entry: &CacheEntry,
    write_timeout: Duration,
    counters: &WriterCounters,
) {
    match tokio::time::timeout(write_timeout, store.upsert(entry)).await {
        Ok(Ok(())) => {
            counters.written.fetch_add(1, Ordering::Relaxed);
            debug!(ticker = %entry.ticker, backend = store.backend_name(), "캐시 저장 완료");
        }
        Ok(Err(e)) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            warn!(ticker = %entry.ticker, error = %e, "캐시 저장 실패");
        }
        Err(_) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            warn!(
                ticker = %entry.ticker,
                timeout_secs = write_timeout.as_secs_f64(),
                "캐시 저장 타임아웃"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DataError, Result};
    use crate::storage::MemorySnapshotStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Notify;

    fn entry(ticker: &str) -> CacheEntry {
        CacheEntry::new(ticker, format!(r#"{{"ticker":"{ticker}"}}"#), Utc::now())
    }

    /// 항상 실패하는 저장소.
    struct BrokenStore;

    #[async_trait]
    impl SnapshotStore for BrokenStore {
        fn backend_name(&self) -> &'static str {
            "broken"
        }
        async fn lookup(&self, _ticker: &str) -> Result<Option<CacheEntry>> {
            Err(DataError::ConnectionError("down".into()))
        }
        async fn upsert(&self, _entry: &CacheEntry) -> Result<()> {
            Err(DataError::ConnectionError("down".into()))
        }
        async fn health_check(&self) -> Result<()> {
            Err(DataError::ConnectionError("down".into()))
        }
    }

    /// 첫 저장에서 해제 신호를 기다리는 저장소.
    struct GateStore {
        inner: MemorySnapshotStore,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl SnapshotStore for GateStore {
        fn backend_name(&self) -> &'static str {
            "gate"
        }
        async fn lookup(&self, ticker: &str) -> Result<Option<CacheEntry>> {
            self.inner.lookup(ticker).await
        }
        async fn upsert(&self, entry: &CacheEntry) -> Result<()> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.upsert(entry).await
        }
        async fn health_check(&self) -> Result<()> {
            Ok(())
        }
    }

    /// 저장이 끝나지 않는 저장소.
    struct HangingStore;

    #[async_trait]
    impl SnapshotStore for HangingStore {
        fn backend_name(&self) -> &'static str {
            "hanging"
        }
        async fn lookup(&self, _ticker: &str) -> Result<Option<CacheEntry>> {
            Ok(None)
        }
        async fn upsert(&self, _entry: &CacheEntry) -> Result<()> {
            std::future::pending::<()>().await;
            Ok(())
        }
        async fn health_check(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_submitted_entries_are_written() {
        let store = Arc::new(MemorySnapshotStore::new());
        let writer = CacheWriter::spawn(store.clone(), WriterConfig::default());

        assert!(writer.submit(entry("7203")));
        assert!(writer.submit(entry("AAPL")));
        writer.flush().await;

        assert_eq!(store.len().await, 2);
        let stats = writer.stats();
        assert_eq!(stats.submitted, 2);
        assert_eq!(stats.written, 2);
        assert_eq!(stats.failed, 0);
    }

    #[tokio::test]
    async fn test_store_errors_are_absorbed() {
        let writer = CacheWriter::spawn(Arc::new(BrokenStore), WriterConfig::default());

        assert!(writer.submit(entry("7203")));
        writer.flush().await;

        let stats = writer.stats();
        assert_eq!(stats.written, 0);
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_timeout_counts_as_failure() {
        let config = WriterConfig {
            queue_capacity: 8,
            write_timeout: Duration::from_secs(1),
        };
        let writer = CacheWriter::spawn(Arc::new(HangingStore), config);

        assert!(writer.submit(entry("7203")));
        writer.flush().await;

        assert_eq!(writer.stats().failed, 1);
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let store = Arc::new(GateStore {
            inner: MemorySnapshotStore::new(),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let config = WriterConfig {
            queue_capacity: 1,
            write_timeout: Duration::from_secs(30),
        };
        let writer = CacheWriter::spawn(store.clone(), config);

        // 첫 요청은 워커가 꺼내서 저장소에서 대기
        assert!(writer.submit(entry("A1")));
        store.entered.notified().await;

        // 두 번째는 대기열에 들어가고 세 번째는 버려짐
        assert!(writer.submit(entry("B2")));
        assert!(!writer.submit(entry("C3")));
        assert_eq!(writer.stats().dropped, 1);

        store.release.notify_one();
        store.entered.notified().await;
        store.release.notify_one();
        writer.flush().await;

        assert!(store.inner.lookup("A1").await.unwrap().is_some());
        assert!(store.inner.lookup("B2").await.unwrap().is_some());
        assert!(store.inner.lookup("C3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_shutdown_drains_pending_writes() {
        let store = Arc::new(MemorySnapshotStore::new());
        let writer = CacheWriter::spawn(store.clone(), WriterConfig::default());

        for ticker in ["A1", "B2", "C3"] {
            assert!(writer.submit(entry(ticker)));
        }
        assert!(writer.shutdown(Duration::from_secs(5)).await);

        assert_eq!(store.len().await, 3);
        assert!(!writer.submit(entry("D4")));
        assert_eq!(writer.stats().dropped, 1);

        // 두 번째 종료 호출은 무해
        assert!(writer.shutdown(Duration::from_secs(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_times_out_on_hanging_store() {
        let config = WriterConfig {
            queue_capacity: 8,
            write_timeout: Duration::from_secs(3600),
        };
        let writer = CacheWriter::spawn(Arc::new(HangingStore), config);

        assert!(writer.submit(entry("7203")));
        assert!(!writer.shutdown(Duration::from_secs(2)).await);
    }
}
