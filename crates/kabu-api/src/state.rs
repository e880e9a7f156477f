//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 여러 요청 간에 공유됩니다.

use std::sync::Arc;

use kabu_core::{CacheConfig, SnapshotFetcher};
use kabu_data::{
    CacheWriter, FreshnessPolicy, SnapshotResolver, SnapshotStore, WriterConfig,
};

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 캐시 우선 스냅샷 해석기
    pub resolver: Arc<SnapshotResolver>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 해석기로 AppState 생성.
    pub fn new(resolver: SnapshotResolver) -> Self {
        Self {
            resolver: Arc::new(resolver),
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 수집기와 저장소로 해석기를 구성하여 AppState 생성.
    ///
    /// 백그라운드 저장기 태스크를 시작하므로 tokio 런타임 안에서 호출해야 합니다.
    pub fn from_parts(
        fetcher: Arc<dyn SnapshotFetcher>,
        store: Arc<dyn SnapshotStore>,
        cache: &CacheConfig,
    ) -> Self {
        let writer = Arc::new(CacheWriter::spawn(
            store.clone(),
            WriterConfig {
                queue_capacity: cache.write_queue_capacity,
                write_timeout: cache.write_timeout(),
            },
        ));
        let policy = FreshnessPolicy::new(cache.ttl());

        Self::new(SnapshotResolver::new(fetcher, store, policy, writer))
    }

    /// 캐시 저장소.
    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        self.resolver.store()
    }

    /// 백그라운드 저장기.
    pub fn writer(&self) -> &Arc<CacheWriter> {
        self.resolver.writer()
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 외부 요청이나 DB 연결 없이 메모리 저장소와 빈 스텁 수집기를 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use kabu_data::testing::StubFetcher;
    use kabu_data::MemorySnapshotStore;

    create_test_state_with(
        Arc::new(StubFetcher::new()),
        Arc::new(MemorySnapshotStore::new()),
    )
}

/// 지정한 수집기/저장소로 테스트용 AppState 생성.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state_with(
    fetcher: Arc<dyn SnapshotFetcher>,
    store: Arc<dyn SnapshotStore>,
) -> AppState {
    AppState::from_parts(fetcher, store, &CacheConfig::default())
}
