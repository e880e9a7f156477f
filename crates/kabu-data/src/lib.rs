//! 스냅샷 수집, 캐시 저장, 캐시 우선 해석.
//!
//! 이 crate는 다음을 제공합니다:
//! - 캐시 저장소 (PostgreSQL, 메모리)
//! - 신선도 정책 및 백그라운드 캐시 저장기
//! - 캐시 우선 해석기 (`SnapshotResolver`)
//! - 카부탄 HTML 수집기

pub mod cache;
pub mod error;
pub mod provider;
pub mod resolver;
pub mod storage;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::{DataError, Result};
pub use resolver::{Resolution, ResolutionSource, SnapshotResolver};

// 캐시 재내보내기
pub use cache::{CacheWriter, FreshnessPolicy, WriterConfig, WriterStats};

// 저장소 재내보내기
pub use storage::{
    CacheEntry, Database, MemorySnapshotStore, PgSnapshotStore, SnapshotStore,
};

// 수집기 재내보내기
pub use provider::KabutanFetcher;
