//! 스냅샷 캐시 저장소.
//!
//! 티커당 한 행(`ticker`, `record`, `updated_at`)만 유지합니다.
//! 새 수집 결과는 기존 행을 통째로 교체하며 부분 병합하지 않습니다.
//!
//! - `postgres`: PostgreSQL 구현 (운영)
//! - `memory`: 프로세스 내 구현 (DB 미설정 시, 테스트)

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::error::Result;

pub use memory::MemorySnapshotStore;
pub use postgres::{Database, PgSnapshotStore};

/// 캐시 항목.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CacheEntry {
    /// 티커 (고유 키)
    pub ticker: String,
    /// 직렬화된 스냅샷 JSON
    pub record: String,
    /// 수집 완료 시각 (UTC)
    pub updated_at: DateTime<Utc>,
}

impl CacheEntry {
    /// 새 캐시 항목 생성.
    pub fn new(
        ticker: impl Into<String>,
        record: impl Into<String>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            record: record.into(),
            updated_at,
        }
    }
}

/// 스냅샷 캐시 저장소 trait.
///
/// 서로 다른 키에 대한 동시 읽기/쓰기, 같은 키에 대한 동시 쓰기를 모두 허용해야 합니다.
/// 같은 키에 대한 경쟁 쓰기는 마지막 쓰기가 남습니다.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// 저장소 이름 (로그/헬스 체크용).
    fn backend_name(&self) -> &'static str;

    /// 티커의 캐시 항목 조회.
    ///
    /// 행이 없으면 에러가 아니라 `Ok(None)`입니다.
    async fn lookup(&self, ticker: &str) -> Result<Option<CacheEntry>>;

    /// 티커의 캐시 항목을 삽입하거나 원자적으로 교체.
    async fn upsert(&self, entry: &CacheEntry) -> Result<()>;

    /// 저장소 상태 확인.
    async fn health_check(&self) -> Result<()>;
}
