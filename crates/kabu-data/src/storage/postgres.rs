//! PostgreSQL 스냅샷 저장소.
//!
//! upsert는 `INSERT ... ON CONFLICT DO UPDATE` 단일 문장으로 실행되므로
//! 동시 읽기에서 반쯤 쓰인 행이 보이지 않습니다.

use async_trait::async_trait;
use kabu_core::DatabaseConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, instrument};

use super::{CacheEntry, SnapshotStore};
use crate::error::{DataError, Result};

/// 데이터베이스 연결 풀 래퍼.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 새로운 데이터베이스 연결 풀을 생성합니다.
    ///
    /// # Errors
    ///
    /// URL이 설정되지 않았거나 연결에 실패하면 `DataError::ConnectionError`를 반환합니다.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| DataError::ConnectionError("DATABASE_URL is not set".to_string()))?;

        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .connect(url)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        info!("Database connection established");

        Ok(Self { pool })
    }

    /// 내부 연결 풀을 반환합니다.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 데이터베이스 마이그레이션을 실행합니다.
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations...");

        sqlx::migrate!("../../migrations").run(&self.pool).await?;

        info!("Migrations completed successfully");
        Ok(())
    }

    /// 데이터베이스 상태를 확인합니다.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// 연결 풀을 닫습니다.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// PostgreSQL 기반 스냅샷 저장소.
#[derive(Clone)]
pub struct PgSnapshotStore {
    db: Database,
}

impl PgSnapshotStore {
    /// 새 저장소 생성.
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SnapshotStore for PgSnapshotStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    #[instrument(skip(self))]
    async fn lookup(&self, ticker: &str) -> Result<Option<CacheEntry>> {
        let entry: Option<CacheEntry> = sqlx::query_as(
            r#"
            SELECT ticker, record, updated_at
            FROM stock_snapshots
            WHERE ticker = $1
            "#,
        )
        .bind(ticker)
        .fetch_optional(self.db.pool())
        .await?;

        debug!(ticker, found = entry.is_some(), "스냅샷 캐시 조회");

        Ok(entry)
    }

    #[instrument(skip(self, entry), fields(ticker = %entry.ticker))]
    async fn upsert(&self, entry: &CacheEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_snapshots (ticker, record, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (ticker) DO UPDATE SET
                record = EXCLUDED.record,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&entry.ticker)
        .bind(&entry.record)
        .bind(entry.updated_at)
        .execute(self.db.pool())
        .await?;

        debug!("스냅샷 캐시 저장 완료");

        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        self.db.health_check().await
    }
}
