//! 캐시 우선 스냅샷 해석기.
//!
//! # 동작 방식
//!
//! 1. 티커 검증 (실패 시 저장소/수집기에 접근하지 않음)
//! 2. 캐시 조회, 신선하면 저장된 JSON을 그대로 반환 (수집/저장 없음)
//! 3. 없거나 오래된 경우 외부 소스에서 수집
//! 4. 수집 실패 시 에러 반환, 기존 캐시는 건드리지 않음
//! 5. 성공 시 직렬화 결과를 즉시 반환하고 저장은 `CacheWriter`에 맡김
//!
//! 캐시 조회 실패는 미스로 취급하고, 저장 실패는 로그로만 남깁니다.
//! 같은 티커에 대한 동시 미스는 중복 수집될 수 있습니다 (single-flight 없음).

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use kabu_core::{FetchError, ResolveResult, SnapshotFetcher, Ticker};

use crate::cache::{CacheWriter, FreshnessPolicy};
use crate::storage::{CacheEntry, SnapshotStore};

/// 응답 본문의 출처.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// 신선한 캐시 항목
    CacheHit,
    /// 외부 소스에서 새로 수집
    Fetched,
}

impl ResolutionSource {
    /// 메트릭/로그 라벨.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CacheHit => "cache",
            Self::Fetched => "fetch",
        }
    }
}

/// 해석 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// 검증된 티커
    pub ticker: Ticker,
    /// 직렬화된 스냅샷 JSON (응답 본문)
    pub body: String,
    /// 본문 출처
    pub source: ResolutionSource,
}

/// 캐시 우선 스냅샷 해석기.
///
/// 저장소와 수집기는 생성 시 주입되므로 테스트에서는 가짜 구현을 넣을 수 있습니다.
pub struct SnapshotResolver {
    fetcher: Arc<dyn SnapshotFetcher>,
    store: Arc<dyn SnapshotStore>,
    policy: FreshnessPolicy,
    writer: Arc<CacheWriter>,
}

impl SnapshotResolver {
    /// 새 해석기 생성.
    ///
    /// `writer`는 같은 `store`에 쓰도록 생성된 저장기여야 합니다.
    pub fn new(
        fetcher: Arc<dyn SnapshotFetcher>,
        store: Arc<dyn SnapshotStore>,
        policy: FreshnessPolicy,
        writer: Arc<CacheWriter>,
    ) -> Self {
        Self {
            fetcher,
            store,
            policy,
            writer,
        }
    }

    /// 캐시 저장소.
    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    /// 백그라운드 저장기.
    pub fn writer(&self) -> &Arc<CacheWriter> {
        &self.writer
    }

    /// 신선도 정책.
    pub fn policy(&self) -> FreshnessPolicy {
        self.policy
    }

    /// 티커의 최신 스냅샷 JSON을 반환합니다.
    ///
    /// 반환된 future가 수집 도중 drop되면 수집이 취소되고 저장도 일어나지 않습니다.
    ///
    /// # Errors
    ///
    /// - `ResolveError::InvalidTicker`: 티커 형식 오류
    /// - `ResolveError::FetchFailed`: 외부 소스 수집 실패
    #[instrument(skip(self), fields(source = self.fetcher.source_name()))]
    pub async fn resolve(&self, raw_ticker: &str) -> ResolveResult<Resolution> {
        let ticker = Ticker::parse(raw_ticker)?;

        if let Some(body) = self.lookup_fresh(&ticker).await {
            debug!(ticker = %ticker, "캐시 적중");
            return Ok(Resolution {
                ticker,
                body,
                source: ResolutionSource::CacheHit,
            });
        }

        let snapshot = self.fetcher.fetch(&ticker).await.map_err(|e| {
            warn!(ticker = %ticker, error = %e, "스냅샷 수집 실패");
            e
        })?;

        let body = snapshot
            .to_json()
            .map_err(|e| FetchError::Parse(format!("failed to serialize snapshot: {}", e)))?;

        let fetched_at = Utc::now();
        self.writer
            .submit(CacheEntry::new(ticker.as_str(), body.clone(), fetched_at));

        info!(ticker = %ticker, "스냅샷 수집 완료");

        Ok(Resolution {
            ticker,
            body,
            source: ResolutionSource::Fetched,
        })
    }

    /// 신선한 캐시 항목이 있으면 저장된 JSON을 반환합니다.
    async fn lookup_fresh(&self, ticker: &Ticker) -> Option<String> {
        match self.store.lookup(ticker.as_str()).await {
            Ok(Some(entry)) if self.policy.is_fresh(&entry, Utc::now()) => Some(entry.record),
            Ok(Some(entry)) => {
                debug!(
                    ticker = %ticker,
                    updated_at = %entry.updated_at,
                    "캐시 항목 만료, 재수집"
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(
                    ticker = %ticker,
                    backend = self.store.backend_name(),
                    error = %e,
                    "캐시 조회 실패, 미스로 처리"
                );
                None
            }
        }
    }
}
