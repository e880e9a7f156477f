//! 스냅샷 조회 endpoint.
//!
//! GET /scrape?ticker={ticker}
//!
//! - 200: 스냅샷 JSON (캐시 적중 시 저장된 바이트 그대로)
//! - 400: 티커 누락 또는 형식 오류
//! - 500: 외부 소스 수집 실패

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::debug;

use crate::error::{ApiError, ApiResult, TICKER_REQUIRED};
use crate::metrics::{record_resolution, record_resolution_error};
use crate::state::AppState;

/// 쿼리 파라미터.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScrapeQuery {
    /// 조회할 티커
    pub ticker: Option<String>,
}

impl ScrapeQuery {
    /// 디코딩된 키/값 쌍에서 생성.
    ///
    /// `ticker`가 여러 번 주어지면 첫 번째 값을 사용합니다.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let ticker = pairs
            .into_iter()
            .find(|(key, _)| key == "ticker")
            .map(|(_, value)| value);
        Self { ticker }
    }
}

/// 티커의 최신 스냅샷 조회.
///
/// GET /scrape?ticker=7203
pub async fn get_snapshot(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(pairs) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let query = ScrapeQuery::from_pairs(pairs);

    let ticker = match query.ticker.as_deref() {
        Some(t) if !t.is_empty() => t,
        _ => return Err(ApiError::bad_request(TICKER_REQUIRED)),
    };

    let resolution = state.resolver.resolve(ticker).await.map_err(|e| {
        record_resolution_error(e.kind());
        ApiError::from(e)
    })?;

    record_resolution(resolution.source);
    debug!(
        ticker = %resolution.ticker,
        source = resolution.source.as_str(),
        "스냅샷 응답"
    );

    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        resolution.body,
    )
        .into_response())
}

/// 스냅샷 라우터 생성.
pub fn scrape_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_snapshot))
}
