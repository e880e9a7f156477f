//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/scrape` - 티커 스냅샷 조회 (캐시 우선)
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/metrics` - Prometheus 메트릭

pub mod health;
pub mod scrape;

pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use scrape::{scrape_router, ScrapeQuery};

use axum::{extract::State, http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::metrics_layer;
use crate::state::AppState;

/// 상태가 필요한 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/scrape", scrape_router())
        .nest("/health", health_router())
}

/// 미들웨어를 포함한 전체 라우터 생성.
///
/// `request_timeout`을 넘긴 요청은 본문 없는 408로 응답합니다.
/// 전송 계층 타임아웃이므로 JSON 에러 형식을 따르지 않습니다.
/// 수집 실패가 JSON 500으로 응답되려면 `request_timeout`이 수집 타임아웃보다 커야 합니다
/// (`AppConfig::request_timeout` 참고).
pub fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router {
    // 메트릭 라우터 (별도 상태)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    Router::new()
        .merge(metrics_router)
        .merge(create_api_router().with_state(state))
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
}

/// Prometheus 메트릭 엔드포인트 핸들러.
///
/// GET /metrics
async fn metrics_handler(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}
