//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭, 스냅샷 해석 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

use kabu_core::ErrorKind;
use kabu_data::ResolutionSource;

/// 라우터에 등록된 경로. 그 외 경로는 `unmatched`로 기록합니다.
const KNOWN_PATHS: &[&str] = &["/scrape", "/health", "/health/ready", "/metrics"];

fn builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full("http_request_duration_seconds".to_string()),
        &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0],
    )
}

/// Prometheus 메트릭 레코더를 전역으로 설치하고 핸들을 반환합니다.
///
/// # Errors
///
/// 레코더가 이미 설치되어 있거나 버킷 설정이 잘못된 경우.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    builder()?.install_recorder()
}

/// 전역으로 설치하지 않은 레코더의 핸들 (테스트용).
pub fn detached_metrics_handle() -> Result<PrometheusHandle, BuildError> {
    Ok(builder()?.build_recorder().handle())
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 스냅샷 해석 메트릭
// ============================================================================

/// 해석 성공 카운터 증가 (`source`: cache | fetch).
pub fn record_resolution(source: ResolutionSource) {
    counter!("snapshot_resolutions_total", "source" => source.as_str()).increment(1);
}

/// 해석 실패 카운터 증가 (`kind`: invalid | fetch_failed).
pub fn record_resolution_error(kind: ErrorKind) {
    counter!("snapshot_resolution_errors_total", "kind" => kind.as_str()).increment(1);
}

// ============================================================================
// 경로 정규화 유틸리티
// ============================================================================

/// 메트릭 라벨용 경로.
///
/// 임의 경로로 라벨 수가 늘어나지 않도록 등록되지 않은 경로는 `unmatched`로 묶습니다.
pub fn normalize_path(path: &str) -> &'static str {
    let trimmed = match path.trim_end_matches('/') {
        "" => "/",
        p => p,
    };
    KNOWN_PATHS
        .iter()
        .find(|known| **known == trimmed)
        .copied()
        .unwrap_or("unmatched")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_known_paths() {
        assert_eq!(normalize_path("/scrape"), "/scrape");
        assert_eq!(normalize_path("/health/ready"), "/health/ready");
        assert_eq!(normalize_path("/health/"), "/health");
    }

    #[test]
    fn test_normalize_unknown_paths() {
        assert_eq!(normalize_path("/"), "unmatched");
        assert_eq!(normalize_path("/wp-admin/setup.php"), "unmatched");
        assert_eq!(normalize_path("/scrape/7203"), "unmatched");
    }

    #[test]
    fn test_detached_handle_renders() {
        let handle = detached_metrics_handle().unwrap();
        // 기록 전에는 빈 출력
        assert!(handle.render().trim().is_empty());
    }
}
