//! 외부 소스 수집기 추상화.
//!
//! HTML 페이지 크롤링, 원격 브라우저 등 수집 방식과 무관하게
//! "티커 → 스냅샷 또는 에러" 계약만 정의합니다.

use async_trait::async_trait;
use thiserror::Error;

use super::StockSnapshot;
use crate::types::Ticker;

// =============================================================================
// 에러 타입
// =============================================================================

/// 수집 실패.
///
/// 원인별로 variant가 나뉘어 있지만 해석(resolve) 흐름은 원인에 따라 분기하지 않습니다.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 네트워크/전송 실패
    #[error("failed to fetch data: {0}")]
    Transport(String),

    /// 예상하지 못한 HTTP 상태 코드
    #[error("unexpected status code: {0}")]
    UnexpectedStatus(u16),

    /// 응답 본문 파싱 실패
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// 필수 필드 누락
    #[error("failed to find {0}")]
    MissingField(&'static str),
}

// =============================================================================
// SnapshotFetcher Trait
// =============================================================================

/// 스냅샷 수집기 trait.
///
/// 호출할 때마다 실시간 값이 달라질 수 있으므로 멱등성을 가정하지 않습니다.
/// 성공한 결과만 캐시에 저장됩니다.
///
/// # 구현 예시
///
/// ```ignore
/// pub struct MyFetcher { client: reqwest::Client }
///
/// #[async_trait]
/// impl SnapshotFetcher for MyFetcher {
///     fn source_name(&self) -> &str { "my-source" }
///
///     async fn fetch(&self, ticker: &Ticker) -> Result<StockSnapshot, FetchError> {
///         // 페이지 요청 및 파싱
///     }
/// }
/// ```
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    /// 수집 소스 이름 (로그용).
    fn source_name(&self) -> &str;

    /// 티커의 최신 스냅샷을 가져옵니다.
    ///
    /// # Errors
    ///
    /// 전송 실패, 응답 형식 오류, 필수 필드 누락 시 `FetchError`를 반환합니다.
    async fn fetch(&self, ticker: &Ticker) -> Result<StockSnapshot, FetchError>;
}
