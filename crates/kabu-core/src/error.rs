//! 호출자에게 노출되는 에러 타입.
//!
//! 저장소 에러는 캐시 계층에서 흡수되므로 여기에 포함되지 않습니다.
//! 호출자가 볼 수 있는 실패는 잘못된 티커와 수집 실패 두 가지뿐입니다.

use thiserror::Error;

use crate::domain::FetchError;
use crate::types::TickerError;

/// 에러 종류.
///
/// 메시지 문자열 대신 종류로 분기하기 위한 닫힌 집합입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 잘못된 티커 (클라이언트 입력 오류, 재시도 불가)
    Invalid,
    /// 외부 소스 수집 실패
    FetchFailed,
}

impl ErrorKind {
    /// 메트릭 라벨용 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::FetchFailed => "fetch_failed",
        }
    }
}

/// 스냅샷 해석 에러.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// 티커 형식 오류
    #[error(transparent)]
    InvalidTicker(#[from] TickerError),

    /// 수집 실패 (직렬화 실패 포함)
    #[error(transparent)]
    FetchFailed(#[from] FetchError),
}

impl ResolveError {
    /// 에러 종류를 반환합니다.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTicker(_) => ErrorKind::Invalid,
            Self::FetchFailed(_) => ErrorKind::FetchFailed,
        }
    }
}

/// 해석 작업을 위한 Result 타입.
pub type ResolveResult<T> = Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let invalid = ResolveError::from(TickerError::InvalidCharacters);
        assert_eq!(invalid.kind(), ErrorKind::Invalid);
        assert_eq!(
            invalid.to_string(),
            "invalid ticker: ticker should only contain letters and numbers"
        );

        let fetch = ResolveError::from(FetchError::UnexpectedStatus(404));
        assert_eq!(fetch.kind(), ErrorKind::FetchFailed);
        assert_eq!(fetch.to_string(), "unexpected status code: 404");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ErrorKind::Invalid.as_str(), "invalid");
        assert_eq!(ErrorKind::FetchFailed.as_str(), "fetch_failed");
    }
}
