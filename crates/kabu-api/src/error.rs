//! API 에러 응답 타입.
//!
//! 모든 에러는 같은 형식으로 응답합니다.
//!
//! ```json
//! {"error": "Ticker is required"}
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use kabu_core::ResolveError;

/// 티커 파라미터 누락 메시지.
pub const TICKER_REQUIRED: &str = "Ticker is required";

/// API 에러 응답.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 사람이 읽을 수 있는 에러 메시지
    pub error: String,
}

impl ApiErrorResponse {
    /// 메시지로 에러 생성.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// 티커 누락 에러.
    pub fn ticker_required() -> Self {
        Self::new(TICKER_REQUIRED)
    }

    /// 에러 메시지 반환.
    pub fn message(&self) -> &str {
        &self.error
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// 상태 코드가 붙은 API 에러.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP 상태 코드
    pub status: StatusCode,
    /// 응답 본문
    pub body: ApiErrorResponse,
}

impl ApiError {
    /// 400 Bad Request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ApiErrorResponse::new(message),
        }
    }

    /// 500 Internal Server Error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ApiErrorResponse::new(message),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidTicker(e) => Self::bad_request(e.to_string()),
            ResolveError::FetchFailed(e) => {
                Self::internal(format!("Error retrieving stock data: {}", e))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;
