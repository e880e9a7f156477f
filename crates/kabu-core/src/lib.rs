//! # Kabu Core
//!
//! 주식 스냅샷 서비스의 핵심 도메인 타입을 제공합니다.
//!
//! 이 크레이트는 서비스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 티커 검증 (`Ticker`)
//! - 종목 스냅샷 레코드 (`StockSnapshot`)
//! - 외부 소스 수집기 추상화 (`SnapshotFetcher`)
//! - 호출자에게 노출되는 에러 분류
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
