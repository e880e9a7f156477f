//! 도메인 모델.
//!
//! - `snapshot`: 티커별 시세 스냅샷 레코드
//! - `fetcher`: 외부 소스에서 스냅샷을 가져오는 수집기 trait

pub mod fetcher;
pub mod snapshot;

pub use fetcher::{FetchError, SnapshotFetcher};
pub use snapshot::StockSnapshot;
