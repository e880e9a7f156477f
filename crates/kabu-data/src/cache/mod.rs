//! 캐싱 레이어.
//!
//! - Freshness: 고정 TTL 기반 캐시 적중 판단
//! - Writer: 응답 경로 밖에서 실행되는 백그라운드 upsert

pub mod freshness;
pub mod writer;

pub use freshness::FreshnessPolicy;
pub use writer::{CacheWriter, WriterConfig, WriterStats};
