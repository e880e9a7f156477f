//! 캐시 신선도 정책.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::storage::CacheEntry;

/// 고정 TTL 신선도 정책.
///
/// `now - updated_at < ttl`이면 신선합니다. 슬라이딩 만료나 티커별 TTL은 없습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    ttl: Duration,
}

impl FreshnessPolicy {
    /// 기본 TTL (1시간).
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

    /// TTL을 지정하여 정책 생성.
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// TTL 반환.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 항목이 `now` 기준으로 신선한지 판단합니다.
    ///
    /// 시계 오차로 `updated_at`이 미래인 항목은 신선한 것으로 봅니다.
    pub fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        match now.signed_duration_since(entry.updated_at).to_std() {
            Ok(age) => age < self.ttl,
            Err(_) => true,
        }
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_aged(now: DateTime<Utc>, age: chrono::Duration) -> CacheEntry {
        CacheEntry::new("7203", "{}", now - age)
    }

    #[test]
    fn test_thirty_minutes_is_fresh() {
        let now = Utc::now();
        let policy = FreshnessPolicy::default();
        assert!(policy.is_fresh(&entry_aged(now, chrono::Duration::minutes(30)), now));
    }

    #[test]
    fn test_exactly_ttl_is_stale() {
        let now = Utc::now();
        let policy = FreshnessPolicy::default();
        assert!(!policy.is_fresh(&entry_aged(now, chrono::Duration::hours(1)), now));
    }

    #[test]
    fn test_two_hours_is_stale() {
        let now = Utc::now();
        let policy = FreshnessPolicy::default();
        assert!(!policy.is_fresh(&entry_aged(now, chrono::Duration::hours(2)), now));
    }

    #[test]
    fn test_future_timestamp_is_fresh() {
        let now = Utc::now();
        let policy = FreshnessPolicy::new(Duration::from_secs(60));
        assert!(policy.is_fresh(&entry_aged(now, chrono::Duration::seconds(-30)), now));
    }

    #[test]
    fn test_zero_ttl_never_fresh() {
        let now = Utc::now();
        let policy = FreshnessPolicy::new(Duration::ZERO);
        assert!(!policy.is_fresh(&entry_aged(now, chrono::Duration::zero()), now));
    }
}
