//! Expiry Module
//!
//! Single expiry predicate shared by the read paths and the sweeps of both tiers.
//! All timestamps are Unix epoch milliseconds, stored as `i64` to match SQLite INTEGER.

use std::time::Duration;

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Absolute expiry for an entry written at `now` with the given TTL.
pub fn expires_at(now: i64, ttl: Duration) -> i64 {
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    now.saturating_add(ttl_ms)
}

// == Is Expired ==
/// An entry is logically absent once `now` is strictly past its expiry.
pub fn is_expired(expires_at: i64, now: i64) -> bool {
    now > expires_at
}

/// Lifetime left before `expires_at`, zero once expired.
pub fn remaining(expires_at: i64, now: i64) -> Duration {
    Duration::from_millis(u64::try_from(expires_at.saturating_sub(now)).unwrap_or(0))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_at_adds_ttl() {
        assert_eq!(expires_at(1_000, Duration::from_millis(500)), 1_500);
        assert_eq!(expires_at(1_000, Duration::ZERO), 1_000);
    }

    #[test]
    fn test_expires_at_saturates() {
        assert_eq!(expires_at(1_000, Duration::MAX), i64::MAX);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        // Still live at the exact expiry millisecond, gone one millisecond later
        assert!(!is_expired(1_000, 999));
        assert!(!is_expired(1_000, 1_000));
        assert!(is_expired(1_000, 1_001));
    }

    #[test]
    fn test_remaining() {
        assert_eq!(remaining(1_500, 1_000), Duration::from_millis(500));
        assert_eq!(remaining(1_000, 1_000), Duration::ZERO);
        assert_eq!(remaining(1_000, 2_000), Duration::ZERO);
    }

    #[test]
    fn test_now_ms_is_monotone_enough() {
        let first = now_ms();
        let second = now_ms();
        assert!(first > 0);
        assert!(second >= first);
    }
}
