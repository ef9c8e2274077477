//! Timestamped cache entries.

use chrono::{DateTime, Duration, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A cached generation response with its validity window.
///
/// An entry is usable only while `now < expires_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct CacheEntry<T> {
    key: String,
    response: T,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    request_digest: String,
}

impl<T> CacheEntry<T> {
    /// Create an entry that expires `ttl_seconds` after `now`.
    pub fn new(
        key: impl Into<String>,
        response: T,
        request_digest: impl Into<String>,
        now: DateTime<Utc>,
        ttl_seconds: u64,
    ) -> Self {
        let ttl = Duration::try_seconds(i64::try_from(ttl_seconds).unwrap_or(i64::MAX))
            .unwrap_or(Duration::MAX);
        let expires_at = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            key: key.into(),
            response,
            created_at: now,
            expires_at,
            request_digest: request_digest.into(),
        }
    }

    /// Check if this entry is still usable at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Take the cached response.
    pub fn into_response(self) -> T {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_until_expiry() {
        let now = Utc::now();
        let entry = CacheEntry::new("k", 1u8, "d", now, 60);

        assert!(entry.is_fresh(now));
        assert!(entry.is_fresh(now + Duration::seconds(59)));
        assert!(!entry.is_fresh(now + Duration::seconds(60)));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let now = Utc::now();
        let entry = CacheEntry::new("k", (), "d", now, u64::MAX);
        assert!(entry.is_fresh(now + Duration::days(365 * 100)));
    }
}
