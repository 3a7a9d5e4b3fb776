use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// A cached upstream payload. `timestamp` is epoch milliseconds at insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Value,
    pub timestamp: i64,
}

impl CacheEntry {
    pub fn new(data: Value, stored_at: DateTime<Utc>) -> Self {
        Self {
            data,
            timestamp: stored_at.timestamp_millis(),
        }
    }

    /// Age in milliseconds. Entries stamped in the future count as age zero.
    pub fn age_millis(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp_millis().saturating_sub(self.timestamp).max(0)
    }

    /// Valid iff `now - timestamp < ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self.age_millis(now) < ttl_ms
    }
}
