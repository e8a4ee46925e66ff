//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Value;

// == Expiration ==
/// TTL requested by a write operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiration {
    /// Use the cache's default expiration
    #[default]
    Default,
    /// The entry never expires
    Never,
    /// The entry expires once this duration has elapsed.
    /// `After(Duration::ZERO)` behaves like `Default`.
    After(Duration),
}

impl From<Duration> for Expiration {
    fn from(ttl: Duration) -> Self {
        Expiration::After(ttl)
    }
}

// == Cache Entry ==
/// A stored value plus its absolute expiration instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// The stored value
    pub value: Value,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    // == Constructor ==
    /// Creates an entry expiring `ttl` from now, or never when `ttl` is None.
    pub fn new(value: impl Into<Value>, ttl: Option<Duration>) -> Self {
        Self {
            value: value.into(),
            expires_at: ttl.and_then(deadline_after),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired only once the current time is strictly past its
    /// expiration instant. Entries without one never expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Checks expiry against a caller-supplied clock reading, so a scan over
    /// many entries can use a single `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry hasn't expired yet
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at.map(|expires| {
            (expires - Utc::now()).to_std().unwrap_or(Duration::ZERO)
        })
    }
}

/// Absolute instant `ttl` from now. A TTL past the representable range is
/// indistinguishable from "never" and yields None.
fn deadline_after(ttl: Duration) -> Option<DateTime<Utc>> {
    let delta = chrono::Duration::from_std(ttl).ok()?;
    Utc::now().checked_add_signed(delta)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = Entry::new("test_value", None);

        assert_eq!(entry.value, Value::Str("test_value".to_string()));
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = Entry::new(42i64, Some(Duration::from_secs(60)));

        assert_eq!(entry.value, Value::I64(42));
        assert!(entry.expires_at.is_some());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = Entry::new("test_value", Some(Duration::from_millis(50)));

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(100));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = Entry::new("test_value", Some(Duration::from_secs(10)));

        let remaining = entry.ttl_remaining().unwrap();
        assert!(remaining <= Duration::from_secs(10));
        assert!(remaining >= Duration::from_secs(9));
    }

    #[test]
    fn test_ttl_remaining_no_expiration() {
        let entry = Entry::new("test_value", None);
        assert!(entry.ttl_remaining().is_none());
    }

    #[test]
    fn test_ttl_remaining_expired() {
        let entry = Entry::new("test_value", Some(Duration::from_millis(10)));

        sleep(Duration::from_millis(50));

        assert_eq!(entry.ttl_remaining().unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Utc::now();
        let entry = Entry {
            value: Value::Bool(true),
            expires_at: Some(now),
        };

        // Not expired at the instant itself, only strictly after it
        assert!(!entry.is_expired_at(now));
        assert!(entry.is_expired_at(now + chrono::Duration::milliseconds(1)));
    }

    #[test]
    fn test_unrepresentable_ttl_never_expires() {
        let entry = Entry::new(1u8, Some(Duration::MAX));
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_expiration_from_duration() {
        let ttl = Duration::from_secs(5);
        assert_eq!(Expiration::from(ttl), Expiration::After(ttl));
        assert_eq!(Expiration::default(), Expiration::Default);
    }
}
