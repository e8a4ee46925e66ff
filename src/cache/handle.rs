//! Cache Handle Module
//!
//! The public entry point: owns a shared [`Store`] and the lifecycle of its
//! background sweeper.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Entry, Store};
use crate::config::Config;
use crate::tasks::{spawn_sweeper, Sweeper};

// == Cache ==
/// Thread-safe TTL cache.
///
/// Every [`Store`] operation is available through `Deref`. Share a cache
/// between threads with `Arc<Cache>`.
///
/// The sweeper thread, if any, is stopped and joined when the cache is
/// closed or dropped. Dropping the last handle is the required shutdown path;
/// nothing stops the sweeper otherwise.
///
/// # Example
/// ```
/// use ttl_cache::{Cache, Expiration, Value};
/// use std::time::Duration;
///
/// let cache = Cache::new(Duration::from_secs(300), Duration::from_secs(60));
/// cache.set("greeting", "hello", Expiration::Default);
/// assert_eq!(cache.get("greeting"), Some(Value::from("hello")));
/// ```
#[derive(Debug)]
pub struct Cache {
    store: Arc<Store>,
    sweeper: Option<Sweeper>,
}

impl Cache {
    // == Constructors ==
    /// Creates an empty cache.
    ///
    /// # Arguments
    /// * `default_expiration` - TTL for `Expiration::Default`; zero means entries
    ///   never expire by default
    /// * `cleanup_interval` - How often expired entries are swept; zero means no
    ///   sweeper, expired entries are then only skipped on read
    pub fn new(default_expiration: Duration, cleanup_interval: Duration) -> Self {
        Self::new_from(default_expiration, cleanup_interval, HashMap::new())
    }

    /// Creates a cache backed by `items`, e.g. a map returned by
    /// [`Store::items`] or one pre-sized with `HashMap::with_capacity`.
    ///
    /// The map is moved in and becomes the live backing store.
    pub fn new_from(
        default_expiration: Duration,
        cleanup_interval: Duration,
        items: HashMap<String, Entry>,
    ) -> Self {
        let store = Arc::new(Store::new(default_expiration, items));
        let sweeper = spawn_sweeper(store.clone(), cleanup_interval);
        Self { store, sweeper }
    }

    /// Creates an empty cache from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.default_expiration(), config.cleanup_interval())
    }

    // == Lifecycle ==
    /// Returns true while the background sweeper is active.
    pub fn sweeper_running(&self) -> bool {
        self.sweeper.as_ref().is_some_and(Sweeper::is_running)
    }

    /// Stops and joins the sweeper. The cache stays usable with lazy
    /// expiration only. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut sweeper) = self.sweeper.take() {
            sweeper.stop();
        }
    }
}

impl Deref for Cache {
    type Target = Store;

    fn deref(&self) -> &Store {
        &self.store
    }
}

impl Drop for Cache {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Expiration, Value};
    use std::thread::sleep;

    #[test]
    fn test_cache_without_sweeper() {
        let cache = Cache::new(Duration::ZERO, Duration::ZERO);
        assert!(!cache.sweeper_running());

        cache.set("key", 1i64, Expiration::Default);
        assert_eq!(cache.get("key"), Some(Value::I64(1)));
    }

    #[test]
    fn test_cache_close_stops_sweeper() {
        let mut cache = Cache::new(Duration::ZERO, Duration::from_millis(20));
        assert!(cache.sweeper_running());

        cache.close();
        assert!(!cache.sweeper_running());
        assert_eq!(Arc::strong_count(&cache.store), 1);

        // Still usable, now with lazy expiration only
        cache.set("key", "value", Expiration::After(Duration::from_millis(20)));
        sleep(Duration::from_millis(80));
        assert!(cache.get("key").is_none());
        assert_eq!(cache.item_count(), 1);

        cache.close();
    }

    #[test]
    fn test_cache_drop_releases_store() {
        let cache = Cache::new(Duration::ZERO, Duration::from_secs(3600));
        let store = Arc::downgrade(&cache.store);

        drop(cache);

        assert!(store.upgrade().is_none(), "Sweeper should not keep the store alive");
    }

    #[test]
    fn test_cache_new_from_seeds_items() {
        let mut items = HashMap::new();
        items.insert("seeded".to_string(), Entry::new(3u16, None));

        let cache = Cache::new_from(Duration::ZERO, Duration::ZERO, items);
        assert_eq!(cache.get("seeded"), Some(Value::U16(3)));
    }

    #[test]
    fn test_cache_from_config() {
        let config = Config {
            default_ttl: 0,
            cleanup_interval: 0,
        };
        let cache = Cache::from_config(&config);

        assert!(!cache.sweeper_running());
        cache.set_default("key", "value");
        assert!(cache.get_with_expiration("key").unwrap().1.is_none());
    }
}
