//! Cache Store Module
//!
//! Main cache engine: a HashMap of timed entries behind a single
//! reader/writer lock, with lazy expiration on every read path.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::cache::{Entry, Expiration, Value};
use crate::error::{CacheError, Result};

/// Callback invoked with the key and value of an entry removed by `delete`
/// or by a sweep. Never invoked on overwrite or flush.
pub type EvictionCallback = Arc<dyn Fn(&str, Value) + Send + Sync>;

/// Everything the lock guards.
struct State {
    entries: HashMap<String, Entry>,
    on_evicted: Option<EvictionCallback>,
}

// == Cache Store ==
/// Thread-safe map of timed entries.
///
/// Readers take the shared lock, all mutators take the exclusive lock, and
/// the eviction callback always runs after the lock has been released so it
/// may call back into the store.
pub struct Store {
    /// Expiration applied by `Expiration::Default`, None = never expire
    default_expiration: Option<Duration>,
    state: RwLock<State>,
}

impl Store {
    // == Constructor ==
    /// Creates a store that takes ownership of `entries` as its backing map.
    ///
    /// # Arguments
    /// * `default_expiration` - TTL for `Expiration::Default`; zero means never expire
    /// * `entries` - Initial contents, e.g. a previously exported snapshot
    pub fn new(default_expiration: Duration, entries: HashMap<String, Entry>) -> Self {
        Self {
            default_expiration: (!default_expiration.is_zero()).then_some(default_expiration),
            state: RwLock::new(State {
                entries,
                on_evicted: None,
            }),
        }
    }

    /// Resolves a requested expiration into a concrete TTL, None = never.
    fn ttl_for(&self, expiration: Expiration) -> Option<Duration> {
        match expiration {
            Expiration::Never => None,
            Expiration::After(ttl) if !ttl.is_zero() => Some(ttl),
            Expiration::After(_) | Expiration::Default => self.default_expiration,
        }
    }

    // == Set ==
    /// Stores a value, replacing any existing entry for the key.
    ///
    /// Overwriting does not invoke the eviction callback.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>, expiration: Expiration) {
        let entry = Entry::new(value, self.ttl_for(expiration));
        self.state.write().entries.insert(key.into(), entry);
    }

    /// Stores a value with the default expiration.
    pub fn set_default(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.set(key, value, Expiration::Default);
    }

    // == Add ==
    /// Stores a value only if there is no live entry for the key.
    ///
    /// An expired, not yet swept entry is overwritten.
    pub fn add(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
        expiration: Expiration,
    ) -> Result<()> {
        let key = key.into();
        let mut state = self.state.write();

        if live(&state.entries, &key).is_some() {
            return Err(CacheError::AlreadyExists(key));
        }

        state.entries.insert(key, Entry::new(value, self.ttl_for(expiration)));
        Ok(())
    }

    // == Replace ==
    /// Stores a value only if a live entry already exists for the key.
    pub fn replace(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
        expiration: Expiration,
    ) -> Result<()> {
        let key = key.into();
        let mut state = self.state.write();

        if live(&state.entries, &key).is_none() {
            return Err(CacheError::NotFound(key));
        }

        state.entries.insert(key, Entry::new(value, self.ttl_for(expiration)));
        Ok(())
    }

    // == Get ==
    /// Returns a copy of the value if the key holds a live entry.
    ///
    /// Expired entries read as absent but are left in place.
    pub fn get(&self, key: &str) -> Option<Value> {
        let state = self.state.read();
        live(&state.entries, key).map(|entry| entry.value.clone())
    }

    /// Like `get`, also returning the expiration instant (None = never expires).
    pub fn get_with_expiration(&self, key: &str) -> Option<(Value, Option<DateTime<Utc>>)> {
        let state = self.state.read();
        live(&state.entries, key).map(|entry| (entry.value.clone(), entry.expires_at))
    }

    // == Delete ==
    /// Removes the entry for the key, expired or not.
    ///
    /// If an entry was removed and a callback is registered, the callback is
    /// invoked with the removed value once the lock has been released.
    pub fn delete(&self, key: &str) {
        let (removed, callback) = {
            let mut state = self.state.write();
            let removed = state.entries.remove(key);
            (removed, state.on_evicted.clone())
        };

        if let (Some(entry), Some(callback)) = (removed, callback) {
            callback(key, entry.value);
        }
    }

    // == Delete Expired ==
    /// Removes every expired entry.
    ///
    /// The lock is held only for the scan-and-remove; the callback then runs
    /// once per removed entry. Returns the number of entries removed.
    pub fn delete_expired(&self) -> usize {
        let now = Utc::now();
        let (evicted, callback) = {
            let mut state = self.state.write();
            let expired_keys: Vec<String> = state
                .entries
                .iter()
                .filter(|(_, entry)| entry.is_expired_at(now))
                .map(|(key, _)| key.clone())
                .collect();

            let evicted: Vec<(String, Value)> = expired_keys
                .into_iter()
                .filter_map(|key| state.entries.remove(&key).map(|entry| (key, entry.value)))
                .collect();

            (evicted, state.on_evicted.clone())
        };

        let count = evicted.len();
        if let Some(callback) = callback {
            for (key, value) in evicted {
                callback(&key, value);
            }
        }
        count
    }

    // == Eviction Callback ==
    /// Replaces the eviction callback; None disables it.
    ///
    /// Removals already past their critical section keep the callback they saw.
    pub fn set_eviction_callback(&self, callback: Option<EvictionCallback>) {
        self.state.write().on_evicted = callback;
    }

    /// Registers `f` as the eviction callback.
    pub fn on_evicted<F>(&self, f: F)
    where
        F: Fn(&str, Value) + Send + Sync + 'static,
    {
        self.set_eviction_callback(Some(Arc::new(f)));
    }

    // == Flush ==
    /// Removes every entry without invoking the eviction callback.
    pub fn flush(&self) {
        let mut state = self.state.write();
        let dropped = state.entries.len();
        state.entries = HashMap::new();
        debug!(dropped, "Cache flushed");
    }

    // == Items ==
    /// Returns a copy of every live entry.
    pub fn items(&self) -> HashMap<String, Entry> {
        let now = Utc::now();
        let state = self.state.read();
        state
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    // == Item Count ==
    /// Returns the number of stored entries, including expired entries that
    /// have not been swept yet.
    pub fn item_count(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Runs `f` on the live value for `key` under the exclusive lock.
    pub(crate) fn update_live<R>(
        &self,
        key: &str,
        f: impl FnOnce(&mut Value) -> Result<R>,
    ) -> Result<R> {
        let mut state = self.state.write();
        match state.entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => f(&mut entry.value),
            _ => Err(CacheError::NotFound(key.to_string())),
        }
    }

    /// Inserts `items`, skipping keys that currently hold a live entry.
    /// Returns the number of entries inserted.
    pub(crate) fn merge(&self, items: HashMap<String, Entry>) -> usize {
        let now = Utc::now();
        let mut state = self.state.write();
        let mut merged = 0;

        for (key, entry) in items {
            let occupied = state
                .entries
                .get(&key)
                .is_some_and(|current| !current.is_expired_at(now));
            if !occupied {
                state.entries.insert(key, entry);
                merged += 1;
            }
        }
        merged
    }
}

/// Looks up a live entry.
fn live<'a>(entries: &'a HashMap<String, Entry>, key: &str) -> Option<&'a Entry> {
    entries.get(key).filter(|entry| !entry.is_expired())
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Store")
            .field("default_expiration", &self.default_expiration)
            .field("item_count", &state.entries.len())
            .field("on_evicted", &state.on_evicted.is_some())
            .finish()
    }
}
