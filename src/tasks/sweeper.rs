//! TTL Sweeper Task
//!
//! Background thread that periodically removes expired cache entries.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, select, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::cache::Store;

/// Handle to a running sweeper thread.
///
/// Stopping signals the thread and joins it; dropping the handle stops it too.
#[derive(Debug)]
pub struct Sweeper {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

/// Spawns a thread that calls `Store::delete_expired` every `interval`.
///
/// The first sweep happens one full interval after start. Returns None if the
/// interval is zero or the thread could not be spawned; expiration then stays
/// purely lazy.
///
/// # Example
/// ```ignore
/// let store = Arc::new(Store::new(Duration::from_secs(300), HashMap::new()));
/// let mut sweeper = spawn_sweeper(store.clone(), Duration::from_secs(1)).unwrap();
/// // Later, during shutdown:
/// sweeper.stop();
/// ```
pub fn spawn_sweeper(store: Arc<Store>, interval: Duration) -> Option<Sweeper> {
    if interval.is_zero() {
        return None;
    }

    let (stop_tx, stop_rx) = channel::bounded(1);
    let spawned = thread::Builder::new()
        .name("ttl-cache-sweeper".to_string())
        .spawn(move || run(store, interval, stop_rx));

    match spawned {
        Ok(handle) => Some(Sweeper {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }),
        Err(err) => {
            warn!(error = %err, "Failed to spawn sweeper thread, expiration stays lazy");
            None
        }
    }
}

fn run(store: Arc<Store>, interval: Duration, stop_rx: Receiver<()>) {
    info!(?interval, "Starting TTL sweeper");
    let ticker = channel::tick(interval);

    loop {
        select! {
            recv(ticker) -> _ => {
                let removed = store.delete_expired();
                if removed > 0 {
                    info!("TTL sweep: removed {} expired entries", removed);
                } else {
                    debug!("TTL sweep: no expired entries found");
                }
            }
            // A stop message and a dropped sender both end the loop
            recv(stop_rx) -> _ => break,
        }
    }

    info!("TTL sweeper stopped");
}

impl Sweeper {
    /// Returns true until the sweeper has been stopped.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Signals the sweeper thread and waits for it to exit. Idempotent.
    ///
    /// Called from the sweeper thread itself (an eviction callback dropping
    /// the last cache handle) it only signals, the loop exits after the
    /// current sweep.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        let Some(handle) = self.handle.take() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            warn!("TTL sweeper thread panicked");
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Expiration, Value};
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::thread::sleep;

    fn shared_store() -> Arc<Store> {
        Arc::new(Store::new(Duration::ZERO, HashMap::new()))
    }

    #[test]
    fn test_zero_interval_spawns_nothing() {
        assert!(spawn_sweeper(shared_store(), Duration::ZERO).is_none());
    }

    #[test]
    fn test_sweeper_removes_expired_entries() {
        let store = shared_store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.on_evicted(move |key, value| sink.lock().push((key.to_string(), value)));

        store.set("expire_soon", "value", Expiration::After(Duration::from_millis(50)));
        store.set("long_lived", "value", Expiration::After(Duration::from_secs(3600)));

        let mut sweeper = spawn_sweeper(store.clone(), Duration::from_millis(100)).unwrap();
        assert!(sweeper.is_running());

        sleep(Duration::from_millis(450));

        assert_eq!(store.item_count(), 1, "Expired entry should have been swept");
        assert!(store.get("long_lived").is_some(), "Valid entry should not be removed");
        assert_eq!(
            *seen.lock(),
            vec![("expire_soon".to_string(), Value::from("value"))]
        );

        sweeper.stop();
    }

    #[test]
    fn test_sweeper_stop_joins_and_is_idempotent() {
        let store = shared_store();
        let mut sweeper = spawn_sweeper(store.clone(), Duration::from_millis(20)).unwrap();

        sweeper.stop();
        assert!(!sweeper.is_running());
        sweeper.stop();

        // The thread has exited and released its reference
        assert_eq!(Arc::strong_count(&store), 1);
    }

    #[test]
    fn test_sweeper_drop_stops_thread() {
        let store = shared_store();
        let sweeper = spawn_sweeper(store.clone(), Duration::from_secs(3600)).unwrap();
        assert!(sweeper.is_running());

        drop(sweeper);

        assert_eq!(Arc::strong_count(&store), 1);
    }
}
