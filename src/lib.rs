//! TTL Cache - An in-process, thread-safe key/value cache
//!
//! Entries carry an optional absolute expiration. Expired entries read as
//! absent immediately and are reclaimed by an optional background sweeper.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, Entry, EvictionCallback, Expiration, Numeric, NumericKind, Store, Value};
pub use config::Config;
pub use error::{CacheError, Expected, Result};
