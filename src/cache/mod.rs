//! Cache Module
//!
//! Provides in-memory caching with per-entry TTL expiration, typed numeric
//! arithmetic and snapshot import/export.

mod arithmetic;
mod entry;
mod handle;
mod persist;
mod store;
mod value;


// Re-export public types
pub use entry::{Entry, Expiration};
pub use handle::Cache;
pub use store::{EvictionCallback, Store};
pub use value::{Numeric, NumericKind, Value};
