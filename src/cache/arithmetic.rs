//! Numeric increment/decrement on stored values.
//!
//! Every operation is a single read-modify-write under the store's exclusive
//! lock. Absent or expired keys fail with `NotFound`; a stored kind the call
//! does not admit fails with `TypeMismatch`. The stored kind never changes.

use crate::cache::{Numeric, Store, Value};
use crate::error::{CacheError, Expected, Result};

#[derive(Debug, Clone, Copy)]
enum Op {
    Add,
    Sub,
}

impl Op {
    #[inline]
    fn apply<T: Numeric>(self, current: T, delta: T) -> T {
        match self {
            Op::Add => current.plus(delta),
            Op::Sub => current.minus(delta),
        }
    }
}

/// Applies an integer delta to any numeric variant, casting it into the
/// stored kind first. Returns false for non-numeric values.
fn apply_int(value: &mut Value, delta: i64, op: Op) -> bool {
    macro_rules! dispatch {
        ($($variant:ident => $t:ty),* $(,)?) => {
            match value {
                $(Value::$variant(current) => *current = op.apply(*current, delta as $t),)*
                _ => return false,
            }
        };
    }

    dispatch!(
        I8 => i8,
        I16 => i16,
        I32 => i32,
        I64 => i64,
        Isize => isize,
        U8 => u8,
        U16 => u16,
        U32 => u32,
        U64 => u64,
        Usize => usize,
        F32 => f32,
        F64 => f64,
    );
    true
}

/// Applies a float delta to an `F32` or `F64` variant.
fn apply_float(value: &mut Value, delta: f64, op: Op) -> bool {
    match value {
        Value::F32(current) => *current = op.apply(*current, delta as f32),
        Value::F64(current) => *current = op.apply(*current, delta),
        _ => return false,
    }
    true
}

fn mismatch(key: &str, expected: Expected) -> CacheError {
    CacheError::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

impl Store {
    fn shift_int(&self, key: &str, delta: i64, op: Op) -> Result<()> {
        self.update_live(key, |value| {
            if apply_int(value, delta, op) {
                Ok(())
            } else {
                Err(mismatch(key, Expected::Numeric))
            }
        })
    }

    fn shift_float(&self, key: &str, delta: f64, op: Op) -> Result<()> {
        self.update_live(key, |value| {
            if apply_float(value, delta, op) {
                Ok(())
            } else {
                Err(mismatch(key, Expected::Float))
            }
        })
    }

    fn shift_exact<T: Numeric>(&self, key: &str, delta: T, op: Op) -> Result<T> {
        self.update_live(key, |value| {
            let current = T::from_value(value).ok_or_else(|| mismatch(key, Expected::Kind(T::KIND)))?;
            let updated = op.apply(current, delta);
            *value = updated.into();
            Ok(updated)
        })
    }

    // == Untyped ==
    /// Adds `n` to a value of any numeric kind, casting `n` into that kind.
    ///
    /// Use [`Store::increment_by`] to get the new value back.
    pub fn increment(&self, key: &str, n: i64) -> Result<()> {
        self.shift_int(key, n, Op::Add)
    }

    /// Subtracts `n` from a value of any numeric kind, casting `n` into that kind.
    pub fn decrement(&self, key: &str, n: i64) -> Result<()> {
        self.shift_int(key, n, Op::Sub)
    }

    /// Adds `n` to an `f32` or `f64` value.
    pub fn increment_float(&self, key: &str, n: f64) -> Result<()> {
        self.shift_float(key, n, Op::Add)
    }

    /// Subtracts `n` from an `f32` or `f64` value.
    pub fn decrement_float(&self, key: &str, n: f64) -> Result<()> {
        self.shift_float(key, n, Op::Sub)
    }

    // == Kind-pinned ==
    /// Adds `delta` to a value stored as exactly `T` and returns the result.
    ///
    /// ```
    /// use ttl_cache::{Cache, Expiration};
    /// use std::time::Duration;
    ///
    /// let cache = Cache::new(Duration::ZERO, Duration::ZERO);
    /// cache.set("hits", 10u32, Expiration::Never);
    /// assert_eq!(cache.increment_by("hits", 5u32).unwrap(), 15);
    /// assert!(cache.increment_by("hits", 5i64).is_err());
    /// ```
    pub fn increment_by<T: Numeric>(&self, key: &str, delta: T) -> Result<T> {
        self.shift_exact(key, delta, Op::Add)
    }

    /// Subtracts `delta` from a value stored as exactly `T` and returns the result.
    pub fn decrement_by<T: Numeric>(&self, key: &str, delta: T) -> Result<T> {
        self.shift_exact(key, delta, Op::Sub)
    }
}
