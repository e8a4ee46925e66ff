//! Cache Value Module
//!
//! Closed set of payload kinds the cache can hold. Arithmetic only ever
//! touches the numeric variants; everything else is opaque to the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

// == Value ==
/// A cached payload.
///
/// Serialized externally tagged, so a numeric kind survives a snapshot round
/// trip exactly (an `I8` is loaded back as an `I8`). Non-finite floats are
/// written as the strings `"NaN"`, `"inf"` and `"-inf"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    F32(#[serde(with = "float_repr")] f32),
    F64(#[serde(with = "float_repr")] f64),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
}

impl Value {
    /// Returns the numeric kind of this value, or None for opaque payloads.
    pub fn numeric_kind(&self) -> Option<NumericKind> {
        let kind = match self {
            Value::I8(_) => NumericKind::I8,
            Value::I16(_) => NumericKind::I16,
            Value::I32(_) => NumericKind::I32,
            Value::I64(_) => NumericKind::I64,
            Value::Isize(_) => NumericKind::Isize,
            Value::U8(_) => NumericKind::U8,
            Value::U16(_) => NumericKind::U16,
            Value::U32(_) => NumericKind::U32,
            Value::U64(_) => NumericKind::U64,
            Value::Usize(_) => NumericKind::Usize,
            Value::F32(_) => NumericKind::F32,
            Value::F64(_) => NumericKind::F64,
            Value::Bool(_) | Value::Str(_) | Value::Bytes(_) | Value::Json(_) => return None,
        };
        Some(kind)
    }

    /// Short name of the stored kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Json(_) => "json",
            numeric => numeric.numeric_kind().map(NumericKind::as_str).unwrap_or("unknown"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

// == Numeric Kind ==
/// Tag for each numeric variant of [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
}

impl NumericKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NumericKind::I8 => "i8",
            NumericKind::I16 => "i16",
            NumericKind::I32 => "i32",
            NumericKind::I64 => "i64",
            NumericKind::Isize => "isize",
            NumericKind::U8 => "u8",
            NumericKind::U16 => "u16",
            NumericKind::U32 => "u32",
            NumericKind::U64 => "u64",
            NumericKind::Usize => "usize",
            NumericKind::F32 => "f32",
            NumericKind::F64 => "f64",
        }
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON has no literal for NaN or infinity, so those travel as strings.
mod float_repr {
    use std::fmt;

    use serde::de::{self, Unexpected, Visitor};
    use serde::{Deserializer, Serializer};

    const NAN: &str = "NaN";
    const INFINITY: &str = "inf";
    const NEG_INFINITY: &str = "-inf";

    pub trait Float: Copy {
        fn to_f64(self) -> f64;

        fn from_f64(v: f64) -> Self;

        fn serialize_finite<S: Serializer>(self, serializer: S) -> Result<S::Ok, S::Error>;
    }

    impl Float for f32 {
        fn to_f64(self) -> f64 {
            self as f64
        }

        fn from_f64(v: f64) -> Self {
            v as f32
        }

        fn serialize_finite<S: Serializer>(self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_f32(self)
        }
    }

    impl Float for f64 {
        fn to_f64(self) -> f64 {
            self
        }

        fn from_f64(v: f64) -> Self {
            v
        }

        fn serialize_finite<S: Serializer>(self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_f64(self)
        }
    }

    pub fn serialize<T: Float, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        let v = value.to_f64();
        if v.is_nan() {
            serializer.serialize_str(NAN)
        } else if v == f64::INFINITY {
            serializer.serialize_str(INFINITY)
        } else if v == f64::NEG_INFINITY {
            serializer.serialize_str(NEG_INFINITY)
        } else {
            value.serialize_finite(serializer)
        }
    }

    pub fn deserialize<'de, T: Float, D: Deserializer<'de>>(deserializer: D) -> Result<T, D::Error> {
        deserializer.deserialize_any(FloatVisitor).map(T::from_f64)
    }

    struct FloatVisitor;

    impl<'de> Visitor<'de> for FloatVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a number or one of \"{}\", \"{}\", \"{}\"", NAN, INFINITY, NEG_INFINITY)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v {
                NAN => Ok(f64::NAN),
                INFINITY => Ok(f64::INFINITY),
                NEG_INFINITY => Ok(f64::NEG_INFINITY),
                other => Err(E::invalid_value(Unexpected::Str(other), &self)),
            }
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

// == Numeric Trait ==
/// A primitive type that maps one-to-one onto a numeric [`Value`] variant.
///
/// Integer arithmetic wraps on overflow.
pub trait Numeric: Copy + Into<Value> + sealed::Sealed {
    /// The variant this type is stored as
    const KIND: NumericKind;

    /// Extracts the primitive if `value` holds exactly this kind.
    fn from_value(value: &Value) -> Option<Self>;

    fn plus(self, rhs: Self) -> Self;

    fn minus(self, rhs: Self) -> Self;
}

macro_rules! impl_numeric {
    (int: $($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl_numeric!(@common $t => $variant);

            impl Numeric for $t {
                const KIND: NumericKind = NumericKind::$variant;

                #[inline]
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(*v),
                        _ => None,
                    }
                }

                #[inline]
                fn plus(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }

                #[inline]
                fn minus(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }
            }
        )*
    };
    (float: $($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl_numeric!(@common $t => $variant);

            impl Numeric for $t {
                const KIND: NumericKind = NumericKind::$variant;

                #[inline]
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(*v),
                        _ => None,
                    }
                }

                #[inline]
                fn plus(self, rhs: Self) -> Self {
                    self + rhs
                }

                #[inline]
                fn minus(self, rhs: Self) -> Self {
                    self - rhs
                }
            }
        )*
    };
    (@common $t:ty => $variant:ident) => {
        impl sealed::Sealed for $t {}

        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_numeric!(int:
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
);

impl_numeric!(float:
    f32 => F32,
    f64 => F64,
);

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_kind_of_values() {
        assert_eq!(Value::from(1i8).numeric_kind(), Some(NumericKind::I8));
        assert_eq!(Value::from(1usize).numeric_kind(), Some(NumericKind::Usize));
        assert_eq!(Value::from(1.5f32).numeric_kind(), Some(NumericKind::F32));
        assert_eq!(Value::from("text").numeric_kind(), None);
        assert_eq!(Value::from(true).numeric_kind(), None);
    }

    #[test]
    fn test_from_value_requires_exact_kind() {
        assert_eq!(i64::from_value(&Value::I64(7)), Some(7));
        assert_eq!(i64::from_value(&Value::I32(7)), None);
        assert_eq!(f64::from_value(&Value::F32(1.0)), None);
        assert_eq!(u8::from_value(&Value::Str("7".to_string())), None);
    }

    #[test]
    fn test_integer_arithmetic_wraps() {
        assert_eq!(250u8.plus(10), 4);
        assert_eq!(0u32.minus(1), u32::MAX);
        assert_eq!(i8::MAX.plus(1), i8::MIN);
    }

    #[test]
    fn test_float_arithmetic() {
        assert_eq!(1.5f64.plus(2.25), 3.75);
        assert_eq!(1.5f32.minus(0.5), 1.0);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::I16(1).kind_name(), "i16");
        assert_eq!(Value::Bytes(vec![1]).kind_name(), "bytes");
        assert_eq!(Value::Json(serde_json::json!({"a": 1})).kind_name(), "json");
    }

    #[test]
    fn test_tagged_serialization_keeps_kind() {
        let encoded = serde_json::to_string(&Value::I8(-3)).unwrap();
        assert_eq!(encoded, r#"{"I8":-3}"#);

        let decoded: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, Value::I8(-3));
    }

    #[test]
    fn test_non_finite_floats_serialize_as_strings() {
        assert_eq!(serde_json::to_string(&Value::F32(f32::INFINITY)).unwrap(), r#"{"F32":"inf"}"#);
        assert_eq!(serde_json::to_string(&Value::F64(f64::NEG_INFINITY)).unwrap(), r#"{"F64":"-inf"}"#);
        assert_eq!(serde_json::to_string(&Value::F64(f64::NAN)).unwrap(), r#"{"F64":"NaN"}"#);

        let decoded: Value = serde_json::from_str(r#"{"F32":"-inf"}"#).unwrap();
        assert_eq!(decoded, Value::F32(f32::NEG_INFINITY));

        let decoded: Value = serde_json::from_str(r#"{"F64":"NaN"}"#).unwrap();
        assert!(matches!(decoded, Value::F64(v) if v.is_nan()));
    }

    #[test]
    fn test_finite_floats_keep_numeric_form() {
        assert_eq!(serde_json::to_string(&Value::F32(0.1)).unwrap(), r#"{"F32":0.1}"#);

        let decoded: Value = serde_json::from_str(r#"{"F32":0.1}"#).unwrap();
        assert_eq!(decoded, Value::F32(0.1));

        // Integral literals are accepted for float kinds
        let decoded: Value = serde_json::from_str(r#"{"F64":3}"#).unwrap();
        assert_eq!(decoded, Value::F64(3.0));

        assert!(serde_json::from_str::<Value>(r#"{"F64":"infinity"}"#).is_err());
    }
}
