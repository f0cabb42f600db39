//! Stored element types
//!
//! This module defines the trait that constrains what types can be stored in
//! engine arrays and ties each type to its engine entry points.

use super::value::Value;
use crate::format::DataType;

/// Trait for types that can be stored as array elements
///
/// Builtin numeric types map onto native engine kernels through
/// [`Element::DATA_TYPE`]. Anything else goes through the opaque
/// [`Value::Opaque`] path.
pub trait Element:
    Clone + PartialEq + core::fmt::Debug + Default + Send + Sync + 'static
{
    /// Engine type code; its [`DataType::suffix`] selects the entry points
    const DATA_TYPE: DataType;

    /// Type-erased copy of this value, `None` when it cannot be encoded
    fn to_value(&self) -> Option<Value>;

    /// Exact conversion from a type-erased value, `None` when not representable
    fn from_value(value: &Value) -> Option<Self>;

    /// Additive identity
    fn zero() -> Self {
        Self::default()
    }

    /// Truthiness used by valued masks
    fn is_truthy(&self) -> bool;

    /// Default duplicate combiner; `None` when the type has no addition
    fn plus(&self, other: &Self) -> Option<Self>;

    /// Convert from another element type, `None` when narrowing fails
    fn cast_from<U: Element>(other: &U) -> Option<Self> {
        Self::from_value(&other.to_value()?)
    }
}

macro_rules! impl_integer_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DATA_TYPE: DataType = DataType::$variant;

                fn to_value(&self) -> Option<Value> {
                    Some(Value::$variant(*self))
                }

                fn from_value(value: &Value) -> Option<Self> {
                    value.to_exact_integer::<$ty>()
                }

                fn is_truthy(&self) -> bool {
                    *self != 0
                }

                fn plus(&self, other: &Self) -> Option<Self> {
                    Some(self.wrapping_add(*other))
                }
            }
        )*
    };
}

macro_rules! impl_float_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DATA_TYPE: DataType = DataType::$variant;

                fn to_value(&self) -> Option<Value> {
                    Some(Value::$variant(*self))
                }

                fn from_value(value: &Value) -> Option<Self> {
                    // integers must round-trip, finite floats must stay finite
                    if let Some(n) = value.as_integer() {
                        let f = n as $ty;
                        return (f as i128 == n).then_some(f);
                    }
                    let wide = value.as_float()?;
                    let narrowed = wide as $ty;
                    (narrowed.is_finite() || !wide.is_finite()).then_some(narrowed)
                }

                fn is_truthy(&self) -> bool {
                    *self != 0.0
                }

                fn plus(&self, other: &Self) -> Option<Self> {
                    Some(*self + *other)
                }
            }
        )*
    };
}

impl_integer_element!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
);

impl_float_element!(f32 => Float32, f64 => Float64);

impl Element for bool {
    const DATA_TYPE: DataType = DataType::Bool;

    fn to_value(&self) -> Option<Value> {
        Some(Value::Bool(*self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.to_exact_bool()
    }

    fn is_truthy(&self) -> bool {
        *self
    }

    fn plus(&self, other: &Self) -> Option<Self> {
        Some(*self || *other)
    }
}
