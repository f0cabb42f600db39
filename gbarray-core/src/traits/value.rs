//! Type-erased element values
//!
//! [`Value`] is the common currency for converting between stored types, for
//! fill values of a different type than the stored one, and for opaque
//! user-defined elements that the engine only moves around as bytes.

use crate::format::DataType;
use alloc::vec::Vec;
use num_traits::{float::FloatCore, NumCast};

/// A single element of any engine type
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    /// Serialised user-defined value
    Opaque(Vec<u8>),
}

impl Value {
    /// Type code of the held value
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Bool(_) => DataType::Bool,
            Value::Int8(_) => DataType::Int8,
            Value::Int16(_) => DataType::Int16,
            Value::Int32(_) => DataType::Int32,
            Value::Int64(_) => DataType::Int64,
            Value::UInt8(_) => DataType::UInt8,
            Value::UInt16(_) => DataType::UInt16,
            Value::UInt32(_) => DataType::UInt32,
            Value::UInt64(_) => DataType::UInt64,
            Value::Float32(_) => DataType::Float32,
            Value::Float64(_) => DataType::Float64,
            Value::Opaque(_) => DataType::Udt,
        }
    }

    /// Integer view of boolean and integer values
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Value::Bool(b) => Some(b as i128),
            Value::Int8(v) => Some(v as i128),
            Value::Int16(v) => Some(v as i128),
            Value::Int32(v) => Some(v as i128),
            Value::Int64(v) => Some(v as i128),
            Value::UInt8(v) => Some(v as i128),
            Value::UInt16(v) => Some(v as i128),
            Value::UInt32(v) => Some(v as i128),
            Value::UInt64(v) => Some(v as i128),
            _ => None,
        }
    }

    /// Floating-point view of any numeric value
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Value::Float32(v) => Some(v as f64),
            Value::Float64(v) => Some(v),
            Value::Opaque(_) => None,
            _ => self.as_integer().map(|n| n as f64),
        }
    }

    /// Exact conversion to an integer type
    ///
    /// Floats convert only when integral and in range; narrowing that loses
    /// information yields `None`.
    pub fn to_exact_integer<T>(&self) -> Option<T>
    where
        T: NumCast + TryFrom<i128>,
    {
        match *self {
            Value::Float32(f) => integral_float(f as f64),
            Value::Float64(f) => integral_float(f),
            Value::Opaque(_) => None,
            _ => self.as_integer().and_then(|n| T::try_from(n).ok()),
        }
    }

    /// Exact conversion to `bool` (only `0` and `1` are accepted)
    pub fn to_exact_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Opaque(_) => None,
            other => match other.as_float()? {
                x if x == 0.0 => Some(false),
                x if x == 1.0 => Some(true),
                _ => None,
            },
        }
    }
}

fn integral_float<T: NumCast>(f: f64) -> Option<T> {
    if !FloatCore::is_finite(f) || FloatCore::fract(f) != 0.0 {
        return None;
    }
    NumCast::from(f)
}
