//! Stored-type promotion
//!
//! The join of two stored types under standard numeric widening: `bool` is
//! absorbed by anything, floats absorb integers, the wider integer wins and a
//! signed/unsigned tie goes to the unsigned type.

use super::element::Element;

/// Type-level join of two stored types
pub trait Promote<Rhs: Element>: Element {
    /// The promoted type
    type Output: Element;
}

/// Promoted type of `A` and `B`
pub type Promoted<A, B> = <A as Promote<B>>::Output;

macro_rules! promote_table {
    ($($lhs:ty => [$($rhs:ty: $out:ty),* $(,)?]),* $(,)?) => {
        $($(
            impl Promote<$rhs> for $lhs {
                type Output = $out;
            }
        )*)*
    };
}

promote_table! {
    bool => [bool: bool, i8: i8, i16: i16, i32: i32, i64: i64,
        u8: u8, u16: u16, u32: u32, u64: u64, f32: f32, f64: f64],
    i8 => [bool: i8, i8: i8, i16: i16, i32: i32, i64: i64,
        u8: u8, u16: u16, u32: u32, u64: u64, f32: f32, f64: f64],
    i16 => [bool: i16, i8: i16, i16: i16, i32: i32, i64: i64,
        u8: i16, u16: u16, u32: u32, u64: u64, f32: f32, f64: f64],
    i32 => [bool: i32, i8: i32, i16: i32, i32: i32, i64: i64,
        u8: i32, u16: i32, u32: u32, u64: u64, f32: f32, f64: f64],
    i64 => [bool: i64, i8: i64, i16: i64, i32: i64, i64: i64,
        u8: i64, u16: i64, u32: i64, u64: u64, f32: f32, f64: f64],
    u8 => [bool: u8, i8: u8, i16: i16, i32: i32, i64: i64,
        u8: u8, u16: u16, u32: u32, u64: u64, f32: f32, f64: f64],
    u16 => [bool: u16, i8: u16, i16: u16, i32: i32, i64: i64,
        u8: u16, u16: u16, u32: u32, u64: u64, f32: f32, f64: f64],
    u32 => [bool: u32, i8: u32, i16: u32, i32: u32, i64: i64,
        u8: u32, u16: u32, u32: u32, u64: u64, f32: f32, f64: f64],
    u64 => [bool: u64, i8: u64, i16: u64, i32: u64, i64: u64,
        u8: u64, u16: u64, u32: u64, u64: u64, f32: f32, f64: f64],
    f32 => [bool: f32, i8: f32, i16: f32, i32: f32, i64: f32,
        u8: f32, u16: f32, u32: f32, u64: f32, f32: f32, f64: f64],
    f64 => [bool: f64, i8: f64, i16: f64, i32: f64, i64: f64,
        u8: f64, u16: f64, u32: f64, u64: f64, f32: f64, f64: f64],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::DataType;

    fn join<A: Promote<B>, B: Element>() -> DataType {
        <Promoted<A, B> as Element>::DATA_TYPE
    }

    #[test]
    fn test_widening() {
        assert_eq!(join::<bool, i8>(), DataType::Int8);
        assert_eq!(join::<i8, i64>(), DataType::Int64);
        assert_eq!(join::<i32, u32>(), DataType::UInt32);
        assert_eq!(join::<u8, i16>(), DataType::Int16);
        assert_eq!(join::<i64, f32>(), DataType::Float32);
        assert_eq!(join::<f32, f64>(), DataType::Float64);
        assert_eq!(join::<u16, u16>(), DataType::UInt16);
    }
}
