//! Binary operators accepted by engine primitives

use super::element::Element;
use crate::error::{Info, Result};
use alloc::boxed::Box;

/// Accumulator: combines an existing output value with an incoming one
pub type BinaryOp<'a, T> = &'a (dyn Fn(&T, &T) -> T + Send + Sync);

/// Policy for merging duplicate coordinates in a bulk build
pub enum Dup<T> {
    /// Add duplicates with the type's [`Element::plus`]
    Plus,
    /// Keep the first occurrence
    First,
    /// Keep the last occurrence ("last write wins")
    Second,
    /// Reject duplicates with [`Info::InvalidValue`]
    Error,
    /// Combine with a caller-supplied associative function
    With(Box<dyn Fn(&T, &T) -> T + Send + Sync>),
}

impl<T: Element> Dup<T> {
    /// Wrap an associative combiner
    pub fn with<F>(f: F) -> Self
    where
        F: Fn(&T, &T) -> T + Send + Sync + 'static,
    {
        Dup::With(Box::new(f))
    }

    /// Merge `incoming` into `existing`
    pub fn combine(&self, existing: &T, incoming: &T) -> Result<T> {
        match self {
            Dup::Plus => existing.plus(incoming).ok_or(Info::DomainMismatch),
            Dup::First => Ok(existing.clone()),
            Dup::Second => Ok(incoming.clone()),
            Dup::Error => Err(Info::InvalidValue),
            Dup::With(f) => Ok(f(existing, incoming)),
        }
    }
}

impl<T> core::fmt::Debug for Dup<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Dup::Plus => write!(f, "Dup::Plus"),
            Dup::First => write!(f, "Dup::First"),
            Dup::Second => write!(f, "Dup::Second"),
            Dup::Error => write!(f, "Dup::Error"),
            Dup::With(_) => write!(f, "Dup::With(..)"),
        }
    }
}

/// Region kept by the select primitive, relative to diagonal offset `k`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOp {
    /// `j - i <= k`
    Tril,
    /// `j - i >= k`
    Triu,
    /// `j - i == k`
    Diag,
    /// `j - i != k`
    OffDiag,
}

impl SelectOp {
    /// Whether 0-based position `(row, col)` is kept for offset `k`
    pub fn keeps(&self, row: u64, col: u64, k: i64) -> bool {
        let offset = col as i128 - row as i128;
        let k = k as i128;
        match self {
            SelectOp::Tril => offset <= k,
            SelectOp::Triu => offset >= k,
            SelectOp::Diag => offset == k,
            SelectOp::OffDiag => offset != k,
        }
    }
}
