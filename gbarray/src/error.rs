//! Error types for array operations

use gbarray_core::{DataType, Info};
use thiserror::Error;

/// Result type alias using gbarray's [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by array operations
///
/// Usage errors are detected by the array layer itself; engine failures are
/// carried verbatim in [`Error::Engine`]. Reading an unstored entry is never an
/// error: it resolves to the fill value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Region or array shapes disagree
    #[error("Dimension mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        /// Expected `(nrows, ncols)`
        expected: (u64, u64),
        /// Actual `(nrows, ncols)`
        got: (u64, u64),
    },

    /// Parallel sequences have different lengths
    #[error("Length mismatch for {what}: expected {expected}, got {got}")]
    LengthMismatch {
        /// Which sequence
        what: &'static str,
        /// Expected length
        expected: usize,
        /// Actual length
        got: usize,
    },

    /// A build target already holds entries
    #[error("Output not empty: build requires an array with no stored entries, found {nnz}")]
    OutputNotEmpty {
        /// Stored entries found in the target
        nnz: u64,
    },

    /// Attempted write through a shallow (non-owning) array
    #[error("Array is a shallow view and cannot be used as an output")]
    ReadOnly,

    /// Storage order is frozen for this array kind
    #[error("Storage order of this array kind cannot be changed")]
    ConstantOrder,

    /// Reshape asked to infer both dimensions
    #[error("Reshape can infer at most one dimension")]
    BothDimensionsInferred,

    /// A 1-based coordinate is zero or beyond the dimension
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The 1-based index
        index: u64,
        /// Size of the dimension
        size: u64,
    },

    /// A value cannot be represented in the target type
    #[error("Cannot convert {from} value to {to}")]
    Conversion {
        /// Source type
        from: DataType,
        /// Target type
        to: DataType,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Why it is invalid
        reason: String,
    },

    /// Non-success status from an engine primitive
    #[error("Engine error: {0}")]
    Engine(Info),
}

impl Error {
    /// Whether this is a shape disagreement, detected locally or by the engine
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(
            self,
            Error::DimensionMismatch { .. }
                | Error::LengthMismatch { .. }
                | Error::Engine(Info::DimensionMismatch)
        )
    }

    /// Conversion failure between two types
    pub fn conversion(from: DataType, to: DataType) -> Self {
        Error::Conversion { from, to }
    }
}

impl From<Info> for Error {
    fn from(info: Info) -> Self {
        Error::Engine(info)
    }
}
