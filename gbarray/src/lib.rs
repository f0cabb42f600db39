//! gbarray - Array semantics over a GraphBLAS-style sparse engine
//!
//! This library wraps engine matrix handles in typed arrays with 1-based
//! indexing, a per-array fill value for unstored positions, masked bulk
//! assignment, zero-copy pack/unpack to host buffers and structural
//! operations.
//!
//! ## Architecture
//!
//! gbarray follows a clean contract/implementation separation:
//!
//! - **gbarray-core**: engine primitive contract, element and fill types,
//!   descriptors, storage orders and index translation (no_std, no engine)
//! - **gbarray**: the in-memory reference engine and the array layer on top
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gbarray::prelude::*;
//!
//! fn example() -> gbarray::Result<()> {
//!     // 3x3 matrix with two stored entries, unstored positions read as -1
//!     let mut a = GbMatrix::<i64>::with_fill(3, 3, -1)?;
//!     a.build(&[1, 3], &[2, 3], &[10, 20], Dup::Plus)?;
//!     assert_eq!(a.get(1, 2)?.into_inner(), 10);
//!     assert_eq!(a.get(2, 2)?.into_inner(), -1);
//!
//!     // write a 2x2 block from a host buffer
//!     let mut block = DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]])?;
//!     let mut b = GbMatrix::<f64>::new(4, 4)?;
//!     let region = Selector::Range(2..=3);
//!     b.subassign_dense(&mut block, region.clone(), region, &AssignOptions::new())?;
//!     assert_eq!(b.nnz()?, 4);
//!     println!("{b}");
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Fill values**: unstored reads resolve to the array's fill, including
//!   the absent-style [`Nothing`]
//! - **Masked assignment**: both the region-sized and the output-sized mask
//!   conventions, with accumulators and replace semantics
//! - **Pack/unpack**: host buffers move in and out of the engine without
//!   copying, bracketed so the buffer is always restored
//! - **Type safety**: stored types, fill types and storage orders are part of
//!   the array type
//! - **serde** (default feature): user-defined element types through
//!   [`Udt`], serialisable configuration and host arrays

// Re-export core abstractions
pub use gbarray_core::{
    // Element model
    fill_as, promote_fill, resolve_fill, DataType, Element, Fill, Nothing, Promote, Promoted,
    Value,
    // Engine contract
    BinaryOp, Descriptor, Dup, EngineMatrix, Index, IndexList, MaskSource, SelectOp,
    // Storage orders
    promote_order, ColMajor, OrderKind, RowMajor, RuntimeOrder, StorageOrder,
    // Engine status
    ErrorCategory, Info,
};

// Implementation modules
pub mod access;
pub mod array;
pub mod assign;
pub mod cat;
pub mod config;
pub mod convert;
pub mod error;
pub mod host;
pub mod native;
pub mod structure;
#[cfg(feature = "serde")]
pub mod udt;

// Public exports
pub use access::{ElementAccess, VectorAccess};
pub use array::{
    AbstractGbArray, Entry, GbMatrix, GbMatrixC, GbMatrixR, GbVector, OwningArray,
    ShallowMatrix, ShallowVector, VectorKind,
};
pub use assign::{AssignOptions, BulkAssign, Selector};
pub use cat::{cat, hcat, hcat_promoted, vcat, vcat_promoted};
pub use config::{global_config, set_global_config, EngineConfig};
pub use convert::{Conversion, CscGuard, DenseGuard};
pub use error::{Error, Result};
pub use host::{CscMatrix, DenseMatrix};
pub use native::{NativeMatrix, StorageFormat};
pub use structure::Structural;

#[cfg(feature = "serde")]
pub use udt::Udt;

/// Everything needed for everyday array work
pub mod prelude {
    pub use crate::access::{ElementAccess, VectorAccess};
    pub use crate::array::{
        AbstractGbArray, Entry, GbMatrix, GbMatrixC, GbMatrixR, GbVector, OwningArray,
        ShallowMatrix, ShallowVector,
    };
    pub use crate::assign::{AssignOptions, BulkAssign, Selector};
    pub use crate::cat::{cat, hcat, vcat};
    pub use crate::convert::Conversion;
    pub use crate::host::{CscMatrix, DenseMatrix};
    pub use crate::structure::Structural;
    pub use gbarray_core::{Dup, Nothing, StorageOrder};
}
