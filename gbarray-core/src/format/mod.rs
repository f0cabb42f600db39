//! Engine-boundary definitions
//!
//! Pure data definitions shared by every engine implementation: index width
//! and sentinels, element type codes, storage orders and call descriptors.

pub mod constants;
pub mod descriptor;
pub mod order;
pub mod types;

pub use constants::{Index, INDEX_MAX};
pub use descriptor::Descriptor;
pub use order::{
    promote_order, ColMajor, OrderKind, RowMajor, RuntimeOrder, StorageOrder,
};
pub use types::DataType;
