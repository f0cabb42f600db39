//! Array kinds and the traits every kind implements
//!
//! An array is an engine handle plus a fill value: the logical value of every
//! position the handle does not store. Dimensions are never cached; they are
//! read from the handle on demand.
//!
//! Kinds differ along two axes:
//!
//! - ownership: owning arrays ([`GbMatrix`], [`GbVector`]) exclusively own
//!   their handle, shallow arrays ([`ShallowMatrix`], [`ShallowVector`]) wrap
//!   a host buffer lent to the engine and are never valid outputs
//! - storage order: only [`GbMatrix`] with the default [`RuntimeOrder`] marker
//!   may change order after construction
//!
//! The operations themselves live in extension traits implemented for every
//! [`AbstractGbArray`]: [`ElementAccess`](crate::ElementAccess),
//! [`BulkAssign`](crate::BulkAssign), [`Conversion`](crate::Conversion) and
//! [`Structural`](crate::Structural).
//!
//! [`RuntimeOrder`]: gbarray_core::RuntimeOrder

mod matrix;
mod shallow;
mod vector;

pub use matrix::{GbMatrix, GbMatrixC, GbMatrixR};
pub use shallow::{ShallowMatrix, ShallowVector};
pub use vector::GbVector;

use crate::error::{Error, Result};
use crate::native::NativeMatrix;
use gbarray_core::{fill_as, Element, EngineMatrix, Fill, Index, StorageOrder};

/// Behaviour shared by every array kind
pub trait AbstractGbArray: Sized {
    /// Stored element type
    type Elem: Element;
    /// Fill type for unstored positions
    type Fill: Fill;

    /// Whether the array may be written to
    const CAN_BE_OUTPUT: bool;
    /// Whether the storage order is frozen for the kind
    const HAS_CONSTANT_ORDER: bool;
    /// Whether the array is viewed as rank 1
    const IS_VECTOR: bool;
    /// Kind name used in summaries
    const KIND: &'static str;

    /// The engine handle
    fn handle(&self) -> &NativeMatrix<Self::Elem>;

    /// The engine handle for writing; [`Error::ReadOnly`] for shallow arrays
    fn handle_mut(&mut self) -> Result<&mut NativeMatrix<Self::Elem>>;

    /// Current fill value (`getfill`)
    fn fill(&self) -> &Self::Fill;

    /// Replace the fill value in place (`setfill!`)
    fn set_fill(&mut self, fill: Self::Fill);

    /// `(nrows, ncols)`, read from the handle
    fn size(&self) -> (Index, Index) {
        let handle = self.handle();
        (handle.nrows(), handle.ncols())
    }

    /// Number of rows
    fn nrows(&self) -> Index {
        self.handle().nrows()
    }

    /// Number of columns
    fn ncols(&self) -> Index {
        self.handle().ncols()
    }

    /// Number of logical positions
    fn length(&self) -> Result<Index> {
        let (nrows, ncols) = self.size();
        nrows.checked_mul(ncols).ok_or_else(|| Error::InvalidArgument {
            arg: "dims",
            reason: format!("{nrows}x{ncols} positions overflow the index type"),
        })
    }

    /// Current storage order
    fn storage_order(&self) -> StorageOrder {
        self.handle().storage_order()
    }

    /// Change the storage order; the logical content is unchanged
    ///
    /// Kinds with a constant order accept only the order they already have.
    fn set_storage_order(&mut self, order: StorageOrder) -> Result<()> {
        if order == self.storage_order() {
            return Ok(());
        }
        if Self::HAS_CONSTANT_ORDER {
            return Err(Error::ConstantOrder);
        }
        log::debug!("switching storage order to {order}");
        self.handle_mut()?.set_storage_order(order)?;
        Ok(())
    }

    /// Fill converted to the stored type, if representable
    fn fill_as_elem(&self) -> Option<Self::Elem> {
        fill_as(self.fill())
    }
}

/// Arrays that exclusively own their engine handle
pub trait OwningArray: AbstractGbArray {
    /// Wrap a handle, conforming it to the kind's shape and order rules
    fn from_parts(handle: NativeMatrix<Self::Elem>, fill: Self::Fill) -> Result<Self>;

    /// Rebind to another handle, returning the previous one
    ///
    /// The wrapper keeps its identity and fill; only the storage changes.
    fn replace_handle(
        &mut self,
        handle: NativeMatrix<Self::Elem>,
    ) -> Result<NativeMatrix<Self::Elem>>;

    /// Split into handle and fill
    fn into_parts(self) -> (NativeMatrix<Self::Elem>, Self::Fill);
}

/// Marker for rank-1 kinds
pub trait VectorKind: AbstractGbArray {}

/// Force a handle into the shape and order a kind requires
pub(crate) fn conform<T: Element>(
    handle: &mut NativeMatrix<T>,
    fixed: Option<StorageOrder>,
    vector: bool,
) -> Result<()> {
    if vector && handle.ncols() != 1 {
        return Err(Error::DimensionMismatch {
            expected: (handle.nrows(), 1),
            got: (handle.nrows(), handle.ncols()),
        });
    }
    if let Some(order) = fixed {
        if handle.storage_order() != order {
            handle.set_storage_order(order)?;
        }
    }
    Ok(())
}

/// Result of reading one position
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<T, F> {
    /// A stored value
    Stored(T),
    /// The array's fill, for an unstored position
    Fill(F),
}

impl<T, F> Entry<T, F> {
    /// Whether the position was stored
    pub fn is_stored(&self) -> bool {
        matches!(self, Entry::Stored(_))
    }

    /// The stored value, if any
    pub fn stored(&self) -> Option<&T> {
        match self {
            Entry::Stored(v) => Some(v),
            Entry::Fill(_) => None,
        }
    }
}

impl<T> Entry<T, T> {
    /// Collapse to a value when fill and stored types agree
    pub fn into_inner(self) -> T {
        match self {
            Entry::Stored(v) | Entry::Fill(v) => v,
        }
    }
}

impl<T: Element, F: Fill> Entry<T, F> {
    /// The value in the stored type, converting the fill when needed
    ///
    /// `None` only for absent-style fills and fills that do not fit `T`.
    pub fn value(self) -> Option<T> {
        match self {
            Entry::Stored(v) => Some(v),
            Entry::Fill(f) => fill_as(&f),
        }
    }
}

impl<T: core::fmt::Display, F: core::fmt::Display> core::fmt::Display for Entry<T, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Entry::Stored(v) => v.fmt(f),
            Entry::Fill(v) => v.fmt(f),
        }
    }
}

/// Short name of a fill type for summaries
pub(crate) fn fill_type_name<F: Fill>() -> &'static str {
    let full = core::any::type_name::<F>();
    full.rsplit("::").next().unwrap_or(full)
}

/// One-line summary, e.g. `3x3 GbMatrix{i64, i64} with 3 stored entries`
pub(crate) fn summary<A: AbstractGbArray>(
    a: &A,
    f: &mut core::fmt::Formatter<'_>,
) -> core::fmt::Result {
    let handle = a.handle();
    handle.wait().map_err(|_| core::fmt::Error)?;
    let nvals = handle.nvals().map_err(|_| core::fmt::Error)?;
    let (nrows, ncols) = a.size();
    let entries = if nvals == 1 { "entry" } else { "entries" };
    if A::IS_VECTOR {
        write!(f, "{nrows}-element ")?;
    } else {
        write!(f, "{nrows}x{ncols} ")?;
    }
    write!(
        f,
        "{}{{{}, {}}} with {nvals} stored {entries}",
        A::KIND,
        <A::Elem as Element>::DATA_TYPE,
        fill_type_name::<A::Fill>()
    )
}
