//! Primitive contract of the sparse engine
//!
//! The array layer never touches engine storage directly; everything goes
//! through this trait. All coordinates crossing it are 0-based, all counts
//! use the engine's [`Index`] width, and outcomes are reported as [`Info`]
//! codes (`NoValue` for reads of unstored entries).
//!
//! [`Info`]: crate::Info

use super::element::Element;
use super::ops::{BinaryOp, Dup, SelectOp};
use crate::error::Result;
use crate::format::{Descriptor, Index, StorageOrder};
use alloc::vec::Vec;

/// Row or column selector as seen by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexList<'a> {
    /// Entire dimension
    All,
    /// Contiguous half-open range `start..end`
    Range { start: Index, end: Index },
    /// Explicit 0-based indices
    List(&'a [Index]),
}

impl<'a> IndexList<'a> {
    /// Number of selected positions along a dimension of length `dim`
    pub fn len(&self, dim: Index) -> Index {
        match *self {
            IndexList::All => dim,
            IndexList::Range { start, end } => end.saturating_sub(start),
            IndexList::List(list) => list.len() as Index,
        }
    }

    /// Whether nothing is selected
    pub fn is_empty(&self, dim: Index) -> bool {
        self.len(dim) == 0
    }

    /// The `p`-th selected index
    pub fn get(&self, p: Index) -> Index {
        match *self {
            IndexList::All => p,
            IndexList::Range { start, .. } => start + p,
            IndexList::List(list) => list[p as usize],
        }
    }

    /// Largest selected index, if any
    pub fn max_index(&self, dim: Index) -> Option<Index> {
        match *self {
            IndexList::All => dim.checked_sub(1),
            IndexList::Range { start, end } => (end > start).then(|| end - 1),
            IndexList::List(list) => list.iter().copied().max(),
        }
    }
}

/// Anything usable as a write mask
pub trait MaskSource: Sync {
    /// Mask dimensions
    fn mask_dims(&self) -> (Index, Index);

    /// `None` when unstored at the 0-based position, else the value's truthiness
    fn mask_entry(&self, row: Index, col: Index) -> Option<bool>;
}

/// Stored coordinate triples, 0-based
pub type Tuples<T> = (Vec<Index>, Vec<Index>, Vec<T>);

/// Compressed-sparse-column buffers, 0-based: `(colptr, rowval, values)`
pub type CscParts<T> = (Vec<Index>, Vec<Index>, Vec<T>);

/// The engine primitive contract for one stored element type
pub trait EngineMatrix<T: Element>: Sized + MaskSource {
    /// Create an empty `nrows × ncols` handle
    fn new(nrows: Index, ncols: Index) -> Result<Self>;

    /// Deep copy
    fn dup(&self) -> Result<Self>;

    /// Number of rows
    fn nrows(&self) -> Index;

    /// Number of columns
    fn ncols(&self) -> Index;

    /// Stored-entry count; may over-count while work is pending
    fn nvals(&self) -> Result<Index>;

    /// Finish any deferred work
    fn wait(&self) -> Result<()>;

    /// Drop every stored entry
    fn clear(&mut self) -> Result<()>;

    /// Current storage order
    fn storage_order(&self) -> StorageOrder;

    /// Change storage order
    fn set_storage_order(&mut self, order: StorageOrder) -> Result<()>;

    /// Store one value
    fn set_element(&mut self, value: T, row: Index, col: Index) -> Result<()>;

    /// Read one value; `Err(Info::NoValue)` when unstored
    fn extract_element(&self, row: Index, col: Index) -> Result<T>;

    /// Remove one value; removing an unstored entry succeeds
    fn remove_element(&mut self, row: Index, col: Index) -> Result<()>;

    /// Populate an empty handle from triples
    fn build(&mut self, rows: &[Index], cols: &[Index], values: &[T], dup: &Dup<T>) -> Result<()>;

    /// Populate an empty handle with one repeated value
    fn build_scalar(&mut self, rows: &[Index], cols: &[Index], value: &T) -> Result<()>;

    /// All stored triples in storage order
    fn extract_tuples(&self) -> Result<Tuples<T>>;

    /// `C(I,J)<M> = accum(C(I,J), A)`, mask sized like `A`
    fn subassign(
        &mut self,
        mask: Option<&dyn MaskSource>,
        accum: Option<BinaryOp<'_, T>>,
        source: &Self,
        rows: IndexList<'_>,
        cols: IndexList<'_>,
        desc: &Descriptor,
    ) -> Result<()>;

    /// Scalar-broadcast variant of [`subassign`](Self::subassign)
    fn subassign_scalar(
        &mut self,
        mask: Option<&dyn MaskSource>,
        accum: Option<BinaryOp<'_, T>>,
        value: &T,
        rows: IndexList<'_>,
        cols: IndexList<'_>,
        desc: &Descriptor,
    ) -> Result<()>;

    /// `C<M>(I,J) = accum(C(I,J), A)`, mask sized like `C`
    fn assign(
        &mut self,
        mask: Option<&dyn MaskSource>,
        accum: Option<BinaryOp<'_, T>>,
        source: &Self,
        rows: IndexList<'_>,
        cols: IndexList<'_>,
        desc: &Descriptor,
    ) -> Result<()>;

    /// Scalar-broadcast variant of [`assign`](Self::assign)
    fn assign_scalar(
        &mut self,
        mask: Option<&dyn MaskSource>,
        accum: Option<BinaryOp<'_, T>>,
        value: &T,
        rows: IndexList<'_>,
        cols: IndexList<'_>,
        desc: &Descriptor,
    ) -> Result<()>;

    /// `C<M> = accum(C, A(I,J))`, mask sized like `C`
    fn extract(
        &mut self,
        mask: Option<&dyn MaskSource>,
        accum: Option<BinaryOp<'_, T>>,
        source: &Self,
        rows: IndexList<'_>,
        cols: IndexList<'_>,
        desc: &Descriptor,
    ) -> Result<()>;

    /// Change dimensions; entries outside the new bounds are dropped
    fn resize(&mut self, nrows: Index, ncols: Index) -> Result<()>;

    /// Reinterpret the element layout in place, column- or row-wise
    fn reshape(&mut self, nrows: Index, ncols: Index, by_col: bool) -> Result<()>;

    /// Reshaped copy
    fn reshape_dup(&self, nrows: Index, ncols: Index, by_col: bool) -> Result<Self>;

    /// Block matrix from a row-major grid of tiles
    fn concat(tiles: &[Vec<&Self>]) -> Result<Self>;

    /// `n × 1` handle holding the `k`-th diagonal
    fn extract_diag(&self, k: i64) -> Result<Self>;

    /// Square handle whose `k`-th diagonal is the `n × 1` input
    fn from_diag(vector: &Self, k: i64) -> Result<Self>;

    /// Copy keeping only entries selected by `op` at offset `k`
    fn select(&self, op: SelectOp, k: i64) -> Result<Self>;

    /// Take ownership of a full (every entry present) buffer in `order`
    fn pack_full(&mut self, values: Vec<T>, order: StorageOrder) -> Result<()>;

    /// Hand out the full buffer in column-major order, densifying with
    /// `densify` first when entries are missing
    fn unpack_full(&mut self, densify: Option<&T>) -> Result<Vec<T>>;

    /// Take ownership of compressed-sparse-column buffers
    fn pack_csc(&mut self, parts: CscParts<T>) -> Result<()>;

    /// Hand out compressed-sparse-column buffers
    fn unpack_csc(&mut self) -> Result<CscParts<T>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_list() {
        let all = IndexList::All;
        assert_eq!(all.len(4), 4);
        assert_eq!(all.get(2), 2);
        assert_eq!(all.max_index(0), None);

        let range = IndexList::Range { start: 2, end: 5 };
        assert_eq!(range.len(10), 3);
        assert_eq!(range.get(1), 3);
        assert_eq!(range.max_index(10), Some(4));

        let list = IndexList::List(&[4, 0, 2]);
        assert_eq!(list.len(10), 3);
        assert_eq!(list.get(0), 4);
        assert_eq!(list.max_index(10), Some(4));
        assert!(IndexList::List(&[]).is_empty(10));
    }
}
