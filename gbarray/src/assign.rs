//! Masked bulk assignment and extraction
//!
//! Two mask conventions are supported:
//!
//! - [`BulkAssign::subassign`]: `C(I,J)<M> = accum(C(I,J), A)`, the mask is
//!   sized like the region and nothing outside the region is touched
//! - [`BulkAssign::assign`]: `C<M>(I,J) = accum(C(I,J), A)`, the mask is sized
//!   like `C` and replace semantics may clear entries outside the region
//!
//! Sources are arrays of any element type, scalars, or host buffers. A source
//! whose stored type differs from the destination's is cast into a temporary
//! copy first.

use crate::access::{cast_value, coord, coords, ensure_output};
use crate::array::{AbstractGbArray, GbMatrix, OwningArray, ShallowMatrix};
use crate::convert::cast_handle;
use crate::error::Result;
use crate::host::{CscMatrix, DenseMatrix};
use crate::native::NativeMatrix;
use gbarray_core::{BinaryOp, Descriptor, Element, EngineMatrix, Index, IndexList, MaskSource};
use std::any::Any;
use std::ops::{RangeFull, RangeInclusive};

/// 1-based row or column selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector<'a> {
    /// The entire dimension (`:`)
    All,
    /// A single index
    Index(Index),
    /// Explicit indices, duplicates allowed
    List(&'a [Index]),
    /// Contiguous inclusive range
    Range(RangeInclusive<Index>),
}

impl From<RangeFull> for Selector<'_> {
    fn from(_: RangeFull) -> Self {
        Selector::All
    }
}

impl From<Index> for Selector<'_> {
    fn from(i: Index) -> Self {
        Selector::Index(i)
    }
}

impl<'a> From<&'a [Index]> for Selector<'a> {
    fn from(list: &'a [Index]) -> Self {
        Selector::List(list)
    }
}

impl<'a, const N: usize> From<&'a [Index; N]> for Selector<'a> {
    fn from(list: &'a [Index; N]) -> Self {
        Selector::List(list)
    }
}

impl<'a> From<&'a Vec<Index>> for Selector<'a> {
    fn from(list: &'a Vec<Index>) -> Self {
        Selector::List(list)
    }
}

impl From<RangeInclusive<Index>> for Selector<'_> {
    fn from(range: RangeInclusive<Index>) -> Self {
        Selector::Range(range)
    }
}

/// Selector translated to 0-based engine form
#[derive(Debug)]
pub(crate) enum Translated {
    All,
    Range(Index, Index),
    List(Vec<Index>),
}

impl Translated {
    pub(crate) fn new(selector: &Selector<'_>, dim: Index) -> Result<Self> {
        Ok(match selector {
            Selector::All => Translated::All,
            Selector::Index(i) => Translated::List(vec![coord(*i, dim)?]),
            Selector::List(list) => Translated::List(coords(list, dim)?),
            Selector::Range(range) if range.is_empty() => Translated::Range(0, 0),
            Selector::Range(range) => {
                let start = coord(*range.start(), dim)?;
                Translated::Range(start, coord(*range.end(), dim)? + 1)
            }
        })
    }

    pub(crate) fn as_list(&self) -> IndexList<'_> {
        match self {
            Translated::All => IndexList::All,
            Translated::Range(start, end) => IndexList::Range {
                start: *start,
                end: *end,
            },
            Translated::List(list) => IndexList::List(list),
        }
    }

    pub(crate) fn len(&self, dim: Index) -> Index {
        self.as_list().len(dim)
    }
}

/// Mask, accumulator and descriptor of one assignment
pub struct AssignOptions<'a, T> {
    mask: Option<&'a dyn MaskSource>,
    accum: Option<BinaryOp<'a, T>>,
    desc: Descriptor,
}

impl<'a, T: Element> AssignOptions<'a, T> {
    /// No mask, no accumulator, default descriptor
    pub fn new() -> Self {
        Self {
            mask: None,
            accum: None,
            desc: Descriptor::new(),
        }
    }

    /// Restrict writes to positions selected by `mask`
    pub fn mask<M: AbstractGbArray>(mut self, mask: &'a M) -> Self {
        self.mask = Some(mask.handle());
        self
    }

    /// Combine `accum(old, new)` instead of overwriting
    pub fn accum(mut self, accum: BinaryOp<'a, T>) -> Self {
        self.accum = Some(accum);
        self
    }

    /// Clear masked-out output positions
    pub fn replace(mut self, replace: bool) -> Self {
        self.desc.replace_output = replace;
        self
    }

    /// Use the mask pattern only
    pub fn structural(mut self, structural: bool) -> Self {
        self.desc.structural_mask = structural;
        self
    }

    /// Use the complement of the mask
    pub fn complement(mut self, complement: bool) -> Self {
        self.desc.complement_mask = complement;
        self
    }

    /// Read the source transposed
    pub fn transpose(mut self, transpose: bool) -> Self {
        self.desc.transpose_input0 = transpose;
        self
    }

    /// Replace the whole descriptor
    pub fn descriptor(mut self, desc: Descriptor) -> Self {
        self.desc = desc;
        self
    }

    /// The descriptor passed to the engine
    pub fn desc(&self) -> &Descriptor {
        &self.desc
    }
}

impl<T: Element> Default for AssignOptions<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Source handle in the destination's stored type
pub(crate) enum Operand<'s, T: Element> {
    Borrowed(&'s NativeMatrix<T>),
    Owned(NativeMatrix<T>),
}

impl<T: Element> Operand<'_, T> {
    pub(crate) fn handle(&self) -> &NativeMatrix<T> {
        match self {
            Operand::Borrowed(h) => h,
            Operand::Owned(h) => h,
        }
    }
}

/// Bring a source handle to stored type `T`, copying only when needed
pub(crate) fn harmonise<S: Element, T: Element>(
    source: &NativeMatrix<S>,
) -> Result<Operand<'_, T>> {
    if let Some(same) = (source as &dyn Any).downcast_ref::<NativeMatrix<T>>() {
        if T::DATA_TYPE.is_builtin() {
            return Ok(Operand::Borrowed(same));
        }
        log::debug!("copying {} source through the opaque path", T::DATA_TYPE);
        return Ok(Operand::Owned(same.dup()?));
    }
    log::debug!("casting {} source to {}", S::DATA_TYPE, T::DATA_TYPE);
    Ok(Operand::Owned(cast_handle(source)?))
}

/// An `n × 1` handle viewed as `1 × n` for the lifetime of the guard
struct RowView<'s, T: Element> {
    handle: &'s NativeMatrix<T>,
    len: Index,
}

impl<'s, T: Element> RowView<'s, T> {
    fn new(handle: &'s NativeMatrix<T>) -> Result<Self> {
        let len = handle.nrows();
        log::debug!("viewing {len}-element vector as a row");
        handle.reshape_shared(1, len, true)?;
        Ok(Self { handle, len })
    }
}

impl<T: Element> Drop for RowView<'_, T> {
    fn drop(&mut self) {
        if let Err(info) = self.handle.reshape_shared(self.len, 1, true) {
            log::error!("failed to restore vector shape: {info}");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Convention {
    Sub,
    Whole,
}

fn assign_handle<D: AbstractGbArray>(
    dest: &mut D,
    convention: Convention,
    source: &NativeMatrix<D::Elem>,
    rows: &Translated,
    cols: &Translated,
    opts: &AssignOptions<'_, D::Elem>,
) -> Result<()> {
    let (nrows, ncols) = dest.size();
    let region = (rows.len(nrows), cols.len(ncols));
    let as_row = !opts.desc.transpose_input0
        && source.ncols() == 1
        && source.nrows() > 1
        && region == (1, source.nrows());
    let _row_view = if as_row { Some(RowView::new(source)?) } else { None };

    let handle = dest.handle_mut()?;
    let (rows, cols) = (rows.as_list(), cols.as_list());
    match convention {
        Convention::Sub => handle.subassign(opts.mask, opts.accum, source, rows, cols, &opts.desc)?,
        Convention::Whole => handle.assign(opts.mask, opts.accum, source, rows, cols, &opts.desc)?,
    }
    Ok(())
}

fn assign_array<D: AbstractGbArray, S: AbstractGbArray>(
    dest: &mut D,
    convention: Convention,
    source: &S,
    rows: Selector<'_>,
    cols: Selector<'_>,
    opts: &AssignOptions<'_, D::Elem>,
) -> Result<()> {
    ensure_output::<D>()?;
    let (nrows, ncols) = dest.size();
    let (rows, cols) = (Translated::new(&rows, nrows)?, Translated::new(&cols, ncols)?);
    let operand = harmonise::<S::Elem, D::Elem>(source.handle())?;
    assign_handle(dest, convention, operand.handle(), &rows, &cols, opts)
}

fn assign_scalar<D: AbstractGbArray, X: Element>(
    dest: &mut D,
    convention: Convention,
    value: &X,
    rows: Selector<'_>,
    cols: Selector<'_>,
    opts: &AssignOptions<'_, D::Elem>,
) -> Result<()> {
    ensure_output::<D>()?;
    let (nrows, ncols) = dest.size();
    let (rows, cols) = (Translated::new(&rows, nrows)?, Translated::new(&cols, ncols)?);
    let value: D::Elem = cast_value(value)?;
    let handle = dest.handle_mut()?;
    let (rows, cols) = (rows.as_list(), cols.as_list());
    match convention {
        Convention::Sub => {
            handle.subassign_scalar(opts.mask, opts.accum, &value, rows, cols, &opts.desc)?
        }
        Convention::Whole => {
            handle.assign_scalar(opts.mask, opts.accum, &value, rows, cols, &opts.desc)?
        }
    }
    Ok(())
}

/// Bulk assignment and extraction, available on every array kind
///
/// Destinations must be output-capable; shallow arrays fail with
/// [`Error::ReadOnly`](crate::Error::ReadOnly). An `n × 1` source assigned to
/// a `1 × n` region is viewed as a row for the duration of the call.
pub trait BulkAssign: AbstractGbArray {
    /// `C(I,J)<M> = accum(C(I,J), A)` with the mask sized like the region (`subassign!`)
    fn subassign<'r, S: AbstractGbArray>(
        &mut self,
        source: &S,
        rows: impl Into<Selector<'r>>,
        cols: impl Into<Selector<'r>>,
        opts: &AssignOptions<'_, Self::Elem>,
    ) -> Result<()> {
        assign_array(self, Convention::Sub, source, rows.into(), cols.into(), opts)
    }

    /// Broadcast one value over the region, mask sized like the region
    fn subassign_scalar<'r, X: Element>(
        &mut self,
        value: X,
        rows: impl Into<Selector<'r>>,
        cols: impl Into<Selector<'r>>,
        opts: &AssignOptions<'_, Self::Elem>,
    ) -> Result<()> {
        assign_scalar(self, Convention::Sub, &value, rows.into(), cols.into(), opts)
    }

    /// [`subassign`](Self::subassign) from a dense host buffer, packed for the call
    fn subassign_dense<'r, X: Element>(
        &mut self,
        source: &mut DenseMatrix<X>,
        rows: impl Into<Selector<'r>>,
        cols: impl Into<Selector<'r>>,
        opts: &AssignOptions<'_, Self::Elem>,
    ) -> Result<()> {
        let packed = ShallowMatrix::<X>::pack_dense(source)?;
        self.subassign(&packed, rows, cols, opts)
    }

    /// [`subassign`](Self::subassign) from a compressed-sparse-column host buffer
    fn subassign_csc<'r, X: Element>(
        &mut self,
        source: &mut CscMatrix<X>,
        rows: impl Into<Selector<'r>>,
        cols: impl Into<Selector<'r>>,
        opts: &AssignOptions<'_, Self::Elem>,
    ) -> Result<()> {
        let packed = ShallowMatrix::<X>::pack_csc(source)?;
        self.subassign(&packed, rows, cols, opts)
    }

    /// `C<M>(I,J) = accum(C(I,J), A)` with the mask sized like `C` (`assign!`)
    fn assign<'r, S: AbstractGbArray>(
        &mut self,
        source: &S,
        rows: impl Into<Selector<'r>>,
        cols: impl Into<Selector<'r>>,
        opts: &AssignOptions<'_, Self::Elem>,
    ) -> Result<()> {
        assign_array(self, Convention::Whole, source, rows.into(), cols.into(), opts)
    }

    /// Broadcast one value over the region, mask sized like `C`
    fn assign_scalar<'r, X: Element>(
        &mut self,
        value: X,
        rows: impl Into<Selector<'r>>,
        cols: impl Into<Selector<'r>>,
        opts: &AssignOptions<'_, Self::Elem>,
    ) -> Result<()> {
        assign_scalar(self, Convention::Whole, &value, rows.into(), cols.into(), opts)
    }

    /// [`assign`](Self::assign) from a dense host buffer, packed for the call
    fn assign_dense<'r, X: Element>(
        &mut self,
        source: &mut DenseMatrix<X>,
        rows: impl Into<Selector<'r>>,
        cols: impl Into<Selector<'r>>,
        opts: &AssignOptions<'_, Self::Elem>,
    ) -> Result<()> {
        let packed = ShallowMatrix::<X>::pack_dense(source)?;
        self.assign(&packed, rows, cols, opts)
    }

    /// [`assign`](Self::assign) from a compressed-sparse-column host buffer
    fn assign_csc<'r, X: Element>(
        &mut self,
        source: &mut CscMatrix<X>,
        rows: impl Into<Selector<'r>>,
        cols: impl Into<Selector<'r>>,
        opts: &AssignOptions<'_, Self::Elem>,
    ) -> Result<()> {
        let packed = ShallowMatrix::<X>::pack_csc(source)?;
        self.assign(&packed, rows, cols, opts)
    }

    /// `C<M> = accum(C, A(I,J))` with the mask sized like `C`
    ///
    /// Selectors index the source, read transposed when the options say so.
    fn extract<'r, S: AbstractGbArray>(
        &mut self,
        source: &S,
        rows: impl Into<Selector<'r>>,
        cols: impl Into<Selector<'r>>,
        opts: &AssignOptions<'_, Self::Elem>,
    ) -> Result<()> {
        ensure_output::<Self>()?;
        let (mut nrows, mut ncols) = source.size();
        if opts.desc.transpose_input0 {
            std::mem::swap(&mut nrows, &mut ncols);
        }
        let rows = Translated::new(&rows.into(), nrows)?;
        let cols = Translated::new(&cols.into(), ncols)?;
        let operand = harmonise::<S::Elem, Self::Elem>(source.handle())?;
        self.handle_mut()?.extract(
            opts.mask,
            opts.accum,
            operand.handle(),
            rows.as_list(),
            cols.as_list(),
            &opts.desc,
        )?;
        Ok(())
    }

    /// New matrix holding `A(I,J)`, with this array's fill and order (`getindex` with ranges)
    fn slice<'r>(
        &self,
        rows: impl Into<Selector<'r>>,
        cols: impl Into<Selector<'r>>,
    ) -> Result<GbMatrix<Self::Elem, Self::Fill>> {
        let (nrows, ncols) = self.size();
        let rows = Translated::new(&rows.into(), nrows)?;
        let cols = Translated::new(&cols.into(), ncols)?;
        let mut handle = NativeMatrix::new(rows.len(nrows), cols.len(ncols))?;
        handle.set_storage_order(self.storage_order())?;
        handle.extract(
            None,
            None,
            self.handle(),
            rows.as_list(),
            cols.as_list(),
            &Descriptor::new(),
        )?;
        GbMatrix::from_parts(handle, self.fill().clone())
    }
}

impl<A: AbstractGbArray> BulkAssign for A {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::ElementAccess;
    use crate::array::GbVector;
    use crate::error::Error;

    fn diag3() -> GbMatrix<i64> {
        GbMatrix::from_triples(3, 3, &[1, 2, 3], &[1, 2, 3], &[1, 2, 3]).unwrap()
    }

    #[test]
    fn test_selector_translation() {
        let t = Translated::new(&Selector::Range(2..=3), 4).unwrap();
        assert_eq!(t.as_list(), IndexList::Range { start: 1, end: 3 });
        let t = Translated::new(&Selector::Index(4), 4).unwrap();
        assert_eq!(t.as_list(), IndexList::List(&[3]));
        assert_eq!(Translated::new(&Selector::All, 4).unwrap().len(4), 4);
        assert!(Translated::new(&Selector::List(&[0]), 4).is_err());
        assert!(Translated::new(&Selector::Range(3..=5), 4).is_err());
    }

    #[test]
    fn test_subassign_array_region() {
        let mut c = diag3();
        let a = GbMatrix::<i64>::from_triples(2, 2, &[1, 2], &[2, 1], &[7, 8]).unwrap();
        c.subassign(&a, Selector::Range(1..=2), Selector::Range(1..=2), &AssignOptions::new())
            .unwrap();
        // the region takes A's pattern exactly; (3,3) is untouched
        assert_eq!(c.findnz().unwrap(), (vec![2, 1, 3], vec![1, 2, 3], vec![8, 7, 3]));
    }

    #[test]
    fn test_subassign_scalar_with_accum() {
        let mut c = diag3();
        let plus = |a: &i64, b: &i64| a + b;
        let opts = AssignOptions::<i64>::new().accum(&plus);
        c.subassign_scalar(10, .., Selector::Index(1), &opts).unwrap();
        assert_eq!(c.get(1, 1).unwrap().into_inner(), 11);
        assert_eq!(c.get(3, 1).unwrap().into_inner(), 10);
        assert_eq!(c.get(2, 2).unwrap().into_inner(), 2);
    }

    #[test]
    fn test_assign_with_mask_sized_like_output() {
        let mut c = diag3();
        let mask = GbMatrix::<bool>::from_triples(3, 3, &[1, 3], &[1, 3], &[true, true]).unwrap();
        let opts = AssignOptions::new().mask(&mask).replace(true);
        c.assign_scalar(5, .., .., &opts).unwrap();
        assert_eq!(c.findnz().unwrap(), (vec![1, 3], vec![1, 3], vec![5, 5]));
    }

    #[test]
    fn test_subassign_mask_must_match_region() {
        let mut c = diag3();
        let mask = GbMatrix::<bool>::new(3, 3).unwrap();
        let opts = AssignOptions::new().mask(&mask);
        let err = c
            .subassign_scalar(1, Selector::Range(1..=2), Selector::Range(1..=2), &opts)
            .unwrap_err();
        assert!(err.is_dimension_mismatch());
    }

    #[test]
    fn test_type_harmonisation() {
        let mut c = GbMatrix::<f64>::new(2, 2).unwrap();
        let a = GbMatrix::<i32>::from_triples(2, 2, &[1], &[2], &[3]).unwrap();
        c.subassign(&a, .., .., &AssignOptions::new()).unwrap();
        assert_eq!(c.get(1, 2).unwrap().into_inner(), 3.0);

        let mut narrow = GbMatrix::<u8>::new(2, 2).unwrap();
        let wide = GbMatrix::<i64>::from_triples(2, 2, &[1], &[1], &[-1]).unwrap();
        let err = narrow.subassign(&wide, .., .., &AssignOptions::new()).unwrap_err();
        assert!(matches!(err, Error::Conversion { .. }));
    }

    #[test]
    fn test_vector_into_row_region_restores_shape() {
        let mut c = GbMatrix::<i64>::new(3, 3).unwrap();
        let v = GbVector::<i64>::from_vec(vec![1, 2, 3]).unwrap();
        c.subassign(&v, Selector::Index(2), .., &AssignOptions::new()).unwrap();
        assert_eq!(c.get(2, 3).unwrap().into_inner(), 3);
        assert_eq!(v.size(), (3, 1));

        // a failing call restores the shape as well
        let bad = AssignOptions::new().mask(&c);
        let mut d = GbMatrix::<i64>::new(3, 3).unwrap();
        assert!(d.subassign(&v, Selector::Index(1), .., &bad).is_err());
        assert_eq!(v.size(), (3, 1));
    }

    #[test]
    fn test_host_sources() {
        let mut c = GbMatrix::<f64>::new(3, 3).unwrap();
        let mut dense = DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let opts = AssignOptions::new();
        c.assign_dense(&mut dense, Selector::Range(2..=3), Selector::Range(2..=3), &opts)
            .unwrap();
        assert_eq!(c.get(3, 2).unwrap().into_inner(), 3.0);
        assert_eq!(dense.values(), &[1.0, 3.0, 2.0, 4.0]);

        let mut csc = CscMatrix::from_parts(2, 1, vec![1, 2], vec![2], vec![9i64]).unwrap();
        c.subassign_csc(&mut csc, Selector::Range(1..=2), Selector::Index(1), &AssignOptions::new())
            .unwrap();
        assert_eq!(c.get(2, 1).unwrap().into_inner(), 9.0);
        assert!(!c.is_stored(1, 1).unwrap());
        assert_eq!(csc.rowval(), &[2]);
    }

    #[test]
    fn test_shallow_destination_is_read_only() {
        let mut values = vec![1i64, 2];
        let mut s = crate::array::ShallowVector::<i64>::pack(&mut values).unwrap();
        let err = s.subassign_scalar(0, .., .., &AssignOptions::new()).unwrap_err();
        assert_eq!(err, Error::ReadOnly);
    }

    #[test]
    fn test_extract_and_slice() {
        let a = diag3();
        let mut c = GbMatrix::<i64>::new(2, 2).unwrap();
        c.extract(&a, Selector::List(&[3, 1]), Selector::List(&[3, 1]), &AssignOptions::new())
            .unwrap();
        assert_eq!(c.get(1, 1).unwrap().into_inner(), 3);
        assert_eq!(c.get(2, 2).unwrap().into_inner(), 1);

        let s = a.slice(Selector::Range(2..=3), ..).unwrap();
        assert_eq!(s.size(), (2, 3));
        assert_eq!(s.get(1, 2).unwrap().into_inner(), 2);
    }
}
