//! Shape-changing operations, triangular selection and equality

use crate::access::ensure_output;
use crate::array::{AbstractGbArray, GbMatrix, GbVector, OwningArray, VectorKind};
use crate::error::{Error, Result};
use crate::native::NativeMatrix;
use gbarray_core::{
    infer_dims, Element, EngineMatrix, Fill, Index, OrderKind, SelectOp, StorageOrder,
};
use rayon::prelude::*;

/// Structural operations, available on every array kind
pub trait Structural: AbstractGbArray {
    /// Reshape in place (`reshape!`)
    ///
    /// At most one dimension may be `None`; it is inferred from the length.
    /// `by_col` selects the linear order in which positions are renumbered.
    fn reshape_in_place(
        &mut self,
        nrows: Option<Index>,
        ncols: Option<Index>,
        by_col: bool,
    ) -> Result<()>
    where
        Self: OwningArray,
    {
        let (nrows, ncols) = resolve_dims(self.length()?, nrows, ncols)?;
        ensure_vector_shape::<Self>(nrows, ncols)?;
        self.handle_mut()?.reshape(nrows, ncols, by_col)?;
        Ok(())
    }

    /// Reshaped copy of the same kind (`reshape`)
    fn reshaped(&self, nrows: Option<Index>, ncols: Option<Index>, by_col: bool) -> Result<Self>
    where
        Self: OwningArray,
    {
        let (nrows, ncols) = resolve_dims(self.length()?, nrows, ncols)?;
        let handle = self.handle().reshape_dup(nrows, ncols, by_col)?;
        Self::from_parts(handle, self.fill().clone())
    }

    /// Change dimensions in place (`resize!`)
    ///
    /// Entries outside the new bounds are dropped; new positions are unstored.
    fn resize(&mut self, nrows: Index, ncols: Index) -> Result<()> {
        ensure_output::<Self>()?;
        ensure_vector_shape::<Self>(nrows, ncols)?;
        self.handle_mut()?.resize(nrows, ncols)?;
        Ok(())
    }

    /// The `k`-th diagonal as a vector; `k > 0` is above the main diagonal
    fn diag(&self, k: i64) -> Result<GbVector<Self::Elem, Self::Fill>> {
        GbVector::from_parts(self.handle().extract_diag(k)?, self.fill().clone())
    }

    /// Entries on or below the `k`-th diagonal
    fn tril(&self, k: i64) -> Result<GbMatrix<Self::Elem, Self::Fill>> {
        select(self, SelectOp::Tril, k)
    }

    /// Entries on or above the `k`-th diagonal
    fn triu(&self, k: i64) -> Result<GbMatrix<Self::Elem, Self::Fill>> {
        select(self, SelectOp::Triu, k)
    }

    /// Entries off the `k`-th diagonal
    fn offdiag(&self, k: i64) -> Result<GbMatrix<Self::Elem, Self::Fill>> {
        select(self, SelectOp::OffDiag, k)
    }

    /// Deep copy with independent storage
    fn dup(&self) -> Result<Self>
    where
        Self: OwningArray,
    {
        Self::from_parts(self.handle().dup()?, self.fill().clone())
    }

    /// Empty owning matrix of another stored type, keeping fill and order (`similar`)
    fn similar<U: Element>(&self, nrows: Index, ncols: Index) -> Result<GbMatrix<U, Self::Fill>> {
        let mut m = GbMatrix::with_fill(nrows, ncols, self.fill().clone())?;
        m.set_storage_order(self.storage_order())?;
        Ok(m)
    }

    /// Value equality with another array of the same element and fill types
    fn is_equal<B>(&self, other: &B) -> Result<bool>
    where
        B: AbstractGbArray<Elem = Self::Elem, Fill = Self::Fill>,
    {
        arrays_equal(self, other)
    }
}

impl<A: AbstractGbArray> Structural for A {}

fn resolve_dims(
    total: Index,
    nrows: Option<Index>,
    ncols: Option<Index>,
) -> Result<(Index, Index)> {
    if nrows.is_none() && ncols.is_none() {
        return Err(Error::BothDimensionsInferred);
    }
    Ok(infer_dims(total, nrows, ncols)?)
}

fn ensure_vector_shape<A: AbstractGbArray>(nrows: Index, ncols: Index) -> Result<()> {
    if A::IS_VECTOR && ncols != 1 {
        return Err(Error::DimensionMismatch {
            expected: (nrows, 1),
            got: (nrows, ncols),
        });
    }
    Ok(())
}

fn select<A: AbstractGbArray>(a: &A, op: SelectOp, k: i64) -> Result<GbMatrix<A::Elem, A::Fill>> {
    GbMatrix::from_parts(a.handle().select(op, k)?, a.fill().clone())
}

/// Stored triples sorted by `(col, row)`, whatever the storage order
fn column_sorted<T: Element>(handle: &NativeMatrix<T>) -> Result<Vec<(Index, Index, T)>> {
    handle.wait()?;
    let by_col = handle.storage_order() == StorageOrder::ByCol;
    let (rows, cols, values) = handle.extract_tuples()?;
    let mut tuples: Vec<_> = rows
        .into_iter()
        .zip(cols)
        .zip(values)
        .map(|((i, j), v)| (i, j, v))
        .collect();
    if !by_col {
        tuples.par_sort_unstable_by_key(|&(i, j, _)| (j, i));
    }
    Ok(tuples)
}

/// Identity, then dimensions, fill, stored count, and finally stored
/// patterns and values
pub(crate) fn arrays_equal<A, B>(a: &A, b: &B) -> Result<bool>
where
    A: AbstractGbArray,
    B: AbstractGbArray<Elem = A::Elem, Fill = A::Fill>,
{
    if std::ptr::eq(a.handle(), b.handle()) {
        return Ok(true);
    }
    if a.size() != b.size() || a.fill() != b.fill() {
        return Ok(false);
    }
    let (ha, hb) = (a.handle(), b.handle());
    ha.wait()?;
    hb.wait()?;
    if ha.nvals()? != hb.nvals()? {
        return Ok(false);
    }
    if ha.storage_order() != hb.storage_order() {
        let (ta, tb) = (column_sorted(ha)?, column_sorted(hb)?);
        return Ok(ta.par_iter().zip(tb.par_iter()).all(|(x, y)| x == y));
    }
    let (ra, ca, va) = ha.extract_tuples()?;
    let (rb, cb, vb) = hb.extract_tuples()?;
    if ra != rb || ca != cb {
        return Ok(false);
    }
    Ok(va.par_iter().zip(vb.par_iter()).all(|(x, y)| x == y))
}

fn equal_or_log<A, B>(a: &A, b: &B) -> bool
where
    A: AbstractGbArray,
    B: AbstractGbArray<Elem = A::Elem, Fill = A::Fill>,
{
    arrays_equal(a, b).unwrap_or_else(|err| {
        log::error!("equality check failed: {err}");
        false
    })
}

impl<T, F, O, P> PartialEq<GbMatrix<T, F, P>> for GbMatrix<T, F, O>
where
    T: Element,
    F: Fill,
    O: OrderKind,
    P: OrderKind,
{
    fn eq(&self, other: &GbMatrix<T, F, P>) -> bool {
        equal_or_log(self, other)
    }
}

impl<T: Element, F: Fill> PartialEq for GbVector<T, F> {
    fn eq(&self, other: &Self) -> bool {
        equal_or_log(self, other)
    }
}

impl<T: Element, F: Fill> GbMatrix<T, F> {
    /// Square matrix whose `k`-th diagonal holds the entries of `v`
    ///
    /// The side is `length(v) + |k|`; the fill is taken from `v`.
    pub fn from_diag<V>(v: &V, k: i64) -> Result<Self>
    where
        V: VectorKind<Elem = T, Fill = F>,
    {
        let handle = NativeMatrix::from_diag(v.handle(), k)?;
        Self::from_parts(handle, v.fill().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{ElementAccess, VectorAccess};
    use crate::array::GbMatrixR;
    use gbarray_core::Nothing;

    fn sample() -> GbMatrix<i64> {
        // [1 0 2; 0 3 0]
        GbMatrix::from_triples(2, 3, &[1, 1, 2], &[1, 3, 2], &[1, 2, 3]).unwrap()
    }

    #[test]
    fn test_reshape_in_place_keeps_column_order() {
        let mut m = sample();
        m.reshape_in_place(Some(3), None, true).unwrap();
        assert_eq!(m.size(), (3, 2));
        // column-major positions 0, 3, 4 of the original
        assert_eq!(m.findnz().unwrap(), (vec![1, 1, 2], vec![1, 2, 2], vec![1, 3, 2]));

        m.reshape_in_place(None, Some(3), true).unwrap();
        assert!(m.is_equal(&sample()).unwrap());
    }

    #[test]
    fn test_reshape_in_place_reuses_storage() {
        let dense = crate::host::DenseMatrix::from_rows(&[vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        let mut m = GbMatrix::<i32>::from_dense(dense).unwrap();
        let buffer = |m: &GbMatrix<i32>| match &m.handle().read().entries {
            crate::native::Entries::Full(values) => values.as_ptr(),
            _ => panic!("expected full storage"),
        };
        let before = buffer(&m);
        m.reshape_in_place(Some(3), None, true).unwrap();
        assert_eq!(m.size(), (3, 2));
        assert_eq!(buffer(&m), before);
        assert_eq!(m.get(2, 2).unwrap().into_inner(), 3);
    }

    #[test]
    fn test_reshape_errors() {
        let mut m = sample();
        assert_eq!(m.reshape_in_place(None, None, true), Err(Error::BothDimensionsInferred));
        assert!(m.reshape_in_place(Some(4), None, true).is_err());
        assert!(m.reshaped(Some(4), Some(2), true).unwrap_err().is_dimension_mismatch());
        assert_eq!(m.size(), (2, 3));

        let mut v = GbVector::<i64>::from_pairs(4, &[2], &[7]).unwrap();
        assert!(v.reshape_in_place(Some(2), None, true).unwrap_err().is_dimension_mismatch());
        assert_eq!(v.size(), (4, 1));
    }

    #[test]
    fn test_reshaped_copy_by_row() {
        let m = sample();
        let r = m.reshaped(Some(6), Some(1), false).unwrap();
        assert_eq!(r.findnz().unwrap(), (vec![1, 3, 5], vec![1, 1, 1], vec![1, 2, 3]));
        assert_eq!(m.size(), (2, 3));
    }

    #[test]
    fn test_resize() {
        let mut m = sample();
        m.resize(2, 2).unwrap();
        assert_eq!(m.nnz().unwrap(), 2);
        m.resize(4, 4).unwrap();
        assert_eq!(m.nnz().unwrap(), 2);
        assert!(!m.is_stored(4, 4).unwrap());

        let mut v = GbVector::<i64>::from_pairs(3, &[3], &[1]).unwrap();
        assert!(v.resize(3, 2).unwrap_err().is_dimension_mismatch());
        v.resize(2, 1).unwrap();
        assert_eq!(v.nnz().unwrap(), 0);
    }

    #[test]
    fn test_diag_round_trip() {
        let m = sample();
        let d = m.diag(0).unwrap();
        assert_eq!(d.findnz_at().unwrap(), (vec![1, 2], vec![1, 3]));
        let above = m.diag(2).unwrap();
        assert_eq!(above.length().unwrap(), 1);
        assert_eq!(above.get_at(1).unwrap().into_inner(), 2);
        assert_eq!(m.diag(-2).unwrap().length().unwrap(), 0);

        let back = GbMatrix::from_diag(&d, 1).unwrap();
        assert_eq!(back.size(), (3, 3));
        assert_eq!(back.findnz().unwrap(), (vec![1, 2], vec![2, 3], vec![1, 3]));
    }

    #[test]
    fn test_triangular_selection() {
        let full = GbMatrix::<i32>::from_dense(
            crate::host::DenseMatrix::from_rows(&[vec![1, 2], vec![3, 4]]).unwrap(),
        )
        .unwrap();
        assert_eq!(full.tril(0).unwrap().nonzeros().unwrap(), vec![1, 3, 4]);
        assert_eq!(full.triu(1).unwrap().nonzeros().unwrap(), vec![2]);
        assert_eq!(full.offdiag(0).unwrap().nonzeros().unwrap(), vec![3, 2]);
    }

    #[test]
    fn test_dup_and_similar() {
        let m = sample();
        let mut copy = m.dup().unwrap();
        copy.set(9, 1, 1).unwrap();
        assert_eq!(m.get(1, 1).unwrap().into_inner(), 1);

        let r = GbMatrixR::<i64, Nothing>::new(2, 2).unwrap();
        let s = r.similar::<f32>(4, 5).unwrap();
        assert_eq!(s.size(), (4, 5));
        assert_eq!(s.storage_order(), StorageOrder::ByRow);
        assert_eq!(*s.fill(), Nothing);
    }

    #[test]
    fn test_equality_rules() {
        let a = sample();
        assert!(a.is_equal(&a).unwrap());
        let mut b = sample();
        assert!(a == b);

        b.set(5, 1, 1).unwrap();
        assert!(a != b);

        let c = sample().refill(0i64);
        let d = sample();
        assert!(c == d);
        let mut e = sample();
        e.set_fill(1);
        assert!(a != e);

        // an explicit zero is an extra stored entry
        let mut f = sample();
        f.set(0, 2, 1).unwrap();
        assert!(a != f);
    }

    #[test]
    fn test_equality_across_orders() {
        let a = sample();
        let mut r = GbMatrixR::<i64>::new(2, 3).unwrap();
        r.build(&[2, 1, 1], &[2, 3, 1], &[3, 2, 1], gbarray_core::Dup::Plus).unwrap();
        assert!(a == r);
    }
}
