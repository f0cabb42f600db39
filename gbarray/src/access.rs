//! Single-element access and bulk build
//!
//! All coordinates are 1-based. Reads of unstored positions resolve to the
//! array's fill; every other engine status is an error.

use crate::array::{AbstractGbArray, Entry, VectorKind};
use crate::error::{Error, Result};
use gbarray_core::{increment, Dup, Element, EngineMatrix, ErrorCategory, Index};

/// Translate one 1-based coordinate along a dimension of length `size`
pub(crate) fn coord(index: Index, size: Index) -> Result<Index> {
    if index == 0 || index > size {
        return Err(Error::IndexOutOfBounds { index, size });
    }
    Ok(index - 1)
}

/// Translated copy of a 1-based coordinate list; the caller's list is untouched
pub(crate) fn coords(indices: &[Index], size: Index) -> Result<Vec<Index>> {
    indices.iter().map(|&i| coord(i, size)).collect()
}

/// Convert between element types, failing on inexact narrowing
pub(crate) fn cast_value<X: Element, T: Element>(value: &X) -> Result<T> {
    T::cast_from(value).ok_or_else(|| Error::conversion(X::DATA_TYPE, T::DATA_TYPE))
}

pub(crate) fn ensure_output<A: AbstractGbArray>() -> Result<()> {
    if A::CAN_BE_OUTPUT {
        Ok(())
    } else {
        Err(Error::ReadOnly)
    }
}

/// Element-level operations, available on every array kind
pub trait ElementAccess: AbstractGbArray {
    /// Value at `(row, col)`, or the fill when unstored (`getindex`)
    fn get(&self, row: Index, col: Index) -> Result<Entry<Self::Elem, Self::Fill>> {
        let (nrows, ncols) = self.size();
        let (i, j) = (coord(row, nrows)?, coord(col, ncols)?);
        match self.handle().extract_element(i, j) {
            Ok(v) => Ok(Entry::Stored(v)),
            Err(info) if info.category() == ErrorCategory::Absent => {
                Ok(Entry::Fill(self.fill().clone()))
            }
            Err(info) => Err(info.into()),
        }
    }

    /// Store `value` at `(row, col)`, converting it to the stored type (`setindex!`)
    fn set<X: Element>(&mut self, value: X, row: Index, col: Index) -> Result<()> {
        let (nrows, ncols) = self.size();
        let handle = self.handle_mut()?;
        let (i, j) = (coord(row, nrows)?, coord(col, ncols)?);
        handle.set_element(cast_value(&value)?, i, j)?;
        Ok(())
    }

    /// Remove the entry at `(row, col)`; removing an unstored entry is a no-op (`deleteat!`)
    fn delete(&mut self, row: Index, col: Index) -> Result<()> {
        let (nrows, ncols) = self.size();
        let handle = self.handle_mut()?;
        handle.remove_element(coord(row, nrows)?, coord(col, ncols)?)?;
        Ok(())
    }

    /// Whether `(row, col)` holds a stored entry, whatever its value (`isstored`)
    fn is_stored(&self, row: Index, col: Index) -> Result<bool> {
        Ok(self.get(row, col)?.is_stored())
    }

    /// Populate an empty array from 1-based triples (`build!`)
    ///
    /// Duplicate coordinates are merged with `dup`.
    fn build(
        &mut self,
        rows: &[Index],
        cols: &[Index],
        values: &[Self::Elem],
        dup: Dup<Self::Elem>,
    ) -> Result<()> {
        ensure_output::<Self>()?;
        let nnz = self.nnz()?;
        if nnz != 0 {
            return Err(Error::OutputNotEmpty { nnz });
        }
        check_lengths(rows.len(), cols.len(), values.len())?;
        let (nrows, ncols) = self.size();
        let (rows, cols) = (coords(rows, nrows)?, coords(cols, ncols)?);
        log::debug!("building {} entries", values.len());
        self.handle_mut()?.build(&rows, &cols, values, &dup)?;
        Ok(())
    }

    /// Populate an empty array with one value at every listed coordinate
    ///
    /// Duplicated coordinates hold the value once; no combiner is applied.
    fn build_scalar(&mut self, rows: &[Index], cols: &[Index], value: Self::Elem) -> Result<()> {
        ensure_output::<Self>()?;
        let nnz = self.nnz()?;
        if nnz != 0 {
            return Err(Error::OutputNotEmpty { nnz });
        }
        check_lengths(rows.len(), cols.len(), cols.len())?;
        let (nrows, ncols) = self.size();
        let (rows, cols) = (coords(rows, nrows)?, coords(cols, ncols)?);
        self.handle_mut()?.build_scalar(&rows, &cols, &value)?;
        Ok(())
    }

    /// 1-based `(rows, cols, values)` of every stored entry, in storage order
    fn findnz(&self) -> Result<(Vec<Index>, Vec<Index>, Vec<Self::Elem>)> {
        let handle = self.handle();
        handle.wait()?;
        let (mut rows, mut cols, values) = handle.extract_tuples()?;
        increment(&mut rows);
        increment(&mut cols);
        Ok((rows, cols, values))
    }

    /// Stored values in storage order
    fn nonzeros(&self) -> Result<Vec<Self::Elem>> {
        Ok(self.findnz()?.2)
    }

    /// 1-based coordinates of stored entries in storage order
    fn nonzeroinds(&self) -> Result<(Vec<Index>, Vec<Index>)> {
        let (rows, cols, _) = self.findnz()?;
        Ok((rows, cols))
    }

    /// Exact stored-entry count
    fn nnz(&self) -> Result<Index> {
        let handle = self.handle();
        handle.wait()?;
        Ok(handle.nvals()?)
    }

    /// Drop every stored entry (`empty!`)
    fn clear(&mut self) -> Result<()> {
        self.handle_mut()?.clear()?;
        Ok(())
    }
}

impl<A: AbstractGbArray> ElementAccess for A {}

fn check_lengths(rows: usize, cols: usize, values: usize) -> Result<()> {
    if cols != rows {
        return Err(Error::LengthMismatch {
            what: "column indices",
            expected: rows,
            got: cols,
        });
    }
    if values != rows {
        return Err(Error::LengthMismatch {
            what: "values",
            expected: rows,
            got: values,
        });
    }
    Ok(())
}

/// Rank-1 access for vector kinds
pub trait VectorAccess: VectorKind + ElementAccess {
    /// Value at position `i`, or the fill
    fn get_at(&self, i: Index) -> Result<Entry<Self::Elem, Self::Fill>> {
        self.get(i, 1)
    }

    /// Store `value` at position `i`
    fn set_at<X: Element>(&mut self, value: X, i: Index) -> Result<()> {
        self.set(value, i, 1)
    }

    /// Remove the entry at position `i`
    fn delete_at(&mut self, i: Index) -> Result<()> {
        self.delete(i, 1)
    }

    /// Whether position `i` is stored
    fn is_stored_at(&self, i: Index) -> Result<bool> {
        self.is_stored(i, 1)
    }

    /// Populate an empty vector from 1-based `(index, value)` pairs
    fn build_at(
        &mut self,
        indices: &[Index],
        values: &[Self::Elem],
        dup: Dup<Self::Elem>,
    ) -> Result<()> {
        let cols = vec![1; indices.len()];
        self.build(indices, &cols, values, dup)
    }

    /// 1-based indices and values of every stored entry
    fn findnz_at(&self) -> Result<(Vec<Index>, Vec<Self::Elem>)> {
        let (rows, _, values) = self.findnz()?;
        Ok((rows, values))
    }
}

impl<A: VectorKind> VectorAccess for A {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{GbMatrix, GbVector};
    use gbarray_core::Nothing;

    #[test]
    fn test_unstored_reads_fill() {
        let mut m = GbMatrix::<i64>::with_fill(3, 3, -1).unwrap();
        m.set(4, 2, 2).unwrap();
        assert_eq!(m.get(2, 2).unwrap(), Entry::Stored(4));
        assert_eq!(m.get(1, 3).unwrap(), Entry::Fill(-1));
        assert!(!m.is_stored(1, 3).unwrap());

        let n = GbMatrix::<i64, Nothing>::new(2, 2).unwrap();
        assert_eq!(n.get(1, 1).unwrap(), Entry::Fill(Nothing));
    }

    #[test]
    fn test_stored_zero_is_stored() {
        let mut m = GbMatrix::<f64>::new(2, 2).unwrap();
        m.set(0.0, 1, 1).unwrap();
        assert!(m.is_stored(1, 1).unwrap());
        assert_eq!(m.nnz().unwrap(), 1);
    }

    #[test]
    fn test_set_converts_or_fails() {
        let mut m = GbMatrix::<u8>::new(2, 2).unwrap();
        m.set(7i64, 1, 1).unwrap();
        assert_eq!(m.get(1, 1).unwrap().into_inner(), 7);
        assert!(matches!(m.set(300i64, 1, 2), Err(Error::Conversion { .. })));
        assert!(matches!(m.set(1.5f64, 1, 2), Err(Error::Conversion { .. })));

        let mut f = GbMatrix::<f32>::new(2, 2).unwrap();
        assert!(matches!(f.set(1e300f64, 1, 1), Err(Error::Conversion { .. })));
        f.set(0.25f64, 1, 1).unwrap();
        assert_eq!(f.nnz().unwrap(), 1);
        let mut d = GbMatrix::<f64>::new(1, 1).unwrap();
        assert!(matches!(d.set(u64::MAX, 1, 1), Err(Error::Conversion { .. })));
        assert_eq!(d.nnz().unwrap(), 0);
    }

    #[test]
    fn test_index_zero_rejected() {
        let m = GbMatrix::<i64>::new(2, 2).unwrap();
        assert_eq!(m.get(0, 1), Err(Error::IndexOutOfBounds { index: 0, size: 2 }));
        assert_eq!(m.get(1, 3), Err(Error::IndexOutOfBounds { index: 3, size: 2 }));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut m = GbMatrix::<i64>::from_triples(2, 2, &[1, 2], &[1, 2], &[5, 6]).unwrap();
        m.delete(1, 1).unwrap();
        m.delete(1, 1).unwrap();
        assert_eq!(m.nnz().unwrap(), 1);
        assert_eq!(m.get(2, 2).unwrap().into_inner(), 6);
    }

    #[test]
    fn test_build_errors() {
        let mut m = GbMatrix::<i64>::from_triples(2, 2, &[1], &[1], &[1]).unwrap();
        assert_eq!(m.build(&[2], &[2], &[1], Dup::Plus), Err(Error::OutputNotEmpty { nnz: 1 }));

        let mut m = GbMatrix::<i64>::new(2, 2).unwrap();
        let err = m.build(&[1, 2], &[1], &[1, 1], Dup::Plus).unwrap_err();
        assert!(err.is_dimension_mismatch());
        assert_eq!(m.nnz().unwrap(), 0);
    }

    #[test]
    fn test_build_combines_duplicates() {
        let mut m = GbMatrix::<i64>::new(2, 2).unwrap();
        m.build(&[1, 1], &[1, 1], &[2, 3], Dup::Plus).unwrap();
        assert_eq!(m.get(1, 1).unwrap().into_inner(), 5);

        let mut m = GbMatrix::<i64>::new(2, 2).unwrap();
        m.build(&[1, 1], &[1, 1], &[2, 3], Dup::with(|a: &i64, b: &i64| *a.max(b))).unwrap();
        assert_eq!(m.get(1, 1).unwrap().into_inner(), 3);
    }

    #[test]
    fn test_build_scalar_stores_duplicates_once() {
        let mut m = GbMatrix::<i64>::new(3, 3).unwrap();
        m.build_scalar(&[1, 1, 1, 3], &[2, 2, 2, 3], 9).unwrap();
        assert_eq!(m.nnz().unwrap(), 2);
        // no combiner runs: the value is not summed over the duplicates
        assert_eq!(m.get(1, 2).unwrap().into_inner(), 9);
        assert_eq!(m.findnz().unwrap(), (vec![1, 3], vec![2, 3], vec![9, 9]));
    }

    #[test]
    fn test_findnz_settles_pending_writes() {
        let mut m = GbMatrix::<i64>::new(3, 3).unwrap();
        m.set(1, 3, 1).unwrap();
        m.set(2, 1, 2).unwrap();
        m.set(3, 3, 1).unwrap();
        assert_eq!(m.findnz().unwrap(), (vec![3, 1], vec![1, 2], vec![3, 2]));
        assert_eq!(m.nnz().unwrap(), 2);
    }

    #[test]
    fn test_vector_access() {
        let mut v = GbVector::<f64>::new(4).unwrap();
        v.build_at(&[4, 2], &[1.5, 2.5], Dup::Plus).unwrap();
        assert_eq!(v.findnz_at().unwrap(), (vec![2, 4], vec![2.5, 1.5]));
        v.set_at(1.0, 1).unwrap();
        v.delete_at(4).unwrap();
        assert!(v.is_stored_at(1).unwrap());
        assert_eq!(v.get_at(4).unwrap(), Entry::Fill(0.0));
    }
}
