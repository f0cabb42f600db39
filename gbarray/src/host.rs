//! Host-side array representations
//!
//! Plain owned buffers that arrays are packed from and unpacked into. Both
//! follow the conventions of column-major numerical hosts: dense storage is
//! column-major and compressed-sparse-column indices are 1-based.

use crate::error::{Error, Result};

/// Column-major dense matrix
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "RawDense<T>", bound(deserialize = "T: serde::Deserialize<'de>"))
)]
pub struct DenseMatrix<T> {
    nrows: usize,
    ncols: usize,
    values: Vec<T>,
}

impl<T> DenseMatrix<T> {
    /// Wrap a column-major buffer
    pub fn from_col_major(nrows: usize, ncols: usize, values: Vec<T>) -> Result<Self> {
        let expected = nrows.checked_mul(ncols).ok_or(Error::InvalidArgument {
            arg: "nrows",
            reason: "nrows * ncols overflows".into(),
        })?;
        if values.len() != expected {
            return Err(Error::LengthMismatch {
                what: "dense values",
                expected,
                got: values.len(),
            });
        }
        Ok(Self { nrows, ncols, values })
    }

    /// Build from rows given in row-major order
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self>
    where
        T: Clone,
    {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
            return Err(Error::LengthMismatch {
                what: "dense row",
                expected: ncols,
                got: bad.len(),
            });
        }
        let mut values = Vec::with_capacity(nrows * ncols);
        for j in 0..ncols {
            values.extend(rows.iter().map(|r| r[j].clone()));
        }
        Ok(Self { nrows, ncols, values })
    }

    /// A column vector
    pub fn column(values: Vec<T>) -> Self {
        Self {
            nrows: values.len(),
            ncols: 1,
            values,
        }
    }

    /// `(nrows, ncols)`
    pub const fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Column-major values
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Mutable column-major values
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Element at 1-based `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row == 0 || col == 0 || row > self.nrows || col > self.ncols {
            return None;
        }
        self.values.get((row - 1) + (col - 1) * self.nrows)
    }

    /// Consume into the column-major buffer
    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    pub(crate) fn take_values(&mut self) -> Vec<T> {
        std::mem::take(&mut self.values)
    }

    pub(crate) fn restore_values(&mut self, values: Vec<T>) {
        self.values = values;
    }
}

/// Compressed-sparse-column matrix with 1-based `colptr` and `rowval`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "RawCsc<T>", bound(deserialize = "T: serde::Deserialize<'de>"))
)]
pub struct CscMatrix<T> {
    pub(crate) nrows: usize,
    pub(crate) ncols: usize,
    pub(crate) colptr: Vec<u64>,
    pub(crate) rowval: Vec<u64>,
    pub(crate) nzval: Vec<T>,
}

impl<T> CscMatrix<T> {
    /// Validate and wrap 1-based compressed-sparse-column buffers
    pub fn from_parts(
        nrows: usize,
        ncols: usize,
        colptr: Vec<u64>,
        rowval: Vec<u64>,
        nzval: Vec<T>,
    ) -> Result<Self> {
        let csc = Self {
            nrows,
            ncols,
            colptr,
            rowval,
            nzval,
        };
        csc.validate()?;
        Ok(csc)
    }

    /// Empty `nrows × ncols` matrix
    pub fn empty(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            colptr: vec![1; ncols + 1],
            rowval: Vec::new(),
            nzval: Vec::new(),
        }
    }

    /// Check the structural invariants
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidArgument {
            arg: "csc",
            reason: reason.into(),
        };
        if self.colptr.len() != self.ncols + 1 {
            return Err(Error::LengthMismatch {
                what: "colptr",
                expected: self.ncols + 1,
                got: self.colptr.len(),
            });
        }
        if self.rowval.len() != self.nzval.len() {
            return Err(Error::LengthMismatch {
                what: "rowval",
                expected: self.nzval.len(),
                got: self.rowval.len(),
            });
        }
        if self.colptr.first().copied() != Some(1) {
            return Err(invalid("colptr must start at 1"));
        }
        if self.colptr.last().copied() != Some(self.nzval.len() as u64 + 1) {
            return Err(invalid("colptr last element must equal nnz + 1"));
        }
        if self.colptr.windows(2).any(|w| w[1] < w[0]) {
            return Err(invalid("colptr must be non-decreasing"));
        }
        for window in self.colptr.windows(2) {
            let (start, end) = (window[0], window[1]);
            let column = &self.rowval[(start - 1) as usize..(end - 1) as usize];
            let mut prev = 0u64;
            for &row in column {
                if row == 0 || row > self.nrows as u64 {
                    return Err(invalid("row index out of bounds"));
                }
                if row <= prev {
                    return Err(invalid(
                        "row indices must be strictly increasing within each column",
                    ));
                }
                prev = row;
            }
        }
        Ok(())
    }

    /// `(nrows, ncols)`
    pub const fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Stored entry count
    pub fn nnz(&self) -> usize {
        self.nzval.len()
    }

    /// 1-based column pointers
    pub fn colptr(&self) -> &[u64] {
        &self.colptr
    }

    /// 1-based row indices
    pub fn rowval(&self) -> &[u64] {
        &self.rowval
    }

    /// Stored values
    pub fn nzval(&self) -> &[T] {
        &self.nzval
    }

    /// Mutable stored values; the pattern stays fixed
    pub fn nzval_mut(&mut self) -> &mut [T] {
        &mut self.nzval
    }

    /// Stored value at 1-based `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if col == 0 || col > self.ncols {
            return None;
        }
        let start = (self.colptr[col - 1] - 1) as usize;
        let end = (self.colptr[col] - 1) as usize;
        self.rowval[start..end]
            .binary_search(&(row as u64))
            .ok()
            .map(|k| &self.nzval[start + k])
    }

    /// Consume into `(colptr, rowval, nzval)`
    pub fn into_parts(self) -> (Vec<u64>, Vec<u64>, Vec<T>) {
        (self.colptr, self.rowval, self.nzval)
    }
}

/// Unchecked wire form; deserialising goes through the validating constructors
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawDense<T> {
    nrows: usize,
    ncols: usize,
    values: Vec<T>,
}

#[cfg(feature = "serde")]
impl<T> TryFrom<RawDense<T>> for DenseMatrix<T> {
    type Error = Error;

    fn try_from(raw: RawDense<T>) -> Result<Self> {
        Self::from_col_major(raw.nrows, raw.ncols, raw.values)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawCsc<T> {
    nrows: usize,
    ncols: usize,
    colptr: Vec<u64>,
    rowval: Vec<u64>,
    nzval: Vec<T>,
}

#[cfg(feature = "serde")]
impl<T> TryFrom<RawCsc<T>> for CscMatrix<T> {
    type Error = Error;

    fn try_from(raw: RawCsc<T>) -> Result<Self> {
        Self::from_parts(raw.nrows, raw.ncols, raw.colptr, raw.rowval, raw.nzval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_layout() {
        let dense = DenseMatrix::from_rows(&[vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(dense.shape(), (2, 3));
        assert_eq!(dense.values(), &[1, 4, 2, 5, 3, 6]);
        assert_eq!(dense.get(2, 3), Some(&6));
        assert_eq!(dense.get(0, 1), None);
        assert!(DenseMatrix::from_col_major(2, 2, vec![1]).unwrap_err().is_dimension_mismatch());
    }

    #[test]
    fn test_csc_validation() {
        let csc = CscMatrix::from_parts(3, 2, vec![1, 3, 4], vec![1, 3, 2], vec![1.0, 2.0, 3.0])
            .unwrap();
        assert_eq!(csc.nnz(), 3);
        assert_eq!(csc.get(3, 1), Some(&2.0));
        assert_eq!(csc.get(1, 2), None);

        let err = CscMatrix::from_parts(3, 1, vec![0, 1], vec![1], vec![1]).unwrap_err();
        assert!(err.to_string().contains("start at 1"));
        let err = CscMatrix::from_parts(3, 1, vec![1, 3], vec![2, 2], vec![1, 1]).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
        let err = CscMatrix::from_parts(2, 1, vec![1, 2], vec![3], vec![1]).unwrap_err();
        assert!(err.to_string().contains("out of bounds"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates() {
        let csc = CscMatrix::from_parts(2, 1, vec![1, 2], vec![2], vec![5i32]).unwrap();
        let json = serde_json::to_string(&csc).unwrap();
        let back: CscMatrix<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, csc);

        let bad = r#"{"nrows":2,"ncols":1,"colptr":[1,9],"rowval":[2],"nzval":[5]}"#;
        let err = serde_json::from_str::<CscMatrix<i32>>(bad).unwrap_err();
        assert!(err.to_string().contains("nnz + 1"));

        let dense = DenseMatrix::from_rows(&[vec![1, 2], vec![3, 4]]).unwrap();
        let json = serde_json::to_string(&dense).unwrap();
        assert_eq!(serde_json::from_str::<DenseMatrix<i32>>(&json).unwrap(), dense);
        let bad = r#"{"nrows":2,"ncols":2,"values":[1,2,3]}"#;
        assert!(serde_json::from_str::<DenseMatrix<i32>>(bad).is_err());
    }
}
