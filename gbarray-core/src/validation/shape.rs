//! Shape arithmetic for reshape and diagonal operations

use crate::error::{Info, Result};
use crate::format::Index;

/// Resolve reshape dimensions, inferring at most one of them from `total`
///
/// Both inferred, or an inferred dimension that does not divide `total`,
/// fails with [`Info::InvalidValue`]; explicit dimensions whose product
/// differs from `total` fail with [`Info::DimensionMismatch`].
pub fn infer_dims(
    total: Index,
    nrows: Option<Index>,
    ncols: Option<Index>,
) -> Result<(Index, Index)> {
    let (r, c) = match (nrows, ncols) {
        (None, None) => return Err(Info::InvalidValue),
        (Some(r), Some(c)) => (r, c),
        (Some(r), None) => (r, divide_exact(total, r)?),
        (None, Some(c)) => (divide_exact(total, c)?, c),
    };
    if r.checked_mul(c) != Some(total) {
        return Err(Info::DimensionMismatch);
    }
    Ok((r, c))
}

fn divide_exact(total: Index, by: Index) -> Result<Index> {
    if by == 0 {
        return if total == 0 { Ok(0) } else { Err(Info::InvalidValue) };
    }
    if total % by != 0 {
        return Err(Info::InvalidValue);
    }
    Ok(total / by)
}

/// Length of the `k`-th diagonal of an `nrows × ncols` array
///
/// `min(nrows, ncols - k)` for `k >= 0`, `min(nrows + k, ncols)` for `k < 0`,
/// zero when `k` lies outside `[-nrows, ncols]`.
pub fn diag_len(nrows: Index, ncols: Index, k: i64) -> Index {
    let (m, n, k) = (nrows as i128, ncols as i128, k as i128);
    if k < -m || k > n {
        return 0;
    }
    let len = if k >= 0 { m.min(n - k) } else { (m + k).min(n) };
    len.max(0) as Index
}

/// 0-based coordinates of linear position `p` in a `nrows × ncols` layout
pub const fn linear_to_coords(
    p: Index,
    nrows: Index,
    ncols: Index,
    by_col: bool,
) -> (Index, Index) {
    if by_col {
        (p % nrows, p / nrows)
    } else {
        (p / ncols, p % ncols)
    }
}

/// Linear position of 0-based `(row, col)` in a `nrows × ncols` layout
pub const fn coords_to_linear(
    row: Index,
    col: Index,
    nrows: Index,
    ncols: Index,
    by_col: bool,
) -> Index {
    if by_col {
        row + col * nrows
    } else {
        row * ncols + col
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_dims() {
        assert_eq!(infer_dims(12, Some(3), None), Ok((3, 4)));
        assert_eq!(infer_dims(12, None, Some(6)), Ok((2, 6)));
        assert_eq!(infer_dims(12, Some(2), Some(6)), Ok((2, 6)));
        assert_eq!(infer_dims(12, None, None), Err(Info::InvalidValue));
        assert_eq!(infer_dims(12, Some(5), None), Err(Info::InvalidValue));
        assert_eq!(infer_dims(12, Some(5), Some(2)), Err(Info::DimensionMismatch));
    }

    #[test]
    fn test_diag_len() {
        assert_eq!(diag_len(3, 4, 0), 3);
        assert_eq!(diag_len(3, 4, 1), 3);
        assert_eq!(diag_len(3, 4, 2), 2);
        assert_eq!(diag_len(3, 4, -1), 2);
        assert_eq!(diag_len(3, 4, 4), 0);
        assert_eq!(diag_len(3, 4, -3), 0);
        assert_eq!(diag_len(3, 4, 5), 0);
        assert_eq!(diag_len(3, 4, -4), 0);
    }

    #[test]
    fn test_linear_round_trip() {
        for by_col in [true, false] {
            for p in 0..12 {
                let (i, j) = linear_to_coords(p, 3, 4, by_col);
                assert_eq!(coords_to_linear(i, j, 3, 4, by_col), p);
            }
        }
    }
}
