//! Bounds and shape validation
//!
//! Pure checks on 0-based coordinates and dimensions, shared by engine
//! implementations.

use crate::error::{Info, Result};
use crate::format::{Index, INDEX_MAX};

/// Validate a pair of dimensions against the engine's index width
pub const fn validate_dims(nrows: Index, ncols: Index) -> Result<()> {
    if nrows > INDEX_MAX || ncols > INDEX_MAX {
        return Err(Info::InvalidValue);
    }
    Ok(())
}

/// Validate a 0-based coordinate against the dimensions
pub const fn validate_coords(row: Index, col: Index, nrows: Index, ncols: Index) -> Result<()> {
    if row >= nrows || col >= ncols {
        return Err(Info::InvalidIndex);
    }
    Ok(())
}

/// Validate that parallel sequences have equal length
pub const fn validate_parallel(a: usize, b: usize) -> Result<()> {
    if a != b {
        return Err(Info::DimensionMismatch);
    }
    Ok(())
}

/// Element count of a `nrows × ncols` array, checked for overflow
pub const fn checked_len(nrows: Index, ncols: Index) -> Result<usize> {
    match nrows.checked_mul(ncols) {
        Some(n) if n <= usize::MAX as Index => Ok(n as usize),
        _ => Err(Info::OutOfMemory),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_coords() {
        assert_eq!(validate_coords(0, 0, 1, 1), Ok(()));
        assert_eq!(validate_coords(1, 0, 1, 1), Err(Info::InvalidIndex));
        assert_eq!(validate_coords(0, 3, 4, 3), Err(Info::InvalidIndex));
    }

    #[test]
    fn test_validate_dims_and_len() {
        assert_eq!(validate_dims(3, INDEX_MAX), Ok(()));
        assert_eq!(validate_dims(INDEX_MAX + 1, 1), Err(Info::InvalidValue));
        assert_eq!(checked_len(3, 4), Ok(12));
        assert_eq!(checked_len(Index::MAX, 2), Err(Info::OutOfMemory));
        assert_eq!(validate_parallel(2, 3), Err(Info::DimensionMismatch));
    }
}
