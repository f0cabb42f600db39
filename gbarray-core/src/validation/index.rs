//! Translation between 1-based user coordinates and 0-based engine ones
//!
//! Both directions are all-or-nothing: a failed translation leaves the
//! indices untouched, so callers restoring after an engine error never see a
//! half-translated buffer.

use crate::error::{Info, Result};
use crate::format::Index;

/// Shift 1-based indices to 0-based in place
///
/// Fails with [`Info::InvalidIndex`] without modifying anything when an
/// index is `0`.
pub fn decrement(indices: &mut [Index]) -> Result<()> {
    if indices.contains(&0) {
        return Err(Info::InvalidIndex);
    }
    indices.iter_mut().for_each(|i| *i -= 1);
    Ok(())
}

/// Shift 0-based indices back to 1-based in place
pub fn increment(indices: &mut [Index]) {
    indices.iter_mut().for_each(|i| *i += 1);
}
