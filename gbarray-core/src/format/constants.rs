//! Engine-boundary constants

/// Index width used across the engine boundary
pub type Index = u64;

/// Largest dimension the engine accepts (2^60, as GraphBLAS engines do)
pub const INDEX_MAX: Index = 1 << 60;
