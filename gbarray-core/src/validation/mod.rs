//! Validation and translation utilities
//!
//! Pure functions with no engine state: index translation, bounds checks and
//! shape arithmetic.

pub mod bounds;
pub mod index;
pub mod shape;

pub use bounds::{checked_len, validate_coords, validate_dims, validate_parallel};
pub use index::{decrement, increment};
pub use shape::{coords_to_linear, diag_len, infer_dims, linear_to_coords};
