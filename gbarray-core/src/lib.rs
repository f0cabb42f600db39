#![no_std]

//! gbarray core - engine contract and element model
//!
//! This crate defines what the array layer expects from a sparse engine:
//! status codes, element and fill types, type promotion, call descriptors,
//! storage orders, index translation and the primitive contract itself. It
//! contains no engine implementation.

extern crate alloc;

pub mod error;
pub mod format;
pub mod traits;
pub mod validation;

pub use error::*;
pub use format::*;
pub use traits::*;
pub use validation::*;
