//! Abstract interfaces shared by the engine and the array layer
//!
//! Element and fill types, value conversion, type promotion, binary
//! operators and the engine primitive contract.

pub mod element;
pub mod engine;
pub mod fill;
pub mod ops;
pub mod promote;
pub mod value;

pub use element::Element;
pub use engine::{CscParts, EngineMatrix, IndexList, MaskSource, Tuples};
pub use fill::{fill_as, promote_fill, resolve_fill, Fill, Nothing};
pub use ops::{BinaryOp, Dup, SelectOp};
pub use promote::{Promote, Promoted};
pub use value::Value;
