//! User-defined element types
//!
//! Any serde-serialisable value can be stored by wrapping it in [`Udt`]. The
//! engine treats it as opaque bytes: it has no native kernels for the type,
//! so assignments copy user-defined sources through the opaque path and
//! builds need an explicit combiner for duplicates.

use gbarray_core::{DataType, Element, Value};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A user-defined value stored through its JSON encoding
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Udt<T>(pub T);

impl<T> Element for Udt<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq + core::fmt::Debug + Default,
    T: Send + Sync + 'static,
{
    const DATA_TYPE: DataType = DataType::Udt;

    fn to_value(&self) -> Option<Value> {
        match serde_json::to_vec(&self.0) {
            Ok(bytes) => Some(Value::Opaque(bytes)),
            Err(err) => {
                log::debug!("user-defined value does not encode: {err}");
                None
            }
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Opaque(bytes) => serde_json::from_slice(bytes).ok().map(Udt),
            _ => None,
        }
    }

    fn is_truthy(&self) -> bool {
        self.0 != T::default()
    }

    fn plus(&self, _other: &Self) -> Option<Self> {
        None
    }
}
