//! Fill values: the logical value of every unstored position

use super::element::Element;
use super::value::Value;

/// Trait for types usable as an array's fill value
///
/// Every [`Element`] is a fill type. [`Nothing`] is the absent-style sentinel:
/// reading an unstored position of an array filled with it yields `Nothing`.
pub trait Fill: Clone + PartialEq + core::fmt::Debug + Default + Send + Sync + 'static {
    /// Whether this type is an "absent" sentinel rather than a concrete value
    const ABSENT: bool = false;

    /// Type-erased fill value, `None` for absent-style fills
    fn fill_value(&self) -> Option<Value>;
}

impl<T: Element> Fill for T {
    fn fill_value(&self) -> Option<Value> {
        self.to_value()
    }
}

/// Absent-style fill sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Nothing;

impl Fill for Nothing {
    const ABSENT: bool = true;

    fn fill_value(&self) -> Option<Value> {
        None
    }
}

impl core::fmt::Display for Nothing {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "nothing")
    }
}

/// Promote the fills of two operands
///
/// Agreeing fills are kept, absent-style fills stay absent, anything else
/// degrades to `None` ("no fixed fill").
pub fn promote_fill<F: Fill>(a: &F, b: &F) -> Option<F> {
    if F::ABSENT {
        Some(F::default())
    } else if a == b {
        Some(a.clone())
    } else {
        None
    }
}

/// Resolve a single fill for a set of tiles
///
/// The shared fill when every tile agrees, otherwise the fill type's default:
/// the sentinel itself for absent-style fills, zero for numeric fills.
pub fn resolve_fill<'a, F, I>(fills: I) -> F
where
    F: Fill,
    I: IntoIterator<Item = &'a F>,
{
    let mut iter = fills.into_iter();
    let Some(first) = iter.next() else {
        return F::default();
    };
    iter.try_fold(first.clone(), |acc, f| promote_fill(&acc, f))
        .unwrap_or_default()
}

/// Convert a fill to the stored type, when representable
pub fn fill_as<T: Element, F: Fill>(fill: &F) -> Option<T> {
    fill.fill_value().and_then(|v| T::from_value(&v))
}
