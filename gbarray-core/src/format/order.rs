//! Storage order of engine arrays

/// Physical layout preference of an engine array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StorageOrder {
    /// Row-major
    ByRow,
    /// Column-major
    #[default]
    ByCol,
}

impl core::fmt::Display for StorageOrder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StorageOrder::ByRow => write!(f, "by row"),
            StorageOrder::ByCol => write!(f, "by column"),
        }
    }
}

/// Compile-time storage order of an array kind
pub trait OrderKind: Send + Sync + 'static {
    /// `Some` when the order is frozen for the kind, `None` when decided at runtime
    const FIXED: Option<StorageOrder>;
}

/// Marker for kinds frozen in row-major order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowMajor;

/// Marker for kinds frozen in column-major order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColMajor;

/// Marker for kinds whose order is a runtime value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeOrder;

impl OrderKind for RowMajor {
    const FIXED: Option<StorageOrder> = Some(StorageOrder::ByRow);
}

impl OrderKind for ColMajor {
    const FIXED: Option<StorageOrder> = Some(StorageOrder::ByCol);
}

impl OrderKind for RuntimeOrder {
    const FIXED: Option<StorageOrder> = None;
}

/// Join the orders of several arrays
///
/// Returns the common order when all agree, `None` (runtime fallback) when
/// they differ or the input is empty.
pub fn promote_order<I>(orders: I) -> Option<StorageOrder>
where
    I: IntoIterator<Item = StorageOrder>,
{
    let mut iter = orders.into_iter();
    let first = iter.next()?;
    iter.all(|o| o == first).then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promote_order() {
        use StorageOrder::*;
        assert_eq!(promote_order([ByRow, ByRow]), Some(ByRow));
        assert_eq!(promote_order([ByRow, ByCol]), None);
        assert_eq!(promote_order(core::iter::empty()), None);
    }

    #[test]
    fn test_fixed_markers() {
        assert_eq!(RowMajor::FIXED, Some(StorageOrder::ByRow));
        assert_eq!(RuntimeOrder::FIXED, None);
    }
}
