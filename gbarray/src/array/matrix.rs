use super::{conform, summary, AbstractGbArray, OwningArray};
use crate::access::ElementAccess;
use crate::error::Result;
use crate::native::NativeMatrix;
use gbarray_core::{
    ColMajor, Dup, Element, EngineMatrix, Fill, Index, OrderKind, RowMajor, RuntimeOrder, StorageOrder,
};
use std::marker::PhantomData;

/// Owning sparse matrix
///
/// `F` is the fill type of unstored positions and defaults to the stored
/// type, filled with zero. `O` decides whether the storage order is fixed for
/// the type ([`GbMatrixC`], [`GbMatrixR`]) or a runtime property.
#[derive(Debug)]
pub struct GbMatrix<T: Element, F: Fill = T, O: OrderKind = RuntimeOrder> {
    handle: NativeMatrix<T>,
    fill: F,
    _order: PhantomData<O>,
}

/// Matrix frozen in column-major order
pub type GbMatrixC<T, F = T> = GbMatrix<T, F, ColMajor>;

/// Matrix frozen in row-major order
pub type GbMatrixR<T, F = T> = GbMatrix<T, F, RowMajor>;

impl<T: Element, F: Fill, O: OrderKind> GbMatrix<T, F, O> {
    /// Empty `nrows × ncols` matrix with the default fill
    pub fn new(nrows: Index, ncols: Index) -> Result<Self> {
        Self::with_fill(nrows, ncols, F::default())
    }

    /// Empty `nrows × ncols` matrix with an explicit fill
    pub fn with_fill(nrows: Index, ncols: Index, fill: F) -> Result<Self> {
        Self::from_parts(NativeMatrix::new(nrows, ncols)?, fill)
    }

    /// Matrix built from 1-based triples, summing duplicates
    pub fn from_triples(
        nrows: Index,
        ncols: Index,
        rows: &[Index],
        cols: &[Index],
        values: &[T],
    ) -> Result<Self> {
        let mut m = Self::new(nrows, ncols)?;
        m.build(rows, cols, values, Dup::Plus)?;
        Ok(m)
    }

    /// Same storage under a fill of another type (`setfill`)
    pub fn refill<G: Fill>(self, fill: G) -> GbMatrix<T, G, O> {
        GbMatrix {
            handle: self.handle,
            fill,
            _order: PhantomData,
        }
    }
}

impl<T: Element, F: Fill> GbMatrix<T, F> {
    /// Empty matrix in an explicit storage order
    pub fn with_order(nrows: Index, ncols: Index, order: StorageOrder) -> Result<Self> {
        let mut m = Self::new(nrows, ncols)?;
        m.set_storage_order(order)?;
        Ok(m)
    }
}

impl<T: Element, F: Fill, O: OrderKind> AbstractGbArray for GbMatrix<T, F, O> {
    type Elem = T;
    type Fill = F;

    const CAN_BE_OUTPUT: bool = true;
    const HAS_CONSTANT_ORDER: bool = O::FIXED.is_some();
    const IS_VECTOR: bool = false;
    const KIND: &'static str = "GbMatrix";

    fn handle(&self) -> &NativeMatrix<T> {
        &self.handle
    }

    fn handle_mut(&mut self) -> Result<&mut NativeMatrix<T>> {
        Ok(&mut self.handle)
    }

    fn fill(&self) -> &F {
        &self.fill
    }

    fn set_fill(&mut self, fill: F) {
        self.fill = fill;
    }
}

impl<T: Element, F: Fill, O: OrderKind> OwningArray for GbMatrix<T, F, O> {
    fn from_parts(mut handle: NativeMatrix<T>, fill: F) -> Result<Self> {
        conform(&mut handle, O::FIXED, false)?;
        Ok(Self {
            handle,
            fill,
            _order: PhantomData,
        })
    }

    fn replace_handle(&mut self, mut handle: NativeMatrix<T>) -> Result<NativeMatrix<T>> {
        conform(&mut handle, O::FIXED, false)?;
        Ok(std::mem::replace(&mut self.handle, handle))
    }

    fn into_parts(self) -> (NativeMatrix<T>, F) {
        (self.handle, self.fill)
    }
}

impl<T: Element, F: Fill, O: OrderKind> core::fmt::Display for GbMatrix<T, F, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        summary(self, f)
    }
}
