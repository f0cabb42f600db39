use super::{conform, summary, AbstractGbArray, OwningArray, VectorKind};
use crate::access::VectorAccess;
use crate::error::Result;
use crate::native::NativeMatrix;
use gbarray_core::{Dup, Element, EngineMatrix, Fill, Index, StorageOrder};

/// Owning sparse vector, an `n × 1` column-major handle
#[derive(Debug)]
pub struct GbVector<T: Element, F: Fill = T> {
    handle: NativeMatrix<T>,
    fill: F,
}

impl<T: Element, F: Fill> GbVector<T, F> {
    /// Empty vector of length `n` with the default fill
    pub fn new(n: Index) -> Result<Self> {
        Self::with_fill(n, F::default())
    }

    /// Empty vector of length `n` with an explicit fill
    pub fn with_fill(n: Index, fill: F) -> Result<Self> {
        Self::from_parts(NativeMatrix::new(n, 1)?, fill)
    }

    /// Vector storing every value of `values`; the buffer moves into the engine
    pub fn from_vec(values: Vec<T>) -> Result<Self> {
        let mut handle = NativeMatrix::new(values.len() as Index, 1)?;
        handle.pack_full(values, StorageOrder::ByCol)?;
        Self::from_parts(handle, F::default())
    }

    /// Vector built from 1-based `(index, value)` pairs, summing duplicates
    pub fn from_pairs(n: Index, indices: &[Index], values: &[T]) -> Result<Self> {
        let mut v = Self::new(n)?;
        v.build_at(indices, values, Dup::Plus)?;
        Ok(v)
    }

    /// Same storage under a fill of another type (`setfill`)
    pub fn refill<G: Fill>(self, fill: G) -> GbVector<T, G> {
        GbVector {
            handle: self.handle,
            fill,
        }
    }
}

impl<T: Element, F: Fill> AbstractGbArray for GbVector<T, F> {
    type Elem = T;
    type Fill = F;

    const CAN_BE_OUTPUT: bool = true;
    const HAS_CONSTANT_ORDER: bool = true;
    const IS_VECTOR: bool = true;
    const KIND: &'static str = "GbVector";

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

impl<T: Element, F: Fill> OwningArray for GbVector<T, F> {
    fn from_parts(mut handle: NativeMatrix<T>, fill: F) -> Result<Self> {
        conform(&mut handle, Some(StorageOrder::ByCol), true)?;
        Ok(Self { handle, fill })
    }

    fn replace_handle(&mut self, mut handle: NativeMatrix<T>) -> Result<NativeMatrix<T>> {
        conform(&mut handle, Some(StorageOrder::ByCol), true)?;
        Ok(std::mem::replace(&mut self.handle, handle))
    }

    fn into_parts(self) -> (NativeMatrix<T>, F) {
        (self.handle, self.fill)
    }
}

impl<T: Element, F: Fill> VectorKind for GbVector<T, F> {}

impl<T: Element, F: Fill> core::fmt::Display for GbVector<T, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        summary(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::ElementAccess;

    #[test]
    fn test_vector_shape() {
        let v = GbVector::<f32>::new(5).unwrap();
        assert_eq!(v.size(), (5, 1));
        assert_eq!(v.to_string(), "5-element GbVector{f32, f32} with 0 stored entries");
    }

    #[test]
    fn test_from_vec_stores_everything() {
        let v = GbVector::<i64>::from_vec(vec![0, 2, 0]).unwrap();
        // explicit zeros are stored entries
        assert_eq!(v.nnz().unwrap(), 3);
        assert_eq!(v.get_at(2).unwrap().into_inner(), 2);
    }

    #[test]
    fn test_rejects_matrix_handle() {
        let handle = NativeMatrix::<i64>::new(2, 2).unwrap();
        assert!(GbVector::<i64>::from_parts(handle, 0).unwrap_err().is_dimension_mismatch());
    }
}
