//! Arrays over host buffers lent to the engine
//!
//! Packing moves a host buffer into an engine handle without copying; the
//! shallow array mutably borrows the host value for its whole lifetime, so the
//! buffer cannot be reached through any other path while packed. Dropping the
//! shallow array unpacks the handle and puts the buffer back.

use super::{summary, AbstractGbArray, VectorKind};
use crate::error::{Error, Result};
use crate::host::{CscMatrix, DenseMatrix};
use crate::native::NativeMatrix;
use gbarray_core::{decrement, increment, Element, EngineMatrix, Fill, Index, Info, StorageOrder};

enum Host<'a, T> {
    Dense(&'a mut DenseMatrix<T>),
    Vector(&'a mut Vec<T>),
    Csc(&'a mut CscMatrix<T>),
}

/// A handle holding a borrowed host buffer
struct Packed<'a, T: Element> {
    handle: NativeMatrix<T>,
    host: Host<'a, T>,
    returned: bool,
}

impl<'a, T: Element> Packed<'a, T> {
    fn dense(dense: &'a mut DenseMatrix<T>) -> Result<Self> {
        let (nrows, ncols) = dense.shape();
        let mut handle = NativeMatrix::new(nrows as Index, ncols as Index)?;
        handle.pack_full(dense.take_values(), StorageOrder::ByCol)?;
        Ok(Self::new(handle, Host::Dense(dense)))
    }

    fn vector(values: &'a mut Vec<T>) -> Result<Self> {
        let mut handle = NativeMatrix::new(values.len() as Index, 1)?;
        handle.pack_full(std::mem::take(values), StorageOrder::ByCol)?;
        Ok(Self::new(handle, Host::Vector(values)))
    }

    fn csc(csc: &'a mut CscMatrix<T>) -> Result<Self> {
        csc.validate()?;
        let mut handle = NativeMatrix::new(csc.nrows as Index, csc.ncols as Index)?;
        decrement(&mut csc.colptr)?;
        if let Err(info) = decrement(&mut csc.rowval) {
            increment(&mut csc.colptr);
            return Err(info.into());
        }
        let parts = (
            std::mem::take(&mut csc.colptr),
            std::mem::take(&mut csc.rowval),
            std::mem::take(&mut csc.nzval),
        );
        handle.pack_csc(parts)?;
        Ok(Self::new(handle, Host::Csc(csc)))
    }

    fn new(handle: NativeMatrix<T>, host: Host<'a, T>) -> Self {
        log::debug!("packed host buffer into {}x{} handle", handle.nrows(), handle.ncols());
        Self {
            handle,
            host,
            returned: false,
        }
    }

    fn restore(&mut self) -> core::result::Result<(), Info> {
        if self.returned {
            return Ok(());
        }
        self.returned = true;
        match &mut self.host {
            Host::Dense(dense) => dense.restore_values(self.handle.unpack_full(None)?),
            Host::Vector(values) => **values = self.handle.unpack_full(None)?,
            Host::Csc(csc) => {
                let (mut colptr, mut rowval, nzval) = self.handle.unpack_csc()?;
                increment(&mut colptr);
                increment(&mut rowval);
                csc.colptr = colptr;
                csc.rowval = rowval;
                csc.nzval = nzval;
            }
        }
        log::debug!("returned packed buffer to host");
        Ok(())
    }
}

impl<T: Element> Drop for Packed<'_, T> {
    fn drop(&mut self) {
        if let Err(info) = self.restore() {
            log::error!("failed to return packed buffer to host: {info}");
        }
    }
}

/// Read-only matrix over a packed host buffer
pub struct ShallowMatrix<'a, T: Element, F: Fill = T> {
    packed: Packed<'a, T>,
    fill: F,
}

impl<'a, T: Element, F: Fill> ShallowMatrix<'a, T, F> {
    /// Lend a column-major dense buffer to the engine
    pub fn pack_dense(dense: &'a mut DenseMatrix<T>) -> Result<Self> {
        Ok(Self {
            packed: Packed::dense(dense)?,
            fill: F::default(),
        })
    }

    /// Lend compressed-sparse-column buffers to the engine
    pub fn pack_csc(csc: &'a mut CscMatrix<T>) -> Result<Self> {
        Ok(Self {
            packed: Packed::csc(csc)?,
            fill: F::default(),
        })
    }

    /// Same view under a fill of another type
    pub fn refill<G: Fill>(self, fill: G) -> ShallowMatrix<'a, T, G> {
        ShallowMatrix {
            packed: self.packed,
            fill,
        }
    }

    /// Return the buffer to the host now, reporting failures
    pub fn unpack(mut self) -> Result<()> {
        self.packed.restore().map_err(Error::from)
    }
}

impl<T: Element, F: Fill> AbstractGbArray for ShallowMatrix<'_, T, F> {
    type Elem = T;
    type Fill = F;

    const CAN_BE_OUTPUT: bool = false;
    const HAS_CONSTANT_ORDER: bool = true;
    const IS_VECTOR: bool = false;
    const KIND: &'static str = "ShallowMatrix";

    fn handle(&self) -> &NativeMatrix<T> {
        &self.packed.handle
    }

    fn handle_mut(&mut self) -> Result<&mut NativeMatrix<T>> {
        Err(Error::ReadOnly)
    }

    fn fill(&self) -> &F {
        &self.fill
    }

    fn set_fill(&mut self, fill: F) {
        self.fill = fill;
    }
}

impl<T: Element, F: Fill> core::fmt::Display for ShallowMatrix<'_, T, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        summary(self, f)
    }
}

/// Read-only vector over a packed host buffer
pub struct ShallowVector<'a, T: Element, F: Fill = T> {
    packed: Packed<'a, T>,
    fill: F,
}

impl<'a, T: Element, F: Fill> ShallowVector<'a, T, F> {
    /// Lend a dense buffer to the engine
    pub fn pack(values: &'a mut Vec<T>) -> Result<Self> {
        Ok(Self {
            packed: Packed::vector(values)?,
            fill: F::default(),
        })
    }

    /// Same view under a fill of another type
    pub fn refill<G: Fill>(self, fill: G) -> ShallowVector<'a, T, G> {
        ShallowVector {
            packed: self.packed,
            fill,
        }
    }

    /// Return the buffer to the host now, reporting failures
    pub fn unpack(mut self) -> Result<()> {
        self.packed.restore().map_err(Error::from)
    }
}

impl<T: Element, F: Fill> AbstractGbArray for ShallowVector<'_, T, F> {
    type Elem = T;
    type Fill = F;

    const CAN_BE_OUTPUT: bool = false;
    const HAS_CONSTANT_ORDER: bool = true;
    const IS_VECTOR: bool = true;
    const KIND: &'static str = "ShallowVector";

    fn handle(&self) -> &NativeMatrix<T> {
        &self.packed.handle
    }

    fn handle_mut(&mut self) -> Result<&mut NativeMatrix<T>> {
        Err(Error::ReadOnly)
    }

    fn fill(&self) -> &F {
        &self.fill
    }

    fn set_fill(&mut self, fill: F) {
        self.fill = fill;
    }
}

impl<T: Element, F: Fill> VectorKind for ShallowVector<'_, T, F> {}

impl<T: Element, F: Fill> core::fmt::Display for ShallowVector<'_, T, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        summary(self, f)
    }
}
