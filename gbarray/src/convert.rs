//! Conversion between arrays and host representations
//!
//! Two families:
//!
//! - bracketed zero-copy access: [`Conversion::unpack_dense`] and
//!   [`Conversion::unpack_csc`] lend the array's storage out as a host value
//!   and repack it when the guard is dropped, including on early return
//! - safe materialisation: [`Conversion::to_dense`], [`Conversion::to_csc`]
//!   and [`Conversion::to_vec`] work on a copy, so the array is never touched
//!   and the result owns independent storage

use crate::access::cast_value;
use crate::array::{AbstractGbArray, GbMatrix, GbVector, OwningArray};
use crate::error::Result;
use crate::host::{CscMatrix, DenseMatrix};
use crate::native::NativeMatrix;
use gbarray_core::{
    decrement, increment, Dup, Element, EngineMatrix, Fill, Index, Info, OrderKind, StorageOrder,
};
use std::ops::Deref;

/// Copy of `source` with every value cast to `T`
pub(crate) fn cast_handle<S: Element, T: Element>(
    source: &NativeMatrix<S>,
) -> Result<NativeMatrix<T>> {
    source.wait()?;
    let (rows, cols, values) = source.extract_tuples()?;
    let values = values.iter().map(cast_value).collect::<Result<Vec<T>>>()?;
    let mut out = NativeMatrix::new(source.nrows(), source.ncols())?;
    out.set_storage_order(source.storage_order())?;
    out.build(&rows, &cols, &values, &Dup::Second)?;
    Ok(out)
}

fn dense_from_parts<T>(nrows: Index, ncols: Index, values: Vec<T>) -> Result<DenseMatrix<T>> {
    DenseMatrix::from_col_major(nrows as usize, ncols as usize, values)
}

fn csc_from_parts<T>(
    nrows: Index,
    ncols: Index,
    parts: (Vec<Index>, Vec<Index>, Vec<T>),
) -> CscMatrix<T> {
    let (mut colptr, mut rowval, nzval) = parts;
    increment(&mut colptr);
    increment(&mut rowval);
    CscMatrix {
        nrows: nrows as usize,
        ncols: ncols as usize,
        colptr,
        rowval,
        nzval,
    }
}

/// Storage of an array lent out as a column-major dense matrix
///
/// Values may be modified in place through [`DenseGuard::values_mut`]; the
/// shape is fixed. The buffer goes back into the array on
/// [`repack`](DenseGuard::repack) or drop.
pub struct DenseGuard<'a, T: Element> {
    handle: &'a mut NativeMatrix<T>,
    order: StorageOrder,
    dense: DenseMatrix<T>,
    packed: bool,
}

impl<T: Element> DenseGuard<'_, T> {
    /// Mutable column-major values
    pub fn values_mut(&mut self) -> &mut [T] {
        self.dense.values_mut()
    }

    /// Return the storage to the array now, reporting failures
    pub fn repack(mut self) -> Result<()> {
        self.restore()?;
        Ok(())
    }

    fn restore(&mut self) -> core::result::Result<(), Info> {
        if self.packed {
            return Ok(());
        }
        self.packed = true;
        self.handle.pack_full(self.dense.take_values(), StorageOrder::ByCol)?;
        if self.order != StorageOrder::ByCol {
            self.handle.set_storage_order(self.order)?;
        }
        Ok(())
    }
}

impl<T: Element> Deref for DenseGuard<'_, T> {
    type Target = DenseMatrix<T>;

    fn deref(&self) -> &DenseMatrix<T> {
        &self.dense
    }
}

impl<T: Element> Drop for DenseGuard<'_, T> {
    fn drop(&mut self) {
        if let Err(info) = self.restore() {
            log::error!("failed to repack dense storage: {info}");
        }
    }
}

/// Storage of an array lent out as a 1-based compressed-sparse-column matrix
///
/// The pattern is fixed; stored values may be modified through
/// [`CscGuard::nzval_mut`].
pub struct CscGuard<'a, T: Element> {
    handle: &'a mut NativeMatrix<T>,
    order: StorageOrder,
    csc: CscMatrix<T>,
    packed: bool,
}

impl<T: Element> CscGuard<'_, T> {
    /// Mutable stored values
    pub fn nzval_mut(&mut self) -> &mut [T] {
        self.csc.nzval_mut()
    }

    /// Return the storage to the array now, reporting failures
    pub fn repack(mut self) -> Result<()> {
        self.restore()?;
        Ok(())
    }

    fn restore(&mut self) -> core::result::Result<(), Info> {
        if self.packed {
            return Ok(());
        }
        self.packed = true;
        let mut colptr = std::mem::take(&mut self.csc.colptr);
        let mut rowval = std::mem::take(&mut self.csc.rowval);
        let nzval = std::mem::take(&mut self.csc.nzval);
        decrement(&mut colptr)?;
        decrement(&mut rowval)?;
        self.handle.pack_csc((colptr, rowval, nzval))?;
        if self.order != StorageOrder::ByCol {
            self.handle.set_storage_order(self.order)?;
        }
        Ok(())
    }
}

impl<T: Element> Deref for CscGuard<'_, T> {
    type Target = CscMatrix<T>;

    fn deref(&self) -> &CscMatrix<T> {
        &self.csc
    }
}

impl<T: Element> Drop for CscGuard<'_, T> {
    fn drop(&mut self) {
        if let Err(info) = self.restore() {
            log::error!("failed to repack compressed-column storage: {info}");
        }
    }
}

/// Conversions to host representations, available on every array kind
pub trait Conversion: AbstractGbArray {
    /// Lend the storage out as a dense matrix (`unsafeunpack!`)
    ///
    /// When entries are missing, `densify` fills them first; the array keeps
    /// those entries after repacking. Without `densify` a non-full array is an
    /// error.
    fn unpack_dense(&mut self, densify: Option<Self::Elem>) -> Result<DenseGuard<'_, Self::Elem>> {
        let (nrows, ncols) = self.size();
        let handle = self.handle_mut()?;
        let order = handle.storage_order();
        let values = handle.unpack_full(densify.as_ref())?;
        Ok(DenseGuard {
            dense: dense_from_parts(nrows, ncols, values)?,
            handle,
            order,
            packed: false,
        })
    }

    /// Lend the storage out as a compressed-sparse-column matrix (`unsafeunpack!`)
    fn unpack_csc(&mut self) -> Result<CscGuard<'_, Self::Elem>> {
        let (nrows, ncols) = self.size();
        let handle = self.handle_mut()?;
        let order = handle.storage_order();
        let parts = handle.unpack_csc()?;
        Ok(CscGuard {
            csc: csc_from_parts(nrows, ncols, parts),
            handle,
            order,
            packed: false,
        })
    }

    /// Dense copy; unstored positions take the fill, or zero when the fill
    /// does not fit the stored type
    fn to_dense(&self) -> Result<DenseMatrix<Self::Elem>> {
        let (nrows, ncols) = self.size();
        let fill = self.fill_as_elem().unwrap_or_default();
        let mut copy = self.handle().dup()?;
        let values = copy.unpack_full(Some(&fill))?;
        dense_from_parts(nrows, ncols, values)
    }

    /// Compressed-sparse-column copy of the stored entries
    fn to_csc(&self) -> Result<CscMatrix<Self::Elem>> {
        let (nrows, ncols) = self.size();
        let mut copy = self.handle().dup()?;
        Ok(csc_from_parts(nrows, ncols, copy.unpack_csc()?))
    }

    /// Column-major values of the dense copy
    fn to_vec(&self) -> Result<Vec<Self::Elem>> {
        Ok(self.to_dense()?.into_values())
    }
}

impl<A: AbstractGbArray> Conversion for A {}

fn handle_from_csc<T: Element>(csc: CscMatrix<T>) -> Result<NativeMatrix<T>> {
    csc.validate()?;
    let (nrows, ncols) = csc.shape();
    let (mut colptr, mut rowval, nzval) = csc.into_parts();
    decrement(&mut colptr)?;
    decrement(&mut rowval)?;
    let mut handle = NativeMatrix::new(nrows as Index, ncols as Index)?;
    handle.pack_csc((colptr, rowval, nzval))?;
    Ok(handle)
}

impl<T: Element, F: Fill, O: OrderKind> GbMatrix<T, F, O> {
    /// Matrix storing every value of `dense`; the buffer moves into the engine
    pub fn from_dense(dense: DenseMatrix<T>) -> Result<Self> {
        let (nrows, ncols) = dense.shape();
        let mut handle = NativeMatrix::new(nrows as Index, ncols as Index)?;
        handle.pack_full(dense.into_values(), StorageOrder::ByCol)?;
        Self::from_parts(handle, F::default())
    }

    /// Matrix storing the entries of `csc`; the buffers move into the engine
    pub fn from_csc(csc: CscMatrix<T>) -> Result<Self> {
        Self::from_parts(handle_from_csc(csc)?, F::default())
    }

    /// Copy with every stored value cast to `U`; narrowing must be exact
    pub fn cast<U: Element>(&self) -> Result<GbMatrix<U, F, O>> {
        GbMatrix::from_parts(cast_handle(self.handle())?, self.fill().clone())
    }
}

impl<T: Element, F: Fill> GbVector<T, F> {
    /// Vector storing the entries of a one-column `csc`
    pub fn from_csc(csc: CscMatrix<T>) -> Result<Self> {
        Self::from_parts(handle_from_csc(csc)?, F::default())
    }

    /// Copy with every stored value cast to `U`; narrowing must be exact
    pub fn cast<U: Element>(&self) -> Result<GbVector<U, F>> {
        GbVector::from_parts(cast_handle(self.handle())?, self.fill().clone())
    }
}
