//! Moving buffers in and out of a handle
//!
//! Packing hands ownership of host buffers to the handle without copying.
//! Unpacking hands the buffers back and leaves the handle empty; it moves
//! them out when the handle already holds the requested format.

use super::{Entries, Store};
use gbarray_core::{checked_len, CscParts, Element, Index, Info, Result, StorageOrder};
use hashbrown::HashMap;
use rayon::prelude::*;

fn take_entries<T>(store: &mut Store<T>) -> Entries<T> {
    std::mem::replace(&mut store.entries, Entries::Sparse(HashMap::new()))
}

pub(crate) fn pack_full<T: Element>(
    store: &mut Store<T>,
    values: Vec<T>,
    order: StorageOrder,
) -> Result<()> {
    if values.len() != checked_len(store.nrows, store.ncols)? {
        return Err(Info::DimensionMismatch);
    }
    log::debug!("packing {} full values ({order})", values.len());
    store.pending.clear();
    store.order = order;
    store.entries = Entries::Full(values);
    Ok(())
}

pub(crate) fn unpack_full<T: Element>(store: &mut Store<T>, densify: Option<&T>) -> Result<Vec<T>> {
    let n = checked_len(store.nrows, store.ncols)?;
    if store.len() != n && densify.is_none() {
        return Err(Info::InvalidObject);
    }
    if store.order == StorageOrder::ByCol && matches!(store.entries, Entries::Full(_)) {
        if let Entries::Full(values) = take_entries(store) {
            return Ok(values);
        }
    }
    log::debug!(
        "unpacking {}x{} handle into a column-major buffer",
        store.nrows,
        store.ncols
    );
    let nrows = store.nrows;
    let mut values = vec![densify.cloned().unwrap_or_default(); n];
    for ((i, j), v) in store.take_sparse() {
        values[(i + j * nrows) as usize] = v;
    }
    Ok(values)
}

pub(crate) fn pack_csc<T: Element>(store: &mut Store<T>, parts: CscParts<T>) -> Result<()> {
    let (colptr, rowval, values) = parts;
    if colptr.len() as Index != store.ncols + 1 || rowval.len() != values.len() {
        return Err(Info::DimensionMismatch);
    }
    if colptr.first() != Some(&0) || colptr.last() != Some(&(values.len() as Index)) {
        return Err(Info::InvalidValue);
    }
    if colptr.windows(2).any(|w| w[1] < w[0]) {
        return Err(Info::InvalidValue);
    }
    for w in colptr.windows(2) {
        let column = &rowval[w[0] as usize..w[1] as usize];
        if column.iter().any(|&i| i >= store.nrows) {
            return Err(Info::InvalidIndex);
        }
        if column.windows(2).any(|r| r[1] <= r[0]) {
            return Err(Info::InvalidValue);
        }
    }
    log::debug!("packing {} compressed-column entries", values.len());
    store.pending.clear();
    store.order = StorageOrder::ByCol;
    store.entries = Entries::Csc {
        colptr,
        rowval,
        values,
    };
    Ok(())
}

pub(crate) fn unpack_csc<T: Element>(store: &mut Store<T>) -> CscParts<T> {
    if let Entries::Csc { .. } = store.entries {
        if let Entries::Csc {
            colptr,
            rowval,
            values,
        } = take_entries(store)
        {
            return (colptr, rowval, values);
        }
    }
    log::debug!("compressing {} entries by column", store.len());
    let mut tuples: Vec<_> = store.take_sparse().into_iter().collect();
    tuples.par_sort_unstable_by_key(|&((i, j), _)| (j, i));

    let mut colptr = vec![0; store.ncols as usize + 1];
    let mut rowval = Vec::with_capacity(tuples.len());
    let mut values = Vec::with_capacity(tuples.len());
    for ((i, j), v) in tuples {
        colptr[j as usize + 1] += 1;
        rowval.push(i);
        values.push(v);
    }
    for j in 0..store.ncols as usize {
        colptr[j + 1] += colptr[j];
    }
    (colptr, rowval, values)
}
