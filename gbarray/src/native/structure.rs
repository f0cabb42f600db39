//! Shape-changing primitives

use super::{Entries, Store};
use crate::config::EngineConfig;
use gbarray_core::{
    coords_to_linear, diag_len, linear_to_coords, validate_dims, Element, Index, Info, Result,
    SelectOp, StorageOrder,
};

pub(crate) fn resize_store<T: Element>(store: &mut Store<T>, nrows: Index, ncols: Index) {
    if (nrows, ncols) == (store.nrows, store.ncols) {
        return;
    }
    store
        .sparse_mut()
        .retain(|&(i, j), _| i < nrows && j < ncols);
    store.nrows = nrows;
    store.ncols = ncols;
}

pub(crate) fn reshape_store<T: Element>(
    store: &mut Store<T>,
    nrows: Index,
    ncols: Index,
    by_col: bool,
) -> Result<()> {
    validate_dims(nrows, ncols)?;
    if nrows as u128 * ncols as u128 != store.nrows as u128 * store.ncols as u128 {
        return Err(Info::DimensionMismatch);
    }
    let layout_matches = by_col == (store.order == StorageOrder::ByCol);
    if layout_matches && matches!(store.entries, Entries::Full(_)) {
        // the linear layout already is the reshaped layout
        store.nrows = nrows;
        store.ncols = ncols;
        return Ok(());
    }
    let (old_rows, old_cols) = (store.nrows, store.ncols);
    let old = store.take_sparse();
    store.nrows = nrows;
    store.ncols = ncols;
    let map = store.sparse_mut();
    map.reserve(old.len());
    for ((i, j), v) in old {
        let p = coords_to_linear(i, j, old_rows, old_cols, by_col);
        map.insert(linear_to_coords(p, nrows, ncols, by_col), v);
    }
    Ok(())
}

pub(crate) fn concat_stores<T: Element>(
    tiles: &[Vec<&Store<T>>],
    config: EngineConfig,
) -> Result<Store<T>> {
    let first_row = tiles.first().ok_or(Info::InvalidValue)?;
    let first = first_row.first().ok_or(Info::InvalidValue)?;
    if tiles.iter().any(|row| row.len() != first_row.len()) {
        return Err(Info::DimensionMismatch);
    }
    let widths: Vec<Index> = first_row.iter().map(|t| t.ncols).collect();
    let mut heights = Vec::with_capacity(tiles.len());
    for row in tiles {
        let height = row[0].nrows;
        let consistent = row
            .iter()
            .zip(&widths)
            .all(|(t, &w)| t.nrows == height && t.ncols == w);
        if !consistent {
            return Err(Info::DimensionMismatch);
        }
        heights.push(height);
    }
    let nrows = heights.iter().sum();
    let ncols = widths.iter().sum();
    validate_dims(nrows, ncols)?;

    let mut out = Store::new(nrows, ncols, config);
    out.order = first.order;
    let map = out.sparse_mut();
    let mut row_offset = 0;
    for (row, height) in tiles.iter().zip(&heights) {
        let mut col_offset = 0;
        for (tile, width) in row.iter().zip(&widths) {
            tile.for_each(|i, j, v| {
                map.insert((i + row_offset, j + col_offset), v.clone());
            });
            col_offset += width;
        }
        row_offset += height;
    }
    Ok(out)
}

/// 0-based position of the `t`-th element of diagonal `k`
fn diag_position(t: Index, k: i64) -> (Index, Index) {
    if k >= 0 {
        (t, t + k as Index)
    } else {
        (t + k.unsigned_abs(), t)
    }
}

pub(crate) fn diag_of<T: Element>(a: &Store<T>, k: i64) -> Result<Store<T>> {
    let n = diag_len(a.nrows, a.ncols, k);
    let mut out = Store::new(n, 1, a.config);
    out.order = StorageOrder::ByCol;
    for t in 0..n {
        let (i, j) = diag_position(t, k);
        if let Some(v) = a.get(i, j) {
            out.insert(t, 0, v.clone());
        }
    }
    Ok(out)
}

pub(crate) fn matrix_from_diag<T: Element>(v: &Store<T>, k: i64) -> Result<Store<T>> {
    if v.ncols != 1 {
        return Err(Info::DimensionMismatch);
    }
    let n = v
        .nrows
        .checked_add(k.unsigned_abs())
        .ok_or(Info::InvalidValue)?;
    validate_dims(n, n)?;
    let mut out = Store::new(n, n, v.config);
    let map = out.sparse_mut();
    v.for_each(|t, _, x| {
        map.insert(diag_position(t, k), x.clone());
    });
    Ok(out)
}

pub(crate) fn select_store<T: Element>(a: &Store<T>, op: SelectOp, k: i64) -> Store<T> {
    let mut out = Store::new(a.nrows, a.ncols, a.config);
    out.order = a.order;
    let map = out.sparse_mut();
    a.for_each(|i, j, v| {
        if op.keeps(i, j, k) {
            map.insert((i, j), v.clone());
        }
    });
    out
}
