//! In-memory reference engine
//!
//! `NativeMatrix` implements the [`EngineMatrix`] contract for every element
//! type. Entries live in one of three formats:
//!
//! - **Sparse**: a hash map keyed by 0-based `(row, col)`
//! - **Full**: every position present, laid out in the handle's storage order
//! - **Csc**: compressed sparse column buffers, as handed over by a pack
//!
//! Full and Csc storage exist so that packing host buffers moves them into
//! the handle without copying; any structural mutation converts to Sparse.
//!
//! Single-element writes may be deferred ("non-blocking mode"): they queue up
//! until the handle is settled, either explicitly through
//! [`EngineMatrix::wait`] or implicitly by any primitive that reads entries.
//! [`EngineMatrix::nvals`] does not settle and may over-count while writes
//! are pending.

mod assign;
mod pack;
mod structure;

use crate::config::{global_config, EngineConfig};
use gbarray_core::{
    coords_to_linear, linear_to_coords, validate_coords, validate_dims, validate_parallel,
    BinaryOp, CscParts, Descriptor, Dup, Element, EngineMatrix, Index, IndexList, Info,
    MaskSource, Result, SelectOp, StorageOrder, Tuples,
};
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use parking_lot::{RwLock, RwLockReadGuard};
use rayon::prelude::*;

/// Physical format currently holding a handle's entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFormat {
    Sparse,
    Full,
    Csc,
}

#[derive(Debug, Clone)]
pub(crate) enum Entries<T> {
    Sparse(HashMap<(Index, Index), T>),
    Full(Vec<T>),
    Csc {
        colptr: Vec<Index>,
        rowval: Vec<Index>,
        values: Vec<T>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Store<T> {
    pub(crate) nrows: Index,
    pub(crate) ncols: Index,
    pub(crate) order: StorageOrder,
    pub(crate) entries: Entries<T>,
    pending: Vec<(Index, Index, T)>,
    config: EngineConfig,
}

impl<T: Element> Store<T> {
    fn new(nrows: Index, ncols: Index, config: EngineConfig) -> Self {
        Self {
            nrows,
            ncols,
            order: config.default_order,
            entries: Entries::Sparse(HashMap::new()),
            pending: Vec::new(),
            config,
        }
    }

    fn by_col(&self) -> bool {
        self.order == StorageOrder::ByCol
    }

    pub(crate) fn get(&self, row: Index, col: Index) -> Option<&T> {
        match &self.entries {
            Entries::Sparse(map) => map.get(&(row, col)),
            Entries::Full(values) => {
                let p = coords_to_linear(row, col, self.nrows, self.ncols, self.by_col());
                values.get(p as usize)
            }
            Entries::Csc {
                colptr,
                rowval,
                values,
            } => {
                let start = *colptr.get(col as usize)? as usize;
                let end = *colptr.get(col as usize + 1)? as usize;
                rowval[start..end]
                    .binary_search(&row)
                    .ok()
                    .map(|k| &values[start + k])
            }
        }
    }

    /// Materialised entry count, ignoring pending writes
    pub(crate) fn len(&self) -> usize {
        match &self.entries {
            Entries::Sparse(map) => map.len(),
            Entries::Full(values) => values.len(),
            Entries::Csc { values, .. } => values.len(),
        }
    }

    pub(crate) fn format(&self) -> StorageFormat {
        match &self.entries {
            Entries::Sparse(_) => StorageFormat::Sparse,
            Entries::Full(_) => StorageFormat::Full,
            Entries::Csc { .. } => StorageFormat::Csc,
        }
    }

    pub(crate) fn for_each(&self, mut f: impl FnMut(Index, Index, &T)) {
        match &self.entries {
            Entries::Sparse(map) => map.iter().for_each(|(&(i, j), v)| f(i, j, v)),
            Entries::Full(values) => {
                let by_col = self.by_col();
                for (p, v) in values.iter().enumerate() {
                    let (i, j) = linear_to_coords(p as Index, self.nrows, self.ncols, by_col);
                    f(i, j, v);
                }
            }
            Entries::Csc {
                colptr,
                rowval,
                values,
            } => {
                for j in 0..self.ncols as usize {
                    for k in colptr[j] as usize..colptr[j + 1] as usize {
                        f(rowval[k], j as Index, &values[k]);
                    }
                }
            }
        }
    }

    /// Switch to hash-map storage and hand out the map
    pub(crate) fn sparse_mut(&mut self) -> &mut HashMap<(Index, Index), T> {
        if !matches!(self.entries, Entries::Sparse(_)) {
            let mut map = HashMap::with_capacity(self.len());
            self.for_each(|i, j, v| {
                map.insert((i, j), v.clone());
            });
            self.entries = Entries::Sparse(map);
        }
        match &mut self.entries {
            Entries::Sparse(map) => map,
            _ => unreachable!("entries converted to sparse above"),
        }
    }

    /// Move the entries out as a hash map, leaving the store empty
    pub(crate) fn take_sparse(&mut self) -> HashMap<(Index, Index), T> {
        let map = std::mem::take(self.sparse_mut());
        self.entries = Entries::Sparse(HashMap::new());
        map
    }

    pub(crate) fn settle(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        log::debug!("settling {} pending writes", self.pending.len());
        let pending = std::mem::take(&mut self.pending);
        let (nrows, ncols, by_col) = (self.nrows, self.ncols, self.by_col());
        if let Entries::Full(values) = &mut self.entries {
            for (i, j, v) in pending {
                values[coords_to_linear(i, j, nrows, ncols, by_col) as usize] = v;
            }
            return;
        }
        let map = self.sparse_mut();
        for (i, j, v) in pending {
            map.insert((i, j), v);
        }
    }

    pub(crate) fn insert(&mut self, row: Index, col: Index, value: T) {
        let (nrows, ncols, by_col) = (self.nrows, self.ncols, self.by_col());
        if let Entries::Full(values) = &mut self.entries {
            let p = coords_to_linear(row, col, nrows, ncols, by_col);
            values[p as usize] = value;
            return;
        }
        self.sparse_mut().insert((row, col), value);
    }

    pub(crate) fn remove(&mut self, row: Index, col: Index) {
        if self.get(row, col).is_some() {
            self.sparse_mut().remove(&(row, col));
        }
    }

    /// Stored triples, sorted by the storage order
    pub(crate) fn tuples(&self) -> Vec<(Index, Index, T)> {
        let mut tuples = Vec::with_capacity(self.len());
        self.for_each(|i, j, v| tuples.push((i, j, v.clone())));
        if self.by_col() {
            tuples.par_sort_unstable_by_key(|&(i, j, _)| (j, i));
        } else {
            tuples.par_sort_unstable_by_key(|&(i, j, _)| (i, j));
        }
        tuples
    }
}

/// Engine handle of the in-memory reference engine
pub struct NativeMatrix<T: Element> {
    store: RwLock<Store<T>>,
}

impl<T: Element> NativeMatrix<T> {
    /// Create an empty handle with an explicit configuration
    pub fn with_config(nrows: Index, ncols: Index, config: EngineConfig) -> Result<Self> {
        validate_dims(nrows, ncols)?;
        log::trace!("GrB_Matrix_new_{}({nrows}, {ncols})", T::DATA_TYPE.suffix());
        Ok(Self::from_store(Store::new(nrows, ncols, config)))
    }

    pub(crate) fn from_store(store: Store<T>) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    /// Physical format of the stored entries
    pub fn format(&self) -> StorageFormat {
        self.read().format()
    }

    /// Number of writes waiting for the next settle
    pub fn pending(&self) -> usize {
        self.store.read().pending.len()
    }

    /// Settled read access
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Store<T>> {
        if !self.store.read().pending.is_empty() {
            self.store.write().settle();
        }
        self.store.read()
    }

    /// Settled exclusive access
    pub(crate) fn store_mut(&mut self) -> &mut Store<T> {
        let store = self.store.get_mut();
        store.settle();
        store
    }

    /// Reshape through a shared reference
    ///
    /// Used for the transient vector → row reshape around an assignment; the
    /// caller must reshape back before anyone else observes the handle.
    pub(crate) fn reshape_shared(&self, nrows: Index, ncols: Index, by_col: bool) -> Result<()> {
        let mut store = self.store.write();
        store.settle();
        structure::reshape_store(&mut store, nrows, ncols, by_col)
    }
}

impl<T: Element> Drop for NativeMatrix<T> {
    fn drop(&mut self) {
        let store = self.store.get_mut();
        log::trace!("GrB_Matrix_free({}x{})", store.nrows, store.ncols);
    }
}

impl<T: Element> core::fmt::Debug for NativeMatrix<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let store = self.store.read();
        f.debug_struct("NativeMatrix")
            .field("type", &T::DATA_TYPE)
            .field("nrows", &store.nrows)
            .field("ncols", &store.ncols)
            .field("order", &store.order)
            .field("format", &store.format())
            .field("stored", &store.len())
            .field("pending", &store.pending.len())
            .finish()
    }
}

impl<T: Element> MaskSource for NativeMatrix<T> {
    fn mask_dims(&self) -> (Index, Index) {
        let store = self.store.read();
        (store.nrows, store.ncols)
    }

    fn mask_entry(&self, row: Index, col: Index) -> Option<bool> {
        self.read().get(row, col).map(Element::is_truthy)
    }
}

impl<T: Element> EngineMatrix<T> for NativeMatrix<T> {
    fn new(nrows: Index, ncols: Index) -> Result<Self> {
        Self::with_config(nrows, ncols, global_config())
    }

    fn dup(&self) -> Result<Self> {
        let store = self.read();
        log::trace!("GrB_Matrix_dup({}x{})", store.nrows, store.ncols);
        Ok(Self::from_store(store.clone()))
    }

    fn nrows(&self) -> Index {
        self.store.read().nrows
    }

    fn ncols(&self) -> Index {
        self.store.read().ncols
    }

    fn nvals(&self) -> Result<Index> {
        let store = self.store.read();
        Ok((store.len() + store.pending.len()) as Index)
    }

    fn wait(&self) -> Result<()> {
        self.store.write().settle();
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let store = self.store.get_mut();
        store.pending.clear();
        store.entries = Entries::Sparse(HashMap::new());
        Ok(())
    }

    fn storage_order(&self) -> StorageOrder {
        self.store.read().order
    }

    fn set_storage_order(&mut self, order: StorageOrder) -> Result<()> {
        let store = self.store_mut();
        if store.order != order {
            if let Entries::Full(_) | Entries::Csc { .. } = store.entries {
                store.sparse_mut();
            }
            store.order = order;
        }
        Ok(())
    }

    fn set_element(&mut self, value: T, row: Index, col: Index) -> Result<()> {
        let store = self.store.get_mut();
        validate_coords(row, col, store.nrows, store.ncols)?;
        log::trace!("GrB_Matrix_setElement_{}({row}, {col})", T::DATA_TYPE.suffix());
        if store.config.nonblocking && !matches!(store.entries, Entries::Full(_)) {
            store.pending.push((row, col, value));
            if store.pending.len() >= store.config.pending_limit {
                store.settle();
            }
        } else {
            store.insert(row, col, value);
        }
        Ok(())
    }

    fn extract_element(&self, row: Index, col: Index) -> Result<T> {
        let store = self.read();
        validate_coords(row, col, store.nrows, store.ncols)?;
        store.get(row, col).cloned().ok_or(Info::NoValue)
    }

    fn remove_element(&mut self, row: Index, col: Index) -> Result<()> {
        let store = self.store_mut();
        validate_coords(row, col, store.nrows, store.ncols)?;
        store.remove(row, col);
        Ok(())
    }

    fn build(&mut self, rows: &[Index], cols: &[Index], values: &[T], dup: &Dup<T>) -> Result<()> {
        let store = self.store_mut();
        if store.len() != 0 {
            return Err(Info::OutputNotEmpty);
        }
        validate_parallel(rows.len(), cols.len())?;
        validate_parallel(rows.len(), values.len())?;
        log::trace!("GrB_Matrix_build_{}({} tuples)", T::DATA_TYPE.suffix(), values.len());
        let mut map = HashMap::with_capacity(values.len());
        for ((&i, &j), x) in rows.iter().zip(cols).zip(values) {
            validate_coords(i, j, store.nrows, store.ncols)?;
            match map.entry((i, j)) {
                Entry::Occupied(mut e) => {
                    let merged = dup.combine(e.get(), x)?;
                    e.insert(merged);
                }
                Entry::Vacant(e) => {
                    e.insert(x.clone());
                }
            }
        }
        store.entries = Entries::Sparse(map);
        Ok(())
    }

    fn build_scalar(&mut self, rows: &[Index], cols: &[Index], value: &T) -> Result<()> {
        let store = self.store_mut();
        if store.len() != 0 {
            return Err(Info::OutputNotEmpty);
        }
        validate_parallel(rows.len(), cols.len())?;
        let mut map = HashMap::with_capacity(rows.len());
        for (&i, &j) in rows.iter().zip(cols) {
            validate_coords(i, j, store.nrows, store.ncols)?;
            map.insert((i, j), value.clone());
        }
        store.entries = Entries::Sparse(map);
        Ok(())
    }

    fn extract_tuples(&self) -> Result<Tuples<T>> {
        let tuples = self.read().tuples();
        let mut rows = Vec::with_capacity(tuples.len());
        let mut cols = Vec::with_capacity(tuples.len());
        let mut values = Vec::with_capacity(tuples.len());
        for (i, j, v) in tuples {
            rows.push(i);
            cols.push(j);
            values.push(v);
        }
        Ok((rows, cols, values))
    }

    fn subassign(
        &mut self,
        mask: Option<&dyn MaskSource>,
        accum: Option<BinaryOp<'_, T>>,
        source: &Self,
        rows: IndexList<'_>,
        cols: IndexList<'_>,
        desc: &Descriptor,
    ) -> Result<()> {
        log::trace!("GxB_Matrix_subassign_{}", T::DATA_TYPE.suffix());
        let guard = source.read();
        let source = assign::Source::Array(&guard, desc.transpose_input0);
        assign::subassign(self.store_mut(), mask, accum, source, rows, cols, desc)
    }

    fn subassign_scalar(
        &mut self,
        mask: Option<&dyn MaskSource>,
        accum: Option<BinaryOp<'_, T>>,
        value: &T,
        rows: IndexList<'_>,
        cols: IndexList<'_>,
        desc: &Descriptor,
    ) -> Result<()> {
        log::trace!("GxB_Matrix_subassign_{}_scalar", T::DATA_TYPE.suffix());
        let source = assign::Source::Scalar(value);
        assign::subassign(self.store_mut(), mask, accum, source, rows, cols, desc)
    }

    fn assign(
        &mut self,
        mask: Option<&dyn MaskSource>,
        accum: Option<BinaryOp<'_, T>>,
        source: &Self,
        rows: IndexList<'_>,
        cols: IndexList<'_>,
        desc: &Descriptor,
    ) -> Result<()> {
        log::trace!("GrB_Matrix_assign_{}", T::DATA_TYPE.suffix());
        let guard = source.read();
        let source = assign::Source::Array(&guard, desc.transpose_input0);
        assign::assign(self.store_mut(), mask, accum, source, rows, cols, desc)
    }

    fn assign_scalar(
        &mut self,
        mask: Option<&dyn MaskSource>,
        accum: Option<BinaryOp<'_, T>>,
        value: &T,
        rows: IndexList<'_>,
        cols: IndexList<'_>,
        desc: &Descriptor,
    ) -> Result<()> {
        log::trace!("GrB_Matrix_assign_{}_scalar", T::DATA_TYPE.suffix());
        let source = assign::Source::Scalar(value);
        assign::assign(self.store_mut(), mask, accum, source, rows, cols, desc)
    }

    fn extract(
        &mut self,
        mask: Option<&dyn MaskSource>,
        accum: Option<BinaryOp<'_, T>>,
        source: &Self,
        rows: IndexList<'_>,
        cols: IndexList<'_>,
        desc: &Descriptor,
    ) -> Result<()> {
        log::trace!("GrB_Matrix_extract_{}", T::DATA_TYPE.suffix());
        let region = assign::extract_region(&source.read(), rows, cols, desc.transpose_input0)?;
        let desc = desc.with_transpose_input0(false);
        let source = assign::Source::Array(&region, false);
        assign::assign(self.store_mut(), mask, accum, source, IndexList::All, IndexList::All, &desc)
    }

    fn resize(&mut self, nrows: Index, ncols: Index) -> Result<()> {
        validate_dims(nrows, ncols)?;
        log::trace!("GrB_Matrix_resize({nrows}, {ncols})");
        structure::resize_store(self.store_mut(), nrows, ncols);
        Ok(())
    }

    fn reshape(&mut self, nrows: Index, ncols: Index, by_col: bool) -> Result<()> {
        log::trace!("GxB_Matrix_reshape({nrows}, {ncols}, by_col = {by_col})");
        structure::reshape_store(self.store_mut(), nrows, ncols, by_col)
    }

    fn reshape_dup(&self, nrows: Index, ncols: Index, by_col: bool) -> Result<Self> {
        log::trace!("GxB_Matrix_reshapeDup({nrows}, {ncols}, by_col = {by_col})");
        let mut store = self.read().clone();
        structure::reshape_store(&mut store, nrows, ncols, by_col)?;
        Ok(Self::from_store(store))
    }

    fn concat(tiles: &[Vec<&Self>]) -> Result<Self> {
        log::trace!("GxB_Matrix_concat({} tile rows)", tiles.len());
        let guards: Vec<Vec<_>> = tiles
            .iter()
            .map(|row| row.iter().map(|t| t.read()).collect())
            .collect();
        let stores: Vec<Vec<&Store<T>>> = guards
            .iter()
            .map(|row| row.iter().map(|g| &**g).collect())
            .collect();
        structure::concat_stores(&stores, global_config()).map(Self::from_store)
    }

    fn extract_diag(&self, k: i64) -> Result<Self> {
        log::trace!("GxB_Vector_diag(k = {k})");
        structure::diag_of(&self.read(), k).map(Self::from_store)
    }

    fn from_diag(vector: &Self, k: i64) -> Result<Self> {
        log::trace!("GxB_Matrix_diag(k = {k})");
        structure::matrix_from_diag(&vector.read(), k).map(Self::from_store)
    }

    fn select(&self, op: SelectOp, k: i64) -> Result<Self> {
        log::trace!("GrB_Matrix_select({op:?}, k = {k})");
        Ok(Self::from_store(structure::select_store(&self.read(), op, k)))
    }

    fn pack_full(&mut self, values: Vec<T>, order: StorageOrder) -> Result<()> {
        log::trace!("GxB_Matrix_pack_Full_{}", T::DATA_TYPE.suffix());
        pack::pack_full(self.store.get_mut(), values, order)
    }

    fn unpack_full(&mut self, densify: Option<&T>) -> Result<Vec<T>> {
        log::trace!("GxB_Matrix_unpack_Full_{}", T::DATA_TYPE.suffix());
        pack::unpack_full(self.store_mut(), densify)
    }

    fn pack_csc(&mut self, parts: CscParts<T>) -> Result<()> {
        log::trace!("GxB_Matrix_pack_CSC_{}", T::DATA_TYPE.suffix());
        pack::pack_csc(self.store.get_mut(), parts)
    }

    fn unpack_csc(&mut self) -> Result<CscParts<T>> {
        log::trace!("GxB_Matrix_unpack_CSC_{}", T::DATA_TYPE.suffix());
        Ok(pack::unpack_csc(self.store_mut()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocking(nrows: Index, ncols: Index) -> NativeMatrix<i64> {
        NativeMatrix::with_config(nrows, ncols, EngineConfig::blocking()).unwrap()
    }

    #[test]
    fn test_element_round_trip() {
        let mut m = blocking(3, 3);
        m.set_element(7, 1, 2).unwrap();
        assert_eq!(m.extract_element(1, 2), Ok(7));
        assert_eq!(m.extract_element(0, 0), Err(Info::NoValue));
        assert_eq!(m.extract_element(3, 0), Err(Info::InvalidIndex));
        m.remove_element(1, 2).unwrap();
        m.remove_element(1, 2).unwrap();
        assert_eq!(m.nvals(), Ok(0));
    }

    #[test]
    fn test_pending_writes_settle() {
        let config = EngineConfig::default().with_pending_limit(100);
        let mut m = NativeMatrix::<i64>::with_config(2, 2, config).unwrap();
        m.set_element(1, 0, 0).unwrap();
        m.set_element(2, 0, 0).unwrap();
        assert_eq!(m.pending(), 2);
        // unsettled count includes the overwritten write
        assert_eq!(m.nvals(), Ok(2));
        m.wait().unwrap();
        assert_eq!(m.nvals(), Ok(1));
        assert_eq!(m.extract_element(0, 0), Ok(2));
    }

    #[test]
    fn test_pending_limit_forces_settle() {
        let config = EngineConfig::default().with_pending_limit(2);
        let mut m = NativeMatrix::<i64>::with_config(4, 4, config).unwrap();
        m.set_element(1, 0, 0).unwrap();
        m.set_element(1, 1, 1).unwrap();
        assert_eq!(m.pending(), 0);
    }

    #[test]
    fn test_build_rules() {
        let mut m = blocking(3, 3);
        m.build(&[0, 0, 2], &[0, 0, 1], &[1, 2, 3], &Dup::Plus).unwrap();
        assert_eq!(m.extract_element(0, 0), Ok(3));
        assert_eq!(m.build(&[1], &[1], &[1], &Dup::Plus), Err(Info::OutputNotEmpty));

        let mut m = blocking(3, 3);
        assert_eq!(m.build(&[0, 1], &[0], &[1, 2], &Dup::Plus), Err(Info::DimensionMismatch));
        assert_eq!(m.build(&[0, 0], &[0, 0], &[1, 2], &Dup::Error), Err(Info::InvalidValue));
        // a failed build leaves the handle empty
        assert_eq!(m.nvals(), Ok(0));
    }

    #[test]
    fn test_extract_tuples_follows_order() {
        let mut m = blocking(2, 2);
        m.build(&[0, 1, 0], &[1, 0, 0], &[1, 2, 3], &Dup::Plus).unwrap();
        let (rows, cols, _) = m.extract_tuples().unwrap();
        assert_eq!((rows, cols), (vec![0, 1, 0], vec![0, 0, 1]));

        m.set_storage_order(StorageOrder::ByRow).unwrap();
        let (rows, cols, vals) = m.extract_tuples().unwrap();
        assert_eq!((rows, cols, vals), (vec![0, 0, 1], vec![0, 1, 0], vec![3, 1, 2]));
    }
}
