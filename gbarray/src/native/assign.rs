//! Masked assignment kernels
//!
//! Both kernels first compute the candidate positions of the region: every
//! stored source entry plus every stored output entry that falls inside the
//! region. Positions where neither side stores anything cannot change under
//! any mask, accumulator or replace setting. Writes are collected against the
//! unmodified output and applied afterwards, so duplicate selector indices
//! resolve to the last position that maps onto them.

use super::Store;
use gbarray_core::{BinaryOp, Descriptor, Element, Index, IndexList, Info, MaskSource, Result};
use hashbrown::HashMap;
use rayon::prelude::*;

/// Right-hand side of an assignment
pub(crate) enum Source<'a, T> {
    /// Stored entries of a handle, optionally read transposed
    Array(&'a Store<T>, bool),
    /// One value broadcast over the whole region
    Scalar(&'a T),
}

impl<T: Element> Source<'_, T> {
    fn dims(&self) -> Option<(Index, Index)> {
        match self {
            Source::Array(a, false) => Some((a.nrows, a.ncols)),
            Source::Array(a, true) => Some((a.ncols, a.nrows)),
            Source::Scalar(_) => None,
        }
    }

    fn get(&self, p: Index, q: Index) -> Option<&T> {
        match self {
            Source::Array(a, false) => a.get(p, q),
            Source::Array(a, true) => a.get(q, p),
            Source::Scalar(v) => Some(v),
        }
    }
}

/// Region length along a dimension, after checking every selected index
fn region_len(list: IndexList<'_>, dim: Index) -> Result<Index> {
    if let IndexList::Range { start, end } = list {
        if end > dim || start > end {
            return Err(Info::InvalidIndex);
        }
    }
    match list.max_index(dim) {
        Some(max) if max >= dim => Err(Info::InvalidIndex),
        _ => Ok(list.len(dim)),
    }
}

/// Output index → region positions
struct Inverse<'a> {
    list: IndexList<'a>,
    positions: HashMap<Index, Vec<Index>>,
}

impl<'a> Inverse<'a> {
    fn new(list: IndexList<'a>) -> Self {
        let mut positions: HashMap<Index, Vec<Index>> = HashMap::new();
        if let IndexList::List(indices) = list {
            for (p, &i) in indices.iter().enumerate() {
                positions.entry(i).or_default().push(p as Index);
            }
        }
        Self { list, positions }
    }

    fn visit(&self, index: Index, mut f: impl FnMut(Index)) {
        match self.list {
            IndexList::All => f(index),
            IndexList::Range { start, end } => {
                if (start..end).contains(&index) {
                    f(index - start)
                }
            }
            IndexList::List(_) => {
                if let Some(ps) = self.positions.get(&index) {
                    ps.iter().for_each(|&p| f(p));
                }
            }
        }
    }
}

fn candidates<T: Element>(
    c: &Store<T>,
    source: &Source<'_, T>,
    rows: IndexList<'_>,
    cols: IndexList<'_>,
    region: (Index, Index),
) -> Vec<(Index, Index)> {
    let mut out = Vec::new();
    match source {
        Source::Scalar(_) => {
            for p in 0..region.0 {
                out.extend((0..region.1).map(|q| (p, q)));
            }
            return out;
        }
        Source::Array(a, transposed) => a.for_each(|i, j, _| {
            out.push(if *transposed { (j, i) } else { (i, j) });
        }),
    }
    let (ri, ci) = (Inverse::new(rows), Inverse::new(cols));
    c.for_each(|i, j, _| ri.visit(i, |p| ci.visit(j, |q| out.push((p, q)))));
    out.par_sort_unstable();
    out.dedup();
    out
}

fn accumulate<T: Element>(
    accum: Option<BinaryOp<'_, T>>,
    c: Option<&T>,
    a: Option<&T>,
) -> Option<T> {
    match (accum, c, a) {
        (None, _, a) => a.cloned(),
        (Some(_), c, None) => c.cloned(),
        (Some(_), None, Some(a)) => Some(a.clone()),
        (Some(f), Some(c), Some(a)) => Some(f(c, a)),
    }
}

fn apply<T: Element>(c: &mut Store<T>, writes: Vec<(Index, Index, Option<T>)>) {
    for (i, j, v) in writes {
        match v {
            Some(v) => c.insert(i, j, v),
            None => c.remove(i, j),
        }
    }
}

fn check_source<T: Element>(source: &Source<'_, T>, region: (Index, Index)) -> Result<()> {
    match source.dims() {
        Some(dims) if dims != region => Err(Info::DimensionMismatch),
        _ => Ok(()),
    }
}

/// `C(I,J)<M> = accum(C(I,J), A)` with `M` sized like the region
pub(crate) fn subassign<T: Element>(
    c: &mut Store<T>,
    mask: Option<&dyn MaskSource>,
    accum: Option<BinaryOp<'_, T>>,
    source: Source<'_, T>,
    rows: IndexList<'_>,
    cols: IndexList<'_>,
    desc: &Descriptor,
) -> Result<()> {
    let region = (region_len(rows, c.nrows)?, region_len(cols, c.ncols)?);
    if let Some(m) = mask {
        if m.mask_dims() != region {
            return Err(Info::DimensionMismatch);
        }
    }
    check_source(&source, region)?;

    let mut writes = Vec::new();
    for (p, q) in candidates(c, &source, rows, cols, region) {
        let (i, j) = (rows.get(p), cols.get(q));
        let entry = mask.and_then(|m| m.mask_entry(p, q));
        if desc.mask_allows(entry, mask.is_some()) {
            writes.push((i, j, accumulate(accum, c.get(i, j), source.get(p, q))));
        } else if desc.replace_output {
            writes.push((i, j, None));
        }
    }
    apply(c, writes);
    Ok(())
}

/// `C<M>(I,J) = accum(C(I,J), A)` with `M` sized like `C`
pub(crate) fn assign<T: Element>(
    c: &mut Store<T>,
    mask: Option<&dyn MaskSource>,
    accum: Option<BinaryOp<'_, T>>,
    source: Source<'_, T>,
    rows: IndexList<'_>,
    cols: IndexList<'_>,
    desc: &Descriptor,
) -> Result<()> {
    let region = (region_len(rows, c.nrows)?, region_len(cols, c.ncols)?);
    if let Some(m) = mask {
        if m.mask_dims() != (c.nrows, c.ncols) {
            return Err(Info::DimensionMismatch);
        }
    }
    check_source(&source, region)?;

    let mut z = HashMap::new();
    for (p, q) in candidates(c, &source, rows, cols, region) {
        let (i, j) = (rows.get(p), cols.get(q));
        z.insert((i, j), accumulate(accum, c.get(i, j), source.get(p, q)));
    }

    let allows = |i, j| desc.mask_allows(mask.and_then(|m| m.mask_entry(i, j)), mask.is_some());
    let mut writes = Vec::with_capacity(z.len());
    if desc.replace_output && mask.is_some() {
        c.for_each(|i, j, _| {
            if !z.contains_key(&(i, j)) && !allows(i, j) {
                writes.push((i, j, None));
            }
        });
    }
    for ((i, j), v) in z {
        if allows(i, j) {
            writes.push((i, j, v));
        } else if desc.replace_output {
            writes.push((i, j, None));
        }
    }
    apply(c, writes);
    Ok(())
}

/// `A(I,J)`, optionally reading `A` transposed, as a fresh store
pub(crate) fn extract_region<T: Element>(
    a: &Store<T>,
    rows: IndexList<'_>,
    cols: IndexList<'_>,
    transpose: bool,
) -> Result<Store<T>> {
    let (nrows, ncols) = if transpose { (a.ncols, a.nrows) } else { (a.nrows, a.ncols) };
    let region = (region_len(rows, nrows)?, region_len(cols, ncols)?);
    let mut out = Store::new(region.0, region.1, a.config);
    out.order = a.order;
    let (ri, ci) = (Inverse::new(rows), Inverse::new(cols));
    let map = out.sparse_mut();
    a.for_each(|i, j, v| {
        let (i, j) = if transpose { (j, i) } else { (i, j) };
        ri.visit(i, |p| {
            ci.visit(j, |q| {
                map.insert((p, q), v.clone());
            })
        });
    });
    Ok(out)
}
