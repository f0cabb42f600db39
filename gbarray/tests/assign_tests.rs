use gbarray::prelude::*;
use gbarray::{Descriptor, Error};

fn grid(n: u64) -> GbMatrix<i64> {
    // entry (i, j) holds 10 * i + j
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut values = Vec::new();
    for i in 1..=n {
        for j in 1..=n {
            rows.push(i);
            cols.push(j);
            values.push((10 * i + j) as i64);
        }
    }
    GbMatrix::from_triples(n, n, &rows, &cols, &values).unwrap()
}

#[test]
fn subassign_leaves_outside_region_untouched() {
    let mut c = grid(3);
    let a = GbMatrix::<i64>::new(2, 2).unwrap();
    let mask = GbMatrix::<bool>::from_triples(2, 2, &[1], &[1], &[true]).unwrap();
    let opts = AssignOptions::new().mask(&mask).replace(true);
    c.subassign(&a, Selector::Range(2..=3), Selector::Range(2..=3), &opts).unwrap();
    // the masked position takes A's absent value, replace clears the rest of the region
    assert!(!c.is_stored(2, 2).unwrap());
    assert!(!c.is_stored(2, 3).unwrap());
    assert!(!c.is_stored(3, 3).unwrap());
    assert_eq!(c.nnz().unwrap(), 5);
    assert_eq!(c.get(1, 1).unwrap().into_inner(), 11);
}

#[test]
fn assign_replace_clears_outside_region() {
    let mut c = grid(3);
    let mask = GbMatrix::<bool>::from_triples(3, 3, &[1, 3], &[1, 3], &[true, true]).unwrap();
    let opts = AssignOptions::new().mask(&mask).replace(true);
    c.assign_scalar(0, Selector::Index(1), Selector::Index(1), &opts).unwrap();
    assert_eq!(c.findnz().unwrap(), (vec![1, 3], vec![1, 3], vec![0, 33]));
}

#[test]
fn complemented_structural_mask() {
    let mut c = GbMatrix::<i64>::new(2, 2).unwrap();
    // a stored false still selects under a structural mask
    let mask = GbMatrix::<bool>::from_triples(2, 2, &[1], &[1], &[false]).unwrap();
    let opts = AssignOptions::new().mask(&mask).structural(true).complement(true);
    c.subassign_scalar(1, .., .., &opts).unwrap();
    assert!(!c.is_stored(1, 1).unwrap());
    assert_eq!(c.nnz().unwrap(), 3);
}

#[test]
fn accumulator_combines_with_existing() {
    let mut c = grid(2);
    let a = grid(2);
    let minus = |old: &i64, new: &i64| old - new;
    let opts = AssignOptions::<i64>::new().accum(&minus);
    c.subassign(&a, .., .., &opts).unwrap();
    assert_eq!(c.nonzeros().unwrap(), vec![0, 0, 0, 0]);
    assert_eq!(c.nnz().unwrap(), 4);
}

#[test]
fn transposed_source() {
    let mut c = GbMatrix::<i64>::new(2, 3).unwrap();
    let a = GbMatrix::<i64>::from_triples(3, 2, &[3], &[1], &[9]).unwrap();
    let opts = AssignOptions::new().descriptor(Descriptor::new().with_transpose_input0(true));
    c.subassign(&a, .., .., &opts).unwrap();
    assert_eq!(c.get(1, 3).unwrap().into_inner(), 9);
}

#[test]
fn unsorted_list_and_range_selectors() {
    let mut c = GbMatrix::<i64>::new(4, 4).unwrap();
    let rows: Vec<u64> = vec![4, 1];
    c.subassign_scalar(2, &rows, Selector::Range(2..=3), &AssignOptions::new()).unwrap();
    assert_eq!(c.findnz().unwrap(), (vec![1, 4, 1, 4], vec![2, 2, 3, 3], vec![2, 2, 2, 2]));
}

#[test]
fn source_shape_must_match_region() {
    let mut c = grid(3);
    let a = grid(2);
    let err = c.subassign(&a, .., .., &AssignOptions::new()).unwrap_err();
    assert!(err.is_dimension_mismatch());
    assert!(c == grid(3));
}

#[test]
fn vector_assigned_into_row_and_column() {
    let mut c = GbMatrix::<f64>::new(3, 3).unwrap();
    let v = GbVector::<f64>::from_vec(vec![1.0, 2.0, 3.0]).unwrap();
    c.subassign(&v, .., Selector::Index(3), &AssignOptions::new()).unwrap();
    c.subassign(&v, Selector::Index(1), .., &AssignOptions::new()).unwrap();
    assert_eq!(c.get(3, 3).unwrap().into_inner(), 3.0);
    assert_eq!(c.get(1, 2).unwrap().into_inner(), 2.0);
    assert_eq!(v.size(), (3, 1));
    assert_eq!(v.nnz().unwrap(), 3);
}

#[test]
fn host_buffers_are_restored_after_assignment() {
    let mut c = GbMatrix::<i32>::new(2, 2).unwrap();
    let mut dense = DenseMatrix::from_rows(&[vec![1i16, 2], vec![3, 4]]).unwrap();
    let before = dense.clone();
    c.assign_dense(&mut dense, .., .., &AssignOptions::new()).unwrap();
    assert_eq!(dense, before);
    assert_eq!(c.nonzeros().unwrap(), vec![1, 3, 2, 4]);

    let mut narrow = GbMatrix::<u8>::new(2, 2).unwrap();
    let mut negative = DenseMatrix::from_rows(&[vec![-1i32, 0], vec![0, 0]]).unwrap();
    let err = narrow.assign_dense(&mut negative, .., .., &AssignOptions::new()).unwrap_err();
    assert!(matches!(err, Error::Conversion { .. }));
    assert_eq!(negative.values(), &[-1, 0, 0, 0]);
}

#[test]
fn extract_with_mask() {
    let a = grid(3);
    let mut c = GbMatrix::<i64>::new(2, 2).unwrap();
    let mask = GbMatrix::<bool>::from_triples(2, 2, &[2], &[2], &[true]).unwrap();
    let opts = AssignOptions::new().mask(&mask);
    c.extract(&a, Selector::Range(2..=3), Selector::Range(2..=3), &opts).unwrap();
    assert_eq!(c.findnz().unwrap(), (vec![2], vec![2], vec![33]));
}

#[test]
fn shallow_arrays_are_not_outputs() {
    let mut dense = DenseMatrix::from_rows(&[vec![1.0f64]]).unwrap();
    let mut s = ShallowMatrix::<f64>::pack_dense(&mut dense).unwrap();
    let a = GbMatrix::<f64>::new(1, 1).unwrap();
    assert_eq!(s.subassign(&a, .., .., &AssignOptions::new()), Err(Error::ReadOnly));
    assert_eq!(s.build(&[1], &[1], &[1.0], Dup::Plus), Err(Error::ReadOnly));
    drop(s);
    assert_eq!(dense.values(), &[1.0]);
}
