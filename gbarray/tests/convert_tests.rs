use gbarray::prelude::*;
use gbarray::{Error, Info, StorageFormat};

#[test]
fn dense_pack_unpack_is_exact() {
    let rows = vec![vec![0.1f64, 1e-300, -0.0], vec![f64::MAX, 3.5, 2.0 / 3.0]];
    let mut dense = DenseMatrix::from_rows(&rows).unwrap();
    let original = dense.clone();
    let mut m = GbMatrix::<f64>::from_dense(dense.clone()).unwrap();
    assert_eq!(m.handle().format(), StorageFormat::Full);
    {
        let guard = m.unpack_dense(Some(0.0)).unwrap();
        assert_eq!(&*guard, &original);
    }
    assert_eq!(m.to_dense().unwrap(), original);

    // the shallow path returns the very same buffer
    let shallow = ShallowMatrix::<f64>::pack_dense(&mut dense).unwrap();
    assert_eq!(shallow.to_dense().unwrap(), original);
    shallow.unpack().unwrap();
    assert_eq!(dense, original);
}

#[test]
fn csc_round_trip_preserves_pattern() {
    let csc =
        CscMatrix::from_parts(4, 3, vec![1, 3, 3, 5], vec![1, 4, 2, 3], vec![1, 2, 3, 4]).unwrap();
    let m = GbMatrix::<i64>::from_csc(csc.clone()).unwrap();
    assert_eq!(m.nnz().unwrap(), 4);
    assert_eq!(m.to_csc().unwrap(), csc);

    let r = GbMatrixR::<i64>::from_csc(csc.clone()).unwrap();
    assert_eq!(r.storage_order(), StorageOrder::ByRow);
    assert_eq!(r.to_csc().unwrap(), csc);
}

#[test]
fn materialisation_never_touches_the_source() {
    let m = GbMatrix::<i32>::from_triples(2, 2, &[1], &[1], &[4]).unwrap();
    let before = m.dup().unwrap();
    let _ = m.to_dense().unwrap();
    let _ = m.to_csc().unwrap();
    let _ = m.to_vec().unwrap();
    assert!(m == before);
    assert_eq!(m.handle().format(), before.handle().format());
}

#[test]
fn unpack_bracket_completes_on_early_return() {
    fn scale_first(m: &mut GbMatrix<i32>) -> gbarray::Result<()> {
        let mut guard = m.unpack_dense(Some(0))?;
        guard.values_mut()[0] *= 10;
        // early exit with the guard still alive
        Err(Error::InvalidArgument {
            arg: "m",
            reason: "stop".into(),
        })
    }

    let mut m = GbMatrix::<i32>::from_triples(2, 2, &[1, 2], &[1, 2], &[1, 2]).unwrap();
    assert!(scale_first(&mut m).is_err());
    assert_eq!(m.size(), (2, 2));
    assert_eq!(m.get(1, 1).unwrap().into_inner(), 10);
    assert_eq!(m.nnz().unwrap(), 4);
}

#[test]
fn unpack_without_densify_needs_full_storage() {
    let mut m = GbMatrix::<u8>::new(2, 2).unwrap();
    let err = m.unpack_dense(None).err();
    assert_eq!(err, Some(Error::Engine(Info::InvalidObject)));
    assert_eq!(m.nnz().unwrap(), 0);
}

#[test]
fn csc_guard_exposes_one_based_buffers() {
    let mut m = GbMatrix::<f32>::from_triples(3, 2, &[3, 1], &[1, 2], &[1.0, 2.0]).unwrap();
    {
        let mut guard = m.unpack_csc().unwrap();
        assert_eq!(guard.colptr(), &[1, 2, 3]);
        assert_eq!(guard.rowval(), &[3, 1]);
        guard.nzval_mut().iter_mut().for_each(|x| *x += 0.5);
        guard.repack().unwrap();
    }
    assert_eq!(m.nonzeros().unwrap(), vec![1.5, 2.5]);
    assert_eq!(m.handle().format(), StorageFormat::Csc);
}

#[test]
fn shallow_vector_and_vector_casts() {
    let mut values = vec![1u32, 0, 7];
    {
        let v = ShallowVector::<u32>::pack(&mut values).unwrap();
        assert_eq!(v.get_at(3).unwrap().into_inner(), 7);
        assert_eq!(v.to_vec().unwrap(), vec![1, 0, 7]);
    }
    assert_eq!(values, vec![1, 0, 7]);

    let v = GbVector::<u32>::from_vec(vec![1, 0, 7]).unwrap();
    let w = v.cast::<i8>().unwrap();
    assert_eq!(w.nonzeros().unwrap(), vec![1, 0, 7]);
    let big = GbVector::<u32>::from_vec(vec![1000]).unwrap();
    assert!(matches!(big.cast::<i8>(), Err(Error::Conversion { .. })));
}
