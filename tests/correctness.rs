use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strided_array::stride::next_coords;
use strided_array::{
    Array, ArrayFactory, DoubleArray, IndexArray, Indexer, MajorOrder, StridedRange,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn factory(order: MajorOrder) -> ArrayFactory {
    ArrayFactory::builder().order(order).build()
}

fn make_tensor(order: MajorOrder, shape: &[usize]) -> DoubleArray {
    // value encodes the coordinates, independent of the layout
    factory(order).from_fn(shape, |c| c.iter().fold(0.0, |acc, &i| acc * 10.0 + i as f64))
}

fn all_coords(shape: &[usize], order: MajorOrder) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if shape.iter().any(|&n| n == 0) {
        return out;
    }
    let mut coords = vec![0; shape.len()];
    loop {
        out.push(coords.clone());
        if !next_coords(&mut coords, shape, order) {
            break;
        }
    }
    out
}

#[test]
fn test_concrete_scenario() {
    init_logger();
    let f = ArrayFactory::default();
    let a: Array<i32> = f.from_vec(&[2, 3], (0..6).collect()).unwrap();

    let t = a.transpose().unwrap();
    assert_eq!(t.shape(), &[3, 2]);
    assert_eq!(t.get(&[1, 0]).unwrap(), 1);

    assert_eq!(a.get_vector(0, 1).unwrap().to_vec(), vec![1, 4]);

    let b = f.array(vec![10, 20, 30]);
    let c = a.plus(&b).unwrap();
    assert_eq!(c.shape(), &[2, 3]);
    assert_eq!(c.to_vec(), vec![10, 21, 32, 13, 24, 35]);
}

#[test]
fn test_transpose_round_trip() {
    for order in [MajorOrder::RowMajor, MajorOrder::ColMajor] {
        let a = make_tensor(order, &[2, 3, 4]);
        let tt = a.transpose().unwrap().transpose().unwrap();
        assert_eq!(tt.shape(), a.shape());
        assert_eq!(tt.stride(), a.stride());
        assert!(tt == a);
        assert!(tt.shares_storage(&a));
    }
}

#[test]
fn test_reshape_same_shape_is_identity() {
    let a = make_tensor(MajorOrder::RowMajor, &[3, 4]);
    let r = a.reshape(&[3, 4]).unwrap();
    assert!(r == a);
    assert!(r.shares_storage(&a));
}

#[test]
fn test_views_alias_storage() {
    init_logger();
    let a = make_tensor(MajorOrder::RowMajor, &[4, 5]);

    a.select(2).unwrap().set(&[1], -1.0).unwrap();
    assert_eq!(a.get(&[2, 1]).unwrap(), -1.0);

    a.get_vector(0, 3).unwrap().set(&[0], -2.0).unwrap();
    assert_eq!(a.get(&[0, 3]).unwrap(), -2.0);

    a.get_view(1, 1, 2, 2).unwrap().set(&[1, 1], -3.0).unwrap();
    assert_eq!(a.get(&[2, 2]).unwrap(), -3.0);

    a.get_diagonal().unwrap().set(&[3], -4.0).unwrap();
    assert_eq!(a.get(&[3, 3]).unwrap(), -4.0);
}

#[test]
fn test_broadcast_identity_and_expansion() {
    let a = make_tensor(MajorOrder::ColMajor, &[3, 2]);
    let same = a.broadcast_to(&[3, 2]).unwrap();
    assert!(same == a);

    let one = factory(MajorOrder::RowMajor).array(vec![7.0]);
    let wide = one.broadcast_to(&[5]).unwrap();
    assert_eq!(wide.stride(), &[0]);
    assert_eq!(wide.to_vec(), vec![7.0; 5]);
}

#[test]
fn test_reduction_shape_law() {
    let a = make_tensor(MajorOrder::RowMajor, &[2, 3, 4, 5]);
    for dim in 0..4 {
        let r = a.reduce_vectors(dim, |v| v.sum()).unwrap();
        let mut expected: Vec<usize> = a.shape().to_vec();
        expected.remove(dim);
        assert_eq!(r.shape(), expected.as_slice());
        // every vector sums to the matching output element
        for i in 0..a.vectors(dim).unwrap() {
            assert_relative_eq!(r.get_flat(i).unwrap(), a.get_vector(dim, i).unwrap().sum());
        }
    }
}

#[test]
fn test_sum_dim_matches_manual() {
    let a = make_tensor(MajorOrder::ColMajor, &[3, 4]);
    let s = a.sum_dim(1).unwrap();
    for i in 0..3 {
        let expected: f64 = (0..4).map(|j| a.get(&[i, j]).unwrap()).sum();
        assert_relative_eq!(s.get(&[i]).unwrap(), expected);
    }
}

#[test]
fn test_fancy_index_round_trip() {
    let f = ArrayFactory::default();
    let a = make_tensor(MajorOrder::RowMajor, &[5, 3]);
    let picks: IndexArray = f.array(vec![4, 0, 2]);
    let indexers = [Indexer::Array(picks)];

    let gathered = a.get_indexed(&indexers).unwrap();
    assert_eq!(gathered.shape(), &[3, 3]);

    let b: DoubleArray = f.zeros(&[5, 3]);
    b.set_indexed(&indexers, &gathered).unwrap();
    assert!(b.get_indexed(&indexers).unwrap() == gathered);
    for j in 0..3 {
        assert_eq!(b.get(&[4, j]).unwrap(), a.get(&[4, j]).unwrap());
        assert_eq!(b.get(&[1, j]).unwrap(), 0.0);
    }
}

#[test]
fn test_fancy_index_placement() {
    let f = ArrayFactory::default();
    let a = make_tensor(MajorOrder::RowMajor, &[2, 3, 4, 5]);
    let i: IndexArray = f.array(vec![0, 1, 1]);
    let j: IndexArray = f.array(vec![3, 0, 2]);

    // adjacent advanced indexers replace their dimensions in place
    let adjacent = a
        .get_indexed(&[Indexer::All, Indexer::All, i.clone().into(), j.clone().into()])
        .unwrap();
    assert_eq!(adjacent.shape(), &[2, 3, 3]);

    // separated by a basic dimension: the broadcast shape moves to the front
    let separated = a
        .get_indexed(&[
            i.clone().into(),
            StridedRange::new(0, 3, 2).into(),
            j.clone().into(),
        ])
        .unwrap();
    assert_eq!(separated.shape(), &[3, 2, 5]);
    for k in 0..3 {
        let (ik, jk) = (i.get(&[k]).unwrap(), j.get(&[k]).unwrap());
        for (r, row) in [0, 2].into_iter().enumerate() {
            for m in 0..5 {
                assert_eq!(
                    separated.get(&[k, r, m]).unwrap(),
                    a.get(&[ik, row, jk, m]).unwrap()
                );
            }
        }
    }
}

#[test]
fn test_get_slice_matches_indexing() {
    let f = ArrayFactory::default();
    let a = make_tensor(MajorOrder::RowMajor, &[4, 3, 2]);
    let rows: IndexArray = f.array(vec![3, 1]);
    let cols: IndexArray = f.array(vec![0, 2]);
    let sliced = a.get_slice(&[rows.clone(), cols.clone()]).unwrap();
    let indexed = a.get_indexed(&[rows.into(), cols.into()]).unwrap();
    assert_eq!(sliced.shape(), &[2, 2]);
    assert!(sliced == indexed);
}

#[test]
fn test_flip_and_slice_compose() {
    let a = make_tensor(MajorOrder::RowMajor, &[6]);
    let r = a
        .flip(0)
        .unwrap()
        .slice(&[StridedRange::new(1, 6, 2)])
        .unwrap();
    // reversed [5 4 3 2 1 0], then every other from index 1
    assert_eq!(r.to_vec(), vec![4.0, 2.0, 0.0]);
}

/// A random view of a fresh tensor: transposed, permuted, sliced or flipped.
fn random_layout(rng: &mut StdRng, order: MajorOrder) -> DoubleArray {
    let rank = rng.gen_range(1..=4);
    let shape: Vec<usize> = (0..rank).map(|_| rng.gen_range(1..=4)).collect();
    let base = make_tensor(order, &shape);
    match rng.gen_range(0..5) {
        0 => base,
        1 => base.transpose().unwrap(),
        2 => {
            let mut axes: Vec<usize> = (0..rank).collect();
            for i in (1..rank).rev() {
                let j = rng.gen_range(0..=i);
                axes.swap(i, j);
            }
            base.permute(&axes).unwrap()
        }
        3 => {
            let ranges: Vec<StridedRange> = shape
                .iter()
                .map(|&n| {
                    let start = rng.gen_range(0..n);
                    let step = rng.gen_range(1..=2);
                    StridedRange::new(start, n, step)
                })
                .collect();
            base.slice(&ranges).unwrap()
        }
        _ => {
            let dim = rng.gen_range(0..rank);
            base.flip(dim).unwrap()
        }
    }
}

#[test]
fn test_get_vector_against_coordinate_oracle() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for order in [MajorOrder::RowMajor, MajorOrder::ColMajor] {
        for _ in 0..200 {
            let a = random_layout(&mut rng, order);
            let dim = rng.gen_range(0..a.rank());

            let mut rest = a.shape().to_vec();
            rest.remove(dim);
            let enumerated = all_coords(&rest, order);
            assert_eq!(enumerated.len(), a.vectors(dim).unwrap());

            for (index, coords) in enumerated.iter().enumerate() {
                let v = a.get_vector(dim, index).unwrap();
                let expected: Vec<f64> = (0..a.shape()[dim])
                    .map(|k| {
                        let mut full = coords.clone();
                        full.insert(dim, k);
                        a.get(&full).unwrap()
                    })
                    .collect();
                assert_eq!(
                    v.to_vec(),
                    expected,
                    "shape {:?} stride {:?} dim {} index {}",
                    a.shape(),
                    a.stride(),
                    dim,
                    index
                );
            }
        }
    }
}

#[test]
fn test_copy_is_contiguous_for_any_layout() {
    let mut rng = StdRng::seed_from_u64(7);
    for order in [MajorOrder::RowMajor, MajorOrder::ColMajor] {
        for _ in 0..50 {
            let a = random_layout(&mut rng, order);
            let c = a.copy();
            assert!(c.is_contiguous());
            assert!(!c.shares_storage(&a));
            assert!(c == a);
            let r = a.ravel().unwrap();
            assert_eq!(r.to_vec(), a.to_vec());
        }
    }
}
