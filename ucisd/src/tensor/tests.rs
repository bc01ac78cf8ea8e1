//! Tests for the tensor helpers

#[cfg(test)]
mod tests {
    use super::super::*;
    use ndarray::{Array, Array1, Array2, Array3, Array4, Dimension, ShapeBuilder};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random<Sh: ShapeBuilder>(shape: Sh, rng: &mut StdRng) -> Array<f64, Sh::Dim>
    where
        Sh::Dim: Dimension,
    {
        Array::from_shape_simple_fn(shape, || rng.gen_range(-1.0..1.0))
    }

    fn antisymmetrize(t: &Array4<f64>) -> Array4<f64> {
        let t = t - &t.view().permuted_axes([0, 1, 3, 2]);
        &t - &t.view().permuted_axes([1, 0, 2, 3])
    }

    #[test]
    fn test_einsum_matches_explicit_loops() {
        let mut rng = StdRng::seed_from_u64(7);
        // 'imae,jbem->ijab' with m summed over 3 and e over 2
        let c = random((2, 3, 4, 2), &mut rng);
        let w2 = random((4, 3, 2, 3), &mut rng);
        let out = einsum4("imae,jbem->ijab", c.view(), w2.view());
        assert_eq!(out.dim(), (2, 4, 4, 3));
        for ((i, j, a, b), &v) in out.indexed_iter() {
            let mut expected = 0.0;
            for m in 0..3 {
                for e in 0..2 {
                    expected += c[[i, m, a, e]] * w2[[j, b, e, m]];
                }
            }
            assert!((v - expected).abs() < 1e-12);
        }
    }

    #[test]
    #[should_panic]
    fn test_einsum_rejects_reduced_label() {
        let a = Array2::<f64>::zeros((2, 3));
        let b = Array2::<f64>::zeros((3, 4));
        let _ = einsum2("ik,kj->i", a.view(), b.view());
    }

    #[test]
    fn test_einsum_scalar_and_outer_product() {
        let mut rng = StdRng::seed_from_u64(11);
        let a: Array2<f64> = random((3, 4), &mut rng);
        let b: Array2<f64> = random((3, 4), &mut rng);
        let dot = einsum0("ia,ia->", a.view(), b.view());
        let expected: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        assert!((dot - expected).abs() < 1e-12);

        let outer = einsum4("ia,jb->jiba", a.view(), b.view());
        assert_eq!(outer.dim(), (3, 3, 4, 4));
        assert!((outer[[2, 1, 3, 0]] - a[[1, 0]] * b[[2, 3]]).abs() < 1e-14);
    }

    #[test]
    fn test_tril_pairs_exhaustive() {
        for n in 0..7 {
            let strict = TrilPairs::strict(n);
            let full = TrilPairs::with_diagonal(n);
            assert_eq!(strict.len(), n * n.saturating_sub(1) / 2);
            assert_eq!(full.len(), n * (n + 1) / 2);
            assert_eq!(strict.is_empty(), n < 2);

            for (k, (i, j)) in strict.iter().enumerate() {
                assert!(i > j);
                assert_eq!(strict.index_of(i, j), Some(k));
                assert_eq!(strict.index_of(j, i), Some(k));
                assert_eq!(strict.pair_at(k), (i, j));
            }
            for (k, (i, j)) in full.iter().enumerate() {
                assert!(i >= j);
                assert_eq!(full.index_of(i, j), Some(k));
                assert_eq!(full.pair_at(k), (i, j));
            }
            for i in 0..n {
                assert_eq!(strict.index_of(i, i), None);
            }
        }
        // row-major lower triangle order
        let pairs: Vec<_> = TrilPairs::strict(4).iter().collect();
        assert_eq!(pairs, vec![(1, 0), (2, 0), (2, 1), (3, 0), (3, 1), (3, 2)]);
    }

    #[test]
    fn test_4fold_roundtrip_and_symmetry() {
        let mut rng = StdRng::seed_from_u64(3);
        for &(no, nv) in &[(1, 1), (1, 3), (3, 1), (2, 2), (3, 4), (4, 3)] {
            let packed: Array1<f64> =
                random(TrilPairs::strict(no).len() * TrilPairs::strict(nv).len(), &mut rng);
            let full = unpack_4fold(packed.view(), no, nv);
            assert_eq!(full.dim(), (no, no, nv, nv));
            for ((i, j, a, b), &v) in full.indexed_iter() {
                assert_eq!(v, -full[[j, i, a, b]]);
                assert_eq!(v, -full[[i, j, b, a]]);
                if i == j || a == b {
                    assert_eq!(v, 0.0);
                }
            }
            assert_eq!(pack_4fold(full.view()), packed);

            let t = antisymmetrize(&random((no, no, nv, nv), &mut rng));
            assert_eq!(unpack_4fold(pack_4fold(t.view()).view(), no, nv), t);
        }
    }

    #[test]
    fn test_tril_pack_roundtrip() {
        let mut rng = StdRng::seed_from_u64(5);
        let m: Array2<f64> = random((4, 4), &mut rng);
        let sym = &m + &m.t();
        let packed = pack_tril(sym.view());
        assert_eq!(packed.len(), 10);
        assert_eq!(unpack_tril(packed.view(), 4), sym);

        let block: Array3<f64> = random((2, 3, 6), &mut rng);
        let full = unpack_tril_last(block.view(), 3);
        assert_eq!(full[[1, 2, 0, 2]], full[[1, 2, 2, 0]]);
        assert_eq!(pack_tril_last(full.view()), block);
    }

    #[test]
    fn test_pair_sum() {
        let x = Array2::from_shape_fn((2, 3), |(i, a)| (10 * i + a) as f64);
        let y = Array2::from_shape_fn((1, 2), |(j, b)| (100 * j + 1000 * b) as f64);
        let s = pair_sum(x.view(), y.view());
        assert_eq!(s.dim(), (2, 1, 3, 2));
        assert_eq!(s[[1, 0, 2, 1]], 12.0 + 1000.0);
    }

    #[test]
    fn test_block_size_policy() {
        assert_eq!(choose_block_size(0.0, 8, 100), 2);
        assert_eq!(choose_block_size(-5.0, 8, 100), 2);
        assert_eq!(choose_block_size(8000.0, 8, 100), 10);
        assert_eq!(choose_block_size(8799.0, 8, 100), 10);
        assert!(choose_block_size(1e30, 8, 1) > 1_000_000);
    }

    #[test]
    fn test_block_range_covers_interval() {
        let blocks: Vec<_> = BlockRange::new(0, 7, 3).collect();
        assert_eq!(blocks, vec![(0, 3), (3, 6), (6, 7)]);
        assert_eq!(BlockRange::new(2, 2, 4).count(), 0);
        let blocks: Vec<_> = BlockRange::new(1, 5, usize::MAX).collect();
        assert_eq!(blocks, vec![(1, 5)]);
    }
}
