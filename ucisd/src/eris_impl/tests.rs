//! Tests for the integral container and the reference it is built from

#[cfg(test)]
mod tests {
    use super::super::{unpack_ovvv, UEris};
    use crate::tensor::{unpack_tril, TrilPairs};
    use crate::testing::random_reference;
    use ndarray::Array4;

    #[test]
    fn test_fock_and_reference_energy() {
        let reference = random_reference(6, (3, 2), 1);
        let (nocca, noccb) = reference.nocc();
        for fock in [&reference.focka, &reference.fockb] {
            for ((p, q), &v) in fock.indexed_iter() {
                assert!((v - fock[[q, p]]).abs() < 1e-12);
            }
        }

        // E = sum_i h_ii + 1/2 sum_ij <ij||ij> with both spins
        let mut e = 0.0;
        for i in 0..nocca {
            e += reference.h1a[[i, i]];
            for j in 0..nocca {
                e += 0.5 * (reference.eri_aa[[i, i, j, j]] - reference.eri_aa[[i, j, j, i]]);
            }
            for j in 0..noccb {
                e += reference.eri_ab[[i, i, j, j]];
            }
        }
        for i in 0..noccb {
            e += reference.h1b[[i, i]];
            for j in 0..noccb {
                e += 0.5 * (reference.eri_bb[[i, i, j, j]] - reference.eri_bb[[i, j, j, i]]);
            }
        }
        assert!((reference.e_elec() - e).abs() < 1e-10);
        assert!((reference.e_hf() - e - 1.5).abs() < 1e-10);
        assert_eq!(reference.nelectron(), 5);
    }

    #[test]
    fn test_blocks_match_full_integrals() {
        let reference = random_reference(5, (2, 3), 2);
        let eris = reference.make_eris().unwrap();
        let (nocca, noccb) = eris.nocc();
        let (nvira, nvirb) = eris.nvir();
        assert_eq!((nvira, nvirb), (3, 2));
        let (aa, ab, bb) = (&reference.eri_aa, &reference.eri_ab, &reference.eri_bb);

        assert_eq!(eris.aa.oooo[[1, 0, 0, 1]], aa[[1, 0, 0, 1]]);
        assert_eq!(eris.aa.ovoo[[1, 2, 0, 1]], aa[[1, nocca + 2, 0, 1]]);
        assert_eq!(eris.aa.oovv[[0, 1, 2, 0]], aa[[0, 1, nocca + 2, nocca]]);
        assert_eq!(eris.bb.ovvo[[2, 1, 0, 1]], bb[[2, noccb + 1, noccb, 1]]);
        assert_eq!(eris.ab.oooo[[1, 0, 2, 1]], ab[[1, 0, 2, 1]]);
        assert_eq!(eris.ab.ovvo[[1, 2, 1, 0]], ab[[1, nocca + 2, noccb + 1, 0]]);
        assert_eq!(eris.ab.ovoo_ba[[2, 1, 0, 1]], ab[[0, 1, 2, noccb + 1]]);
        assert_eq!(eris.ab.oovv_ba[[2, 0, 1, 2]], ab[[nocca + 1, nocca + 2, 2, 0]]);

        let ovvv = unpack_ovvv(&eris.aa.ovvv, 1, 3, nvira);
        assert_eq!(ovvv.dim(), (nocca, 2, nvira, nvira));
        assert_eq!(ovvv[[1, 0, 2, 0]], aa[[1, nocca + 1, nocca + 2, nocca]]);
        assert_eq!(ovvv[[1, 0, 0, 2]], aa[[1, nocca + 1, nocca + 2, nocca]]);

        let ovvv_ba = unpack_ovvv(&eris.ab.ovvv_ba, 0, nvirb, nvira);
        assert_eq!(ovvv_ba[[2, 1, 0, 2]], ab[[nocca + 2, nocca, 2, noccb + 1]]);

        let [vvvv, vv_vv, _] = eris.vvvv_blocks().unwrap();
        let pairs_a = TrilPairs::with_diagonal(nvira);
        let pairs_b = TrilPairs::with_diagonal(nvirb);
        assert_eq!(vvvv.dim(), (pairs_a.len(), pairs_a.len()));
        assert_eq!(vv_vv.dim(), (pairs_a.len(), pairs_b.len()));
        let ab_cd = vvvv[[pairs_a.index_of(2, 1).unwrap(), pairs_a.index_of(0, 0).unwrap()]];
        assert_eq!(ab_cd, aa[[nocca + 2, nocca + 1, nocca, nocca]]);
        let row = unpack_tril(vv_vv.row(pairs_a.index_of(1, 0).unwrap()), nvirb);
        assert_eq!(row[[0, 1]], ab[[nocca + 1, nocca, noccb + 1, noccb]]);
    }

    #[test]
    fn test_missing_vvvv_is_a_lookup_error() {
        let eris: UEris = random_reference(4, (2, 1), 3).make_eris().unwrap().without_vvvv();
        let err = eris.vvvv_blocks().unwrap_err();
        assert!(err.to_string().contains("`vvvv`"));
        assert!(eris.memory_mb() > 0.0);
    }

    #[test]
    fn test_mismatched_integrals_are_an_error() {
        let reference = random_reference(4, (2, 1), 5);
        let (focka, fockb) = (reference.focka.view(), reference.fockb.view());
        let (aa, ab) = (reference.eri_aa.view(), reference.eri_ab.view());

        let short = Array4::<f64>::zeros((4, 4, 4, 3));
        let err = UEris::from_mo_integrals(focka, fockb, aa, ab, short.view(), (2, 1)).unwrap_err();
        assert!(err.to_string().contains("eri_bb"));

        let bb = reference.eri_bb.view();
        let err = UEris::from_mo_integrals(focka, fockb, aa, ab, bb, (5, 1)).unwrap_err();
        assert!(err.to_string().contains("more occupied"));

        assert!(UEris::from_mo_integrals(focka, fockb, aa, ab, bb, (2, 1)).is_ok());
    }
}
