//! Tests for the CISD vector codec

#[cfg(test)]
mod tests {
    use super::super::{amplitudes_to_cisdvec, cisdvec_to_amplitudes, CisdAmplitudes, CisdLayout};
    use crate::testing::random_amplitudes;
    use ndarray::{Array1, Array2, Array4};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_layout_sizes_and_offsets() {
        let layout = CisdLayout::from_nmo_nocc((6, 6), (3, 2));
        assert_eq!(layout.nvira, 3);
        assert_eq!(layout.nvirb, 4);
        assert_eq!(layout.sizes(), [1, 9, 8, 72, 9, 6]);
        assert_eq!(layout.offsets(), [1, 10, 18, 90, 99, 105]);
        assert_eq!(layout.len(), 105);
        assert_eq!(layout.nmo(), (6, 6));
        assert_eq!(layout.nocc(), (3, 2));
    }

    #[test]
    fn test_roundtrip_is_exact() {
        let mut rng = StdRng::seed_from_u64(42);
        let cases = [
            ((4, 4), (2, 2)),
            ((6, 6), (3, 2)),
            ((5, 6), (1, 1)),
            ((4, 4), (3, 3)),
            ((3, 5), (2, 4)),
            ((7, 7), (4, 3)),
        ];
        for (nmo, nocc) in cases {
            let layout = CisdLayout::from_nmo_nocc(nmo, nocc);
            let amps = random_amplitudes(&layout, &mut rng);
            let civec = amplitudes_to_cisdvec(&amps);
            assert_eq!(civec.len(), layout.len());
            let back = cisdvec_to_amplitudes(civec.view(), nmo, nocc).unwrap();
            assert_eq!(back, amps);
            assert_eq!(amplitudes_to_cisdvec(&back), civec);
        }
    }

    #[test]
    fn test_segment_placement() {
        // nocca = 2, nvira = 2 gives exactly one same-spin double (1,0,1,0)
        let layout = CisdLayout::from_nmo_nocc((4, 3), (2, 1));
        let mut amps = CisdAmplitudes::zeros(&layout);
        amps.c0 = 0.5;
        amps.c1a[[1, 0]] = 1.0;
        amps.c1b[[0, 1]] = 2.0;
        amps.c2ab[[1, 0, 1, 1]] = 3.0;
        amps.c2aa[[1, 0, 1, 0]] = 4.0;
        amps.c2aa[[0, 1, 1, 0]] = -4.0;
        amps.c2aa[[1, 0, 0, 1]] = -4.0;
        amps.c2aa[[0, 1, 0, 1]] = 4.0;

        let civec = amplitudes_to_cisdvec(&amps);
        let loc = layout.offsets();
        assert_eq!(civec[0], 0.5);
        assert_eq!(civec[loc[0] + 2], 1.0);
        assert_eq!(civec[loc[1] + 1], 2.0);
        assert_eq!(civec[loc[2] + 4 + 2 + 1], 3.0);
        assert_eq!(civec[loc[3]], 4.0);
        assert_eq!(loc[5] - loc[4], 0);
    }

    #[test]
    fn test_empty_triangles() {
        let layout = CisdLayout::from_nmo_nocc((2, 5), (1, 4));
        assert_eq!(layout.sizes()[4], 0);
        assert_eq!(layout.sizes()[5], 0);
        let civec = Array1::from_shape_fn(layout.len(), |k| k as f64);
        let amps = cisdvec_to_amplitudes(civec.view(), (2, 5), (1, 4)).unwrap();
        assert_eq!(amps.c2aa, Array4::zeros((1, 1, 1, 1)));
        assert_eq!(amps.c2bb, Array4::zeros((4, 4, 1, 1)));
        assert_eq!(amps.c1a, Array2::from_elem((1, 1), 1.0));
        assert_eq!(amplitudes_to_cisdvec(&amps), civec);
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let civec = Array1::zeros(10);
        let err = cisdvec_to_amplitudes(civec.view(), (4, 4), (2, 2)).unwrap_err();
        assert!(err.to_string().contains("length 10"));
    }

    #[test]
    fn test_too_many_occupied_is_an_error() {
        let civec = Array1::zeros(1);
        let err = cisdvec_to_amplitudes(civec.view(), (2, 2), (3, 1)).unwrap_err();
        assert!(err.to_string().contains("more occupied than total orbitals"));
        assert!(CisdLayout::try_from_nmo_nocc((4, 2), (2, 3)).is_err());
        assert_eq!(
            CisdLayout::try_from_nmo_nocc((4, 3), (2, 3)).unwrap(),
            CisdLayout::from_nmo_nocc((4, 3), (2, 3))
        );
    }
}
