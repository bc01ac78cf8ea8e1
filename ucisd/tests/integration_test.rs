//! Integration tests for the UCISD engine
//!
//! Hubbard rings are small enough to diagonalize the CISD matrix densely, and
//! the two-site ring has a closed-form ground-state energy.

use nalgebra::DMatrix;
use ndarray::{Array1, Array2, Array4};
use ucisd::{AmplitudeHamiltonian, CisdLayout, Config, UhfReference, UCISD};

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// Hubbard ring expressed in the orbitals of its hopping matrix
    fn hubbard_ring(nsites: usize, nocc: usize, t: f64, u: f64) -> UhfReference {
        let mut hop = DMatrix::<f64>::zeros(nsites, nsites);
        for k in 0..nsites {
            let next = (k + 1) % nsites;
            if next != k {
                hop[(k, next)] = -t;
                hop[(next, k)] = -t;
            }
        }
        let eigen = hop.clone().symmetric_eigen();
        let mut order: Vec<usize> = (0..nsites).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
        let c = Array2::from_shape_fn((nsites, nsites), |(k, p)| eigen.eigenvectors[(k, order[p])]);

        let h_site = Array2::from_shape_fn((nsites, nsites), |(p, q)| hop[(p, q)]);
        let h1 = c.t().dot(&h_site).dot(&c);
        let eri = Array4::from_shape_fn((nsites, nsites, nsites, nsites), |(p, q, r, s)| {
            (0..nsites)
                .map(|k| u * c[[k, p]] * c[[k, q]] * c[[k, r]] * c[[k, s]])
                .sum::<f64>()
        });

        UhfReference::new(
            h1.clone(),
            h1,
            eri.clone(),
            eri.clone(),
            eri,
            (nocc, nocc),
            0.0,
        )
        .unwrap()
    }

    fn lowest_dense_eigenvalue(ci: &UCISD, eris: &ucisd::UEris) -> f64 {
        let n = CisdLayout::from_nmo_nocc(ci.nmo(), ci.nocc()).len();
        let mut h = DMatrix::<f64>::zeros(n, n);
        for k in 0..n {
            let mut unit = Array1::zeros(n);
            unit[k] = 1.0;
            let column = ci.hamiltonian().contract(unit.view(), eris).unwrap();
            for (i, v) in column.iter().enumerate() {
                h[(i, k)] = *v;
            }
        }
        let sym = (&h + h.transpose()) * 0.5;
        sym.symmetric_eigen().eigenvalues.iter().copied().fold(f64::INFINITY, f64::min)
    }

    fn config() -> Config {
        let yaml = r#"
cisd:
  conv_tol: 1e-12
  max_cycle: 100
  max_space: 16
"#;
        Config::from_yaml_str(yaml).unwrap()
    }

    #[test]
    fn test_two_site_hubbard_is_exact() {
        ucisd::io::setup_output(None).unwrap();
        let (t, u) = (1.0, 2.0);
        let reference = hubbard_ring(2, 1, t, u);
        let mut ci = UCISD::new(reference, config().cisd);
        let eris = ci.ao2mo().unwrap();
        ci.kernel(&eris).unwrap();

        let exact = 0.5 * (u - (u * u + 16.0 * t * t).sqrt());
        let e_tot = ci.e_tot().unwrap();
        assert!((e_tot - exact).abs() < 1e-8, "{} vs {}", e_tot, exact);
        assert!(ci.converged[0]);
    }

    #[test]
    fn test_six_site_ring_matches_dense_diagonalization() {
        ucisd::io::setup_output(None).unwrap();
        let reference = hubbard_ring(6, 3, 1.0, 1.0);
        let mut ci = UCISD::new(reference, config().cisd);
        let eris = ci.ao2mo().unwrap();
        let exact = lowest_dense_eigenvalue(&ci, &eris);

        let e_corr = ci.kernel(&eris).unwrap();
        assert!(e_corr < 0.0);
        assert!(ci.emp2.unwrap() < 0.0);
        assert!((e_corr - exact).abs() < 1e-8, "{} vs {}", e_corr, exact);
    }

    #[test]
    fn test_six_site_ring_densities() {
        ucisd::io::setup_output(None).unwrap();
        let reference = hubbard_ring(6, 3, 1.0, 1.0);
        let mut ci = UCISD::new(reference, config().cisd);
        let eris = ci.ao2mo().unwrap();
        let e_corr = ci.kernel(&eris).unwrap();

        let (dm1a, dm1b) = ci.make_rdm1(None).unwrap();
        let (dm2aa, dm2ab, dm2bb) = ci.make_rdm2(None).unwrap();
        assert!((dm1a.diag().sum() - 3.0).abs() < 1e-10);
        assert!((dm1b.diag().sum() - 3.0).abs() < 1e-10);

        let r = &ci.reference;
        let energy = (&r.h1a * &dm1a).sum()
            + (&r.h1b * &dm1b).sum()
            + 0.5 * (&r.eri_aa * &dm2aa).sum()
            + (&r.eri_ab * &dm2ab).sum()
            + 0.5 * (&r.eri_bb * &dm2bb).sum();
        let expected = r.e_hf() + e_corr;
        assert!((energy - expected).abs() < 1e-8, "{} vs {}", energy, expected);
    }
}
