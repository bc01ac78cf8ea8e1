//! Unrestricted mean-field reference in the MO basis
//!
//! Holds the one- and two-electron integrals of a converged UHF calculation
//! transformed to the alpha and beta MO bases, the occupation of each spin and
//! the Fock matrices built from them. Orbitals `0..nocc` are occupied.

use crate::eris_impl::UEris;
use color_eyre::eyre::{eyre, Result};
use ndarray::{s, Array1, Array2, Array4};
use tracing::info;

#[derive(Debug, Clone)]
pub struct UhfReference {
    pub h1a: Array2<f64>,
    pub h1b: Array2<f64>,
    /// `(pq|rs)`, all alpha
    pub eri_aa: Array4<f64>,
    /// `(pq|RS)`, alpha bra and beta ket
    pub eri_ab: Array4<f64>,
    /// `(PQ|RS)`, all beta
    pub eri_bb: Array4<f64>,
    pub nocca: usize,
    pub noccb: usize,
    pub e_nuc: f64,
    pub focka: Array2<f64>,
    pub fockb: Array2<f64>,
    density_fitted: bool,
}

/// Coulomb minus exchange from the occupied orbitals of one spin plus the
/// Coulomb field of the other spin.
fn build_fock(
    h1: &Array2<f64>,
    eri_same: &Array4<f64>,
    nocc_same: usize,
    coulomb_other: Array2<f64>,
) -> Array2<f64> {
    let mut fock = h1 + &coulomb_other;
    for i in 0..nocc_same {
        let j = eri_same.slice(s![.., .., i, i]);
        let k = eri_same.slice(s![.., i, i, ..]);
        fock += &j;
        fock -= &k;
    }
    fock
}

impl UhfReference {
    pub fn new(
        h1a: Array2<f64>,
        h1b: Array2<f64>,
        eri_aa: Array4<f64>,
        eri_ab: Array4<f64>,
        eri_bb: Array4<f64>,
        nocc: (usize, usize),
        e_nuc: f64,
    ) -> Result<Self> {
        let (nocca, noccb) = nocc;
        let nmoa = h1a.nrows();
        let nmob = h1b.nrows();
        if nocca > nmoa || noccb > nmob {
            return Err(eyre!(
                "occupation ({}, {}) exceeds the number of orbitals ({}, {})",
                nocca,
                noccb,
                nmoa,
                nmob
            ));
        }
        if eri_aa.dim() != (nmoa, nmoa, nmoa, nmoa)
            || eri_ab.dim() != (nmoa, nmoa, nmob, nmob)
            || eri_bb.dim() != (nmob, nmob, nmob, nmob)
        {
            return Err(eyre!(
                "two-electron integral shapes {:?}, {:?}, {:?} do not match nmo = ({}, {})",
                eri_aa.shape(),
                eri_ab.shape(),
                eri_bb.shape(),
                nmoa,
                nmob
            ));
        }

        // Coulomb field of the beta electrons on alpha orbitals and vice versa
        let mut j_from_b = Array2::zeros((nmoa, nmoa));
        for i in 0..noccb {
            j_from_b += &eri_ab.slice(s![.., .., i, i]);
        }
        let mut j_from_a = Array2::zeros((nmob, nmob));
        for i in 0..nocca {
            j_from_a += &eri_ab.slice(s![i, i, .., ..]);
        }
        let focka = build_fock(&h1a, &eri_aa, nocca, j_from_b);
        let fockb = build_fock(&h1b, &eri_bb, noccb, j_from_a);

        Ok(UhfReference {
            h1a,
            h1b,
            eri_aa,
            eri_ab,
            eri_bb,
            nocca,
            noccb,
            e_nuc,
            focka,
            fockb,
            density_fitted: false,
        })
    }

    /// Mark the reference as using density-fitted integrals.
    pub fn with_density_fitting(mut self) -> Self {
        self.density_fitted = true;
        self
    }

    pub fn is_density_fitted(&self) -> bool {
        self.density_fitted
    }

    pub fn nmo(&self) -> (usize, usize) {
        (self.h1a.nrows(), self.h1b.nrows())
    }

    pub fn nocc(&self) -> (usize, usize) {
        (self.nocca, self.noccb)
    }

    pub fn nelectron(&self) -> usize {
        self.nocca + self.noccb
    }

    /// Diagonals of the alpha and beta Fock matrices.
    pub fn mo_energy(&self) -> (Array1<f64>, Array1<f64>) {
        (self.focka.diag().to_owned(), self.fockb.diag().to_owned())
    }

    /// Electronic reference energy `1/2 sum_i (h + f)_ii` over both spins.
    pub fn e_elec(&self) -> f64 {
        let half_trace = |h: &Array2<f64>, f: &Array2<f64>, nocc: usize| {
            (0..nocc).map(|i| h[[i, i]] + f[[i, i]]).sum::<f64>() * 0.5
        };
        half_trace(&self.h1a, &self.focka, self.nocca) + half_trace(&self.h1b, &self.fockb, self.noccb)
    }

    /// Total reference energy including nuclear repulsion.
    pub fn e_hf(&self) -> f64 {
        self.e_elec() + self.e_nuc
    }

    /// Largest occupied-virtual Fock element; zero for a converged UHF.
    pub fn max_fock_ov(&self) -> f64 {
        let ov = |f: &Array2<f64>, nocc: usize| {
            f.slice(s![..nocc, nocc..])
                .iter()
                .fold(0.0_f64, |m, x| m.max(x.abs()))
        };
        ov(&self.focka, self.nocca).max(ov(&self.fockb, self.noccb))
    }

    /// In-core integral container for this reference.
    pub fn make_eris(&self) -> Result<UEris> {
        info!(
            "Building in-core integrals for nmo = {:?}, nocc = {:?}",
            self.nmo(),
            self.nocc()
        );
        let eris = UEris::from_mo_integrals(
            self.focka.view(),
            self.fockb.view(),
            self.eri_aa.view(),
            self.eri_ab.view(),
            self.eri_bb.view(),
            self.nocc(),
        )?;
        info!("Integral blocks use {:.3} MB", eris.memory_mb());
        Ok(eris)
    }

    /// Size of the full MO two-electron tensors in MB.
    pub fn incore_memory_mb(&self) -> f64 {
        let (nmoa, nmob) = self.nmo();
        let n4 = |a: usize, b: usize| (a * a * b * b) as f64;
        (n4(nmoa, nmoa) + n4(nmoa, nmob) + n4(nmob, nmob)) * 8.0 / 1e6
    }
}
