//! Unrestricted CISD driver
//!
//! Wires the integral container, the amplitude-space Hamiltonian and the
//! Davidson solver together and keeps the converged roots for density
//! matrices.

use crate::amplitudes_impl::{amplitudes_to_cisdvec, CisdAmplitudes};
use crate::config::CisdParams;
use crate::davidson_impl::davidson;
use crate::density_impl::{gamma1_intermediates, gamma2_intermediates, make_rdm1, make_rdm2};
use crate::eris_impl::UEris;
use crate::hamiltonian_impl::{AmplitudeHamiltonian, UnrestrictedHamiltonian};
use crate::memory::current_memory_mb;
use crate::reference::UhfReference;
use crate::tensor::{einsum0, pair_sum};
use color_eyre::eyre::{eyre, Result};
use ndarray::{s, Array1, Array2, Array4, ArrayView1};
use rayon::prelude::*;
use tracing::{info, warn};

/// `e_i - e_a` for every occupied-virtual pair
fn orbital_gaps(mo_e: ArrayView1<'_, f64>, nocc: usize) -> Array2<f64> {
    let nvir = mo_e.len() - nocc;
    Array2::from_shape_fn((nocc, nvir), |(i, a)| mo_e[i] - mo_e[nocc + a])
}

/// UCISD calculation on top of an unrestricted reference
///
/// The Hamiltonian variant is chosen at construction; [`UCISD::new`] uses the
/// unrestricted implementation with the memory ceiling from the parameters.
pub struct UCISD<H = UnrestrictedHamiltonian> {
    /// Mean-field reference
    pub reference: UhfReference,

    /// Solver parameters, defaults applied
    pub params: CisdParams,

    /// MP2 energy of the initial guess
    pub emp2: Option<f64>,

    /// Correlation energy of every root, lowest first
    pub e_corr: Vec<f64>,

    /// CI vectors of every root
    pub ci: Vec<Array1<f64>>,

    /// Convergence flag of every root
    pub converged: Vec<bool>,

    hamiltonian: H,
}

impl UCISD<UnrestrictedHamiltonian> {
    pub fn new(reference: UhfReference, params: CisdParams) -> Self {
        let params = params.with_defaults();
        let hamiltonian = UnrestrictedHamiltonian::new(params.max_memory());
        UCISD::with_hamiltonian(reference, params, hamiltonian)
    }
}

impl<H> UCISD<H>
where
    H: AmplitudeHamiltonian<Eris = UEris> + Sync,
{
    pub fn with_hamiltonian(reference: UhfReference, params: CisdParams, hamiltonian: H) -> Self {
        let params = params.with_defaults();
        let (nmoa, nmob) = reference.nmo();
        let (nocca, noccb) = reference.nocc();

        info!("===========================================");
        info!("        UCISD Initialization");
        info!("===========================================");
        info!("Orbitals (alpha, beta): ({}, {})", nmoa, nmob);
        info!("Occupied (alpha, beta): ({}, {})", nocca, noccb);
        info!("Reference energy: {:.10} Eh", reference.e_hf());
        info!("Roots: {}", params.nroots.unwrap_or(1));
        info!("Convergence threshold: {:.2e}", params.conv_tol.unwrap_or(1e-9));
        info!("Max memory: {:.0} MB", params.max_memory());
        info!("===========================================");

        UCISD {
            reference,
            params,
            emp2: None,
            e_corr: Vec::new(),
            ci: Vec::new(),
            converged: Vec::new(),
            hamiltonian,
        }
    }

    pub fn hamiltonian(&self) -> &H {
        &self.hamiltonian
    }

    pub fn nmo(&self) -> (usize, usize) {
        self.reference.nmo()
    }

    pub fn nocc(&self) -> (usize, usize) {
        self.reference.nocc()
    }

    /// Build the integral container for the reference.
    ///
    /// Only the in-core path exists; a density-fitted reference is rejected.
    pub fn ao2mo(&self) -> Result<UEris> {
        if self.reference.is_density_fitted() {
            return Err(eyre!("UCISD with density-fitted integrals is not implemented"));
        }
        let needed = self.reference.incore_memory_mb() + current_memory_mb().unwrap_or(0.0);
        if needed > self.params.max_memory() {
            warn!(
                "In-core integrals need about {:.1} MB, above max_memory = {:.1} MB",
                needed,
                self.params.max_memory()
            );
        }
        self.reference.make_eris()
    }

    /// First-order (MP2) amplitudes with `c0 = 1` and their energy.
    pub fn get_init_guess(&self, eris: &UEris) -> (f64, Array1<f64>) {
        let (nocca, noccb) = eris.nocc();
        let mo_ea = eris.focka.diag();
        let mo_eb = eris.fockb.diag();
        let eia_a = orbital_gaps(mo_ea, nocca);
        let eia_b = orbital_gaps(mo_eb, noccb);
        let fova = eris.focka.slice(s![..nocca, nocca..]);
        let fovb = eris.fockb.slice(s![..noccb, noccb..]);
        let mut t1a = &fova / &eia_a;
        let mut t1b = &fovb / &eia_b;

        let exchange_antisym = |ovvo: &Array4<f64>| -> Array4<f64> {
            &ovvo.view().permuted_axes([0, 3, 1, 2]) - &ovvo.view().permuted_axes([0, 3, 2, 1])
        };
        let (ovvo, ovvo_ab, ovvo_bb) = (&eris.aa.ovvo, &eris.ab.ovvo, &eris.bb.ovvo);
        let t2aa = exchange_antisym(ovvo) / &pair_sum(eia_a.view(), eia_a.view());
        let t2bb = exchange_antisym(ovvo_bb) / &pair_sum(eia_b.view(), eia_b.view());
        let t2ab = &ovvo_ab.view().permuted_axes([0, 3, 1, 2]) / &pair_sum(eia_a.view(), eia_b.view());

        let mut emp2 = einsum0("ia,ia->", fova, t1a.view()) + einsum0("ia,ia->", fovb, t1b.view());
        emp2 += einsum0("iabj,ijab->", ovvo.view(), t2aa.view()) * 0.25;
        emp2 -= einsum0("jabi,ijab->", ovvo.view(), t2aa.view()) * 0.25;
        emp2 += einsum0("iabj,ijab->", ovvo_bb.view(), t2bb.view()) * 0.25;
        emp2 -= einsum0("jabi,ijab->", ovvo_bb.view(), t2bb.view()) * 0.25;
        emp2 += einsum0("iabj,ijab->", ovvo_ab.view(), t2ab.view());
        info!("Init t2, MP2 energy = {:.15}", emp2);

        let t1_size = t1a.mapv(f64::abs).sum() + t1b.mapv(f64::abs).sum();
        if emp2.abs() < 1e-3 && t1_size < 1e-3 {
            t1a = eia_a.mapv(|e| 0.1 / e);
            t1b = eia_b.mapv(|e| 0.1 / e);
        }

        let amps = CisdAmplitudes {
            c0: 1.0,
            c1a: t1a,
            c1b: t1b,
            c2aa: t2aa,
            c2ab: t2ab,
            c2bb: t2bb,
        };
        (emp2, amplitudes_to_cisdvec(&amps))
    }

    /// Solve for the lowest roots; returns the correlation energy of the first.
    pub fn kernel(&mut self, eris: &UEris) -> Result<f64> {
        info!("");
        info!("===========================================");
        info!("      Starting UCISD Calculation");
        info!("===========================================");

        let mut diag = self.hamiltonian.make_diagonal(eris);
        let ehf = diag[0];
        diag -= ehf;
        info!("CI space dimension: {}", diag.len());

        let (emp2, ci0) = self.get_init_guess(eris);
        self.emp2 = Some(emp2);

        let davidson_params = self.params.davidson();
        let mut x0 = vec![ci0];
        if davidson_params.nroots > 1 {
            let mut order: Vec<usize> = (1..diag.len()).collect();
            order.sort_by(|&a, &b| diag[a].total_cmp(&diag[b]));
            for &k in order.iter().take(davidson_params.nroots - 1) {
                let mut unit = Array1::zeros(diag.len());
                unit[k] = 1.0;
                x0.push(unit);
            }
        }

        let hamiltonian = &self.hamiltonian;
        let apply = |xs: &[Array1<f64>]| -> Result<Vec<Array1<f64>>> {
            xs.par_iter()
                .map(|x| hamiltonian.contract(x.view(), eris))
                .collect()
        };
        let level_shift = self.params.level_shift();
        let precond = |r: &Array1<f64>, e: f64| {
            let mut shifted = &diag - (e - level_shift);
            shifted.mapv_inplace(|d| if d.abs() < 1e-8 { 1e-8 } else { d });
            r / &shifted
        };

        let result = davidson(apply, x0, precond, &davidson_params)?;
        info!("Davidson finished after {} iterations", result.iterations);

        self.e_corr = result.energies;
        self.ci = result.vectors;
        self.converged = result.converged;
        self.print_summary();

        self.e_corr
            .first()
            .copied()
            .ok_or_else(|| eyre!("Davidson returned no roots"))
    }

    /// Total energy of the lowest root.
    pub fn e_tot(&self) -> Option<f64> {
        self.e_corr.first().map(|e| e + self.reference.e_hf())
    }

    fn civec_or_ground(&self, civec: Option<ArrayView1<'_, f64>>) -> Result<Array1<f64>> {
        match civec {
            Some(c) => Ok(c.to_owned()),
            None => self
                .ci
                .first()
                .cloned()
                .ok_or_else(|| eyre!("no CI vector available; run kernel first")),
        }
    }

    /// One-body density matrices of `civec`, or of the lowest root.
    pub fn make_rdm1(&self, civec: Option<ArrayView1<'_, f64>>) -> Result<(Array2<f64>, Array2<f64>)> {
        let civec = self.civec_or_ground(civec)?;
        let d1 = gamma1_intermediates(civec.view(), self.nmo(), self.nocc())?;
        Ok(make_rdm1(&d1))
    }

    /// Two-body density matrices of `civec`, or of the lowest root.
    pub fn make_rdm2(
        &self,
        civec: Option<ArrayView1<'_, f64>>,
    ) -> Result<(Array4<f64>, Array4<f64>, Array4<f64>)> {
        let civec = self.civec_or_ground(civec)?;
        let d1 = gamma1_intermediates(civec.view(), self.nmo(), self.nocc())?;
        let d2 = gamma2_intermediates(civec.view(), self.nmo(), self.nocc())?;
        make_rdm2(&d1, &d2)
    }

    pub fn print_summary(&self) {
        info!("");
        info!("===========================================");
        info!("       UCISD Results Summary");
        info!("===========================================");
        info!("Reference energy:         {:.10} Eh", self.reference.e_hf());
        if let Some(emp2) = self.emp2 {
            info!("MP2 guess energy:         {:.10} Eh", emp2);
        }
        for (k, (e, conv)) in self.e_corr.iter().zip(&self.converged).enumerate() {
            info!(
                "Root {:2}: E_corr = {:.10} Eh  E_tot = {:.10} Eh  converged = {}",
                k,
                e,
                e + self.reference.e_hf(),
                conv
            );
        }
        if self.converged.iter().any(|c| !c) {
            warn!("Not all UCISD roots converged");
        }
        info!("===========================================");
    }
}
