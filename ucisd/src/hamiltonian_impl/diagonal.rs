//! Diagonal of the CISD Hamiltonian in the flat amplitude layout

use crate::amplitudes_impl::{amplitudes_to_cisdvec, CisdAmplitudes};
use crate::eris_impl::{SameSpinBlocks, UEris};
use crate::tensor::pair_sum;
use ndarray::{s, Array1, Array2, Array4};

/// Coulomb `J[p,q] = (pp|qq)` and exchange `K[p,q] = (pq|qp)` diagonals over
/// the occupied-occupied and occupied-virtual blocks of one spin.
fn same_spin_jk(blocks: &SameSpinBlocks, nocc: usize, nmo: usize) -> (Array2<f64>, Array2<f64>) {
    let mut j = Array2::zeros((nmo, nmo));
    let mut k = Array2::zeros((nmo, nmo));
    let j_oo = Array2::from_shape_fn((nocc, nocc), |(i, l)| blocks.oooo[[i, i, l, l]]);
    let k_oo = Array2::from_shape_fn((nocc, nocc), |(i, l)| blocks.oooo[[i, l, l, i]]);
    j.slice_mut(s![..nocc, ..nocc]).assign(&j_oo);
    k.slice_mut(s![..nocc, ..nocc]).assign(&k_oo);
    let j_ov = Array2::from_shape_fn((nocc, nmo - nocc), |(i, a)| blocks.oovv[[i, i, a, a]]);
    let k_ov = Array2::from_shape_fn((nocc, nmo - nocc), |(i, a)| blocks.ovvo[[i, a, a, i]]);
    j.slice_mut(s![..nocc, nocc..]).assign(&j_ov);
    j.slice_mut(s![nocc.., ..nocc]).assign(&j_ov.t());
    k.slice_mut(s![..nocc, nocc..]).assign(&k_ov);
    k.slice_mut(s![nocc.., ..nocc]).assign(&k_ov.t());
    (j, k)
}

/// `e_a - e_i - (J - K)[i, a]`
fn singles_gap(mo_e: &Array1<f64>, jk: &Array2<f64>, nocc: usize) -> Array2<f64> {
    let nvir = mo_e.len() - nocc;
    Array2::from_shape_fn((nocc, nvir), |(i, a)| {
        mo_e[nocc + a] - mo_e[i] - jk[[i, nocc + a]]
    })
}

/// Same-spin doubles diagonal built from the singles gaps and the J - K diagonal.
fn same_spin_doubles(dia: &Array2<f64>, jk: &Array2<f64>, ehf: f64) -> Array4<f64> {
    let (nocc, _) = dia.dim();
    let mut e2 = pair_sum(dia.view(), dia.view());
    e2.indexed_iter_mut().for_each(|((i, j, a, b), x)| {
        *x += ehf + jk[[i, j]] - jk[[i, nocc + b]] - jk[[j, nocc + a]] + jk[[nocc + a, nocc + b]];
    });
    e2
}

pub(super) fn make_diagonal(eris: &UEris) -> Array1<f64> {
    let (nocca, noccb) = eris.nocc();
    let (nmoa, nmob) = eris.nmo();

    let (jdiag_aa, kdiag_aa) = same_spin_jk(&eris.aa, nocca, nmoa);
    let (jdiag_bb, kdiag_bb) = same_spin_jk(&eris.bb, noccb, nmob);
    let mut jdiag_ab = Array2::zeros((nmoa, nmob));
    jdiag_ab
        .slice_mut(s![..nocca, ..noccb])
        .assign(&Array2::from_shape_fn((nocca, noccb), |(i, l)| eris.ab.oooo[[i, i, l, l]]));
    jdiag_ab
        .slice_mut(s![..nocca, noccb..])
        .assign(&Array2::from_shape_fn((nocca, nmob - noccb), |(i, b)| eris.ab.oovv[[i, i, b, b]]));
    jdiag_ab
        .slice_mut(s![nocca.., ..noccb])
        .assign(&Array2::from_shape_fn((nmoa - nocca, noccb), |(a, l)| eris.ab.oovv_ba[[l, l, a, a]]));
    // The virtual-virtual J/K diagonals would need the vvvv blocks; they are
    // left at zero, so the doubles diagonal below lacks those terms.
    let jkdiag_aa = &jdiag_aa - &kdiag_aa;
    let jkdiag_bb = &jdiag_bb - &kdiag_bb;

    let mo_ea = eris.focka.diag().to_owned();
    let mo_eb = eris.fockb.diag().to_owned();
    let ehf = mo_ea.slice(s![..nocca]).sum() + mo_eb.slice(s![..noccb]).sum()
        - jkdiag_aa.slice(s![..nocca, ..nocca]).sum() * 0.5
        - jdiag_ab.slice(s![..nocca, ..noccb]).sum()
        - jkdiag_bb.slice(s![..noccb, ..noccb]).sum() * 0.5;

    let dia_a = singles_gap(&mo_ea, &jkdiag_aa, nocca);
    let dia_b = singles_gap(&mo_eb, &jkdiag_bb, noccb);

    let mut e2diag_ab = pair_sum(dia_a.view(), dia_b.view());
    e2diag_ab.indexed_iter_mut().for_each(|((i, j, a, b), x)| {
        *x += ehf + jdiag_ab[[i, j]] + jdiag_ab[[nocca + a, noccb + b]]
            - jdiag_ab[[i, noccb + b]]
            - jdiag_ab[[nocca + a, j]];
    });

    amplitudes_to_cisdvec(&CisdAmplitudes {
        c0: ehf,
        c1a: &dia_a + ehf,
        c1b: &dia_b + ehf,
        c2aa: same_spin_doubles(&dia_a, &jkdiag_aa, ehf),
        c2ab: e2diag_ab,
        c2bb: same_spin_doubles(&dia_b, &jkdiag_bb, ehf),
    })
}
