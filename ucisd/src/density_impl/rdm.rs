//! Reduced density matrices assembled from the CISD intermediates

use super::intermediates::{Gamma1, Gamma2, SpinBlocks};
use color_eyre::eyre::{eyre, Result};
use ndarray::{s, Array2, Array4, ArrayView2, ArrayView4};
use std::ops::Range;

#[derive(Debug, Clone, Copy)]
struct Orbitals {
    nocc: usize,
    nmo: usize,
}

impl Orbitals {
    fn from_ov(dov: &Array2<f64>) -> Self {
        let (nocc, nvir) = dov.dim();
        Orbitals {
            nocc,
            nmo: nocc + nvir,
        }
    }

    fn occ(self) -> Range<usize> {
        0..self.nocc
    }

    fn vir(self) -> Range<usize> {
        self.nocc..self.nmo
    }
}

fn assign(dm: &mut Array4<f64>, spans: [Range<usize>; 4], value: ArrayView4<'_, f64>) {
    let [w, x, y, z] = spans;
    dm.slice_mut(s![w, x, y, z]).assign(&value);
}

fn required<'a>(block: &'a Option<Array4<f64>>, name: &str) -> Result<&'a Array4<f64>> {
    block
        .as_ref()
        .ok_or_else(|| eyre!("density block `{}` is missing", name))
}

fn spin_rdm1(doo: &Array2<f64>, dov: &Array2<f64>, dvo: &Array2<f64>, dvv: &Array2<f64>) -> Array2<f64> {
    let orb = Orbitals::from_ov(dov);
    let mut dm1 = Array2::zeros((orb.nmo, orb.nmo));
    dm1.slice_mut(s![orb.occ(), orb.occ()]).assign(&(doo + &doo.t()));
    dm1.slice_mut(s![orb.occ(), orb.vir()]).assign(&(dov + &dvo.t()));
    dm1.slice_mut(s![orb.vir(), orb.occ()]).assign(&(dvo + &dov.t()));
    dm1.slice_mut(s![orb.vir(), orb.vir()]).assign(&(dvv + &dvv.t()));
    dm1 *= 0.5;
    for i in orb.occ() {
        dm1[[i, i]] += 1.0;
    }
    dm1
}

/// One-body density matrices `(dm1a, dm1b)`, `dm1[p,q] = <q+ p>`, including
/// the occupied reference.
pub fn make_rdm1(d1: &Gamma1) -> (Array2<f64>, Array2<f64>) {
    let dm1a = spin_rdm1(&d1.doo.0, &d1.dov.0, &d1.dvo.0, &d1.dvv.0);
    let dm1b = spin_rdm1(&d1.doo.1, &d1.dov.1, &d1.dvo.1, &d1.dvv.1);
    (dm1a, dm1b)
}

struct SameSpin<'a> {
    ovov: &'a Array4<f64>,
    vvvv: &'a Array4<f64>,
    oooo: &'a Array4<f64>,
    ovvo: &'a Array4<f64>,
    ovvv: &'a Array4<f64>,
    ooov: &'a Array4<f64>,
}

#[derive(Debug, Clone, Copy)]
enum Spin {
    Alpha,
    Beta,
}

fn same_spin_blocks<'a>(d2: &'a Gamma2, spin: Spin) -> Result<SameSpin<'a>> {
    let pick = |blocks: &'a SpinBlocks, name: &str| -> Result<&'a Array4<f64>> {
        match spin {
            Spin::Alpha => required(&blocks.aa, name),
            Spin::Beta => required(&blocks.bb, &name.to_uppercase()),
        }
    };
    Ok(SameSpin {
        ovov: pick(&d2.ovov, "ovov")?,
        vvvv: pick(&d2.vvvv, "vvvv")?,
        oooo: pick(&d2.oooo, "oooo")?,
        ovvo: pick(&d2.ovvo, "ovvo")?,
        ovvv: pick(&d2.ovvv, "ovvv")?,
        ooov: pick(&d2.ooov, "ooov")?,
    })
}

fn same_spin_rdm2(orb: Orbitals, d: SameSpin<'_>) -> Array4<f64> {
    let (o, v) = (|| orb.occ(), || orb.vir());
    let n = orb.nmo;
    let mut dm2 = Array4::zeros((n, n, n, n));

    assign(&mut dm2, [o(), v(), o(), v()], d.ovov.view());
    assign(&mut dm2, [v(), o(), v(), o()], d.ovov.view().permuted_axes([1, 0, 3, 2]));

    let oovv = d.ovvo.view().permuted_axes([0, 3, 2, 1]).mapv(|x| -x);
    assign(&mut dm2, [o(), o(), v(), v()], oovv.view());
    assign(&mut dm2, [v(), v(), o(), o()], oovv.view().permuted_axes([2, 3, 0, 1]));
    assign(&mut dm2, [o(), v(), v(), o()], d.ovvo.view());
    assign(&mut dm2, [v(), o(), o(), v()], d.ovvo.view().permuted_axes([1, 0, 3, 2]));

    assign(&mut dm2, [v(), v(), v(), v()], d.vvvv.view());
    assign(&mut dm2, [o(), o(), o(), o()], d.oooo.view());

    assign(&mut dm2, [o(), v(), v(), v()], d.ovvv.view());
    assign(&mut dm2, [v(), v(), o(), v()], d.ovvv.view().permuted_axes([2, 3, 0, 1]));
    assign(&mut dm2, [v(), v(), v(), o()], d.ovvv.view().permuted_axes([3, 2, 1, 0]));
    assign(&mut dm2, [v(), o(), v(), v()], d.ovvv.view().permuted_axes([1, 0, 3, 2]));

    assign(&mut dm2, [o(), o(), o(), v()], d.ooov.view());
    assign(&mut dm2, [o(), v(), o(), o()], d.ooov.view().permuted_axes([2, 3, 0, 1]));
    assign(&mut dm2, [o(), o(), v(), o()], d.ooov.view().permuted_axes([1, 0, 3, 2]));
    assign(&mut dm2, [v(), o(), o(), o()], d.ooov.view().permuted_axes([3, 2, 1, 0]));
    dm2
}

struct MixedSpin<'a> {
    ov_ov: &'a Array4<f64>,
    vv_vv: &'a Array4<f64>,
    oo_oo: &'a Array4<f64>,
    oo_vv: &'a Array4<f64>,
    oo_vv_ba: &'a Array4<f64>,
    ov_vo: &'a Array4<f64>,
    ov_vv: &'a Array4<f64>,
    ov_vv_ba: &'a Array4<f64>,
    oo_ov: &'a Array4<f64>,
    oo_ov_ba: &'a Array4<f64>,
}

fn mixed_spin_rdm2(a: Orbitals, b: Orbitals, d: MixedSpin<'_>) -> Array4<f64> {
    let (o, v) = (|| a.occ(), || a.vir());
    let (oo, vv) = (|| b.occ(), || b.vir());
    let mut dm2 = Array4::zeros((a.nmo, a.nmo, b.nmo, b.nmo));

    assign(&mut dm2, [o(), v(), oo(), vv()], d.ov_ov.view());
    assign(&mut dm2, [v(), o(), vv(), oo()], d.ov_ov.view().permuted_axes([1, 0, 3, 2]));

    assign(&mut dm2, [o(), o(), vv(), vv()], d.oo_vv.view());
    assign(&mut dm2, [v(), v(), oo(), oo()], d.oo_vv_ba.view().permuted_axes([2, 3, 0, 1]));
    assign(&mut dm2, [o(), v(), vv(), oo()], d.ov_vo.view());
    assign(&mut dm2, [v(), o(), oo(), vv()], d.ov_vo.view().permuted_axes([1, 0, 3, 2]));

    assign(&mut dm2, [v(), v(), vv(), vv()], d.vv_vv.view());
    assign(&mut dm2, [o(), o(), oo(), oo()], d.oo_oo.view());

    assign(&mut dm2, [o(), v(), vv(), vv()], d.ov_vv.view());
    assign(&mut dm2, [v(), v(), oo(), vv()], d.ov_vv_ba.view().permuted_axes([2, 3, 0, 1]));
    assign(&mut dm2, [v(), v(), vv(), oo()], d.ov_vv_ba.view().permuted_axes([3, 2, 1, 0]));
    assign(&mut dm2, [v(), o(), vv(), vv()], d.ov_vv.view().permuted_axes([1, 0, 3, 2]));

    assign(&mut dm2, [o(), o(), oo(), vv()], d.oo_ov.view());
    assign(&mut dm2, [o(), v(), oo(), oo()], d.oo_ov_ba.view().permuted_axes([2, 3, 0, 1]));
    assign(&mut dm2, [o(), o(), vv(), oo()], d.oo_ov.view().permuted_axes([1, 0, 3, 2]));
    assign(&mut dm2, [v(), o(), oo(), oo()], d.oo_ov_ba.view().permuted_axes([3, 2, 1, 0]));
    dm2
}

/// Adds the reference and reference-correlation cross terms of a same-spin
/// block. `gamma` is the one-body density without the occupied identity.
fn add_same_spin_reference(dm2: &mut Array4<f64>, gamma: ArrayView2<'_, f64>, nocc: usize) {
    for i in 0..nocc {
        dm2.slice_mut(s![i, i, .., ..]).scaled_add(1.0, &gamma);
        dm2.slice_mut(s![.., .., i, i]).scaled_add(1.0, &gamma);
        dm2.slice_mut(s![.., i, i, ..]).scaled_add(-1.0, &gamma);
        dm2.slice_mut(s![i, .., .., i]).scaled_add(-1.0, &gamma.t());
    }
    for i in 0..nocc {
        for j in 0..nocc {
            dm2[[i, i, j, j]] += 1.0;
            dm2[[i, j, j, i]] -= 1.0;
        }
    }
}

fn swap_pairs(dm2: Array4<f64>) -> Array4<f64> {
    dm2.permuted_axes([1, 0, 3, 2]).as_standard_layout().into_owned()
}

/// Two-body density matrices `(dm2aa, dm2ab, dm2bb)` in chemist notation,
/// `dm2[p,q,r,s] = <p+ r+ s q>`, including the occupied reference.
///
/// Fails when a block the assembly needs is absent from `d2`.
pub fn make_rdm2(d1: &Gamma1, d2: &Gamma2) -> Result<(Array4<f64>, Array4<f64>, Array4<f64>)> {
    let a = Orbitals::from_ov(&d1.dov.0);
    let b = Orbitals::from_ov(&d1.dov.1);

    let mut dm2aa = same_spin_rdm2(a, same_spin_blocks(d2, Spin::Alpha)?);
    let mut dm2bb = same_spin_rdm2(b, same_spin_blocks(d2, Spin::Beta)?);
    let mut dm2ab = mixed_spin_rdm2(
        a,
        b,
        MixedSpin {
            ov_ov: required(&d2.ovov.ab, "ovOV")?,
            vv_vv: required(&d2.vvvv.ab, "vvVV")?,
            oo_oo: required(&d2.oooo.ab, "ooOO")?,
            oo_vv: required(&d2.oovv.ab, "ooVV")?,
            oo_vv_ba: required(&d2.oovv.ba, "OOvv")?,
            ov_vo: required(&d2.ovvo.ab, "ovVO")?,
            ov_vv: required(&d2.ovvv.ab, "ovVV")?,
            ov_vv_ba: required(&d2.ovvv.ba, "OVvv")?,
            oo_ov: required(&d2.ooov.ab, "ooOV")?,
            oo_ov_ba: required(&d2.ooov.ba, "OOov")?,
        },
    );

    let (mut gamma_a, mut gamma_b) = make_rdm1(d1);
    for i in a.occ() {
        gamma_a[[i, i]] -= 1.0;
    }
    for i in b.occ() {
        gamma_b[[i, i]] -= 1.0;
    }

    add_same_spin_reference(&mut dm2aa, gamma_a.view(), a.nocc);
    add_same_spin_reference(&mut dm2bb, gamma_b.view(), b.nocc);
    for i in a.occ() {
        dm2ab.slice_mut(s![i, i, .., ..]).scaled_add(1.0, &gamma_b);
    }
    for j in b.occ() {
        dm2ab.slice_mut(s![.., .., j, j]).scaled_add(1.0, &gamma_a);
    }
    for i in a.occ() {
        for j in b.occ() {
            dm2ab[[i, i, j, j]] += 1.0;
        }
    }

    Ok((swap_pairs(dm2aa), swap_pairs(dm2ab), swap_pairs(dm2bb)))
}

/// Partial trace `out[p,q] = sum_k dm2[p,q,k,k]`.
pub fn trace_last_pair(dm2: ArrayView4<'_, f64>) -> Array2<f64> {
    let (np, nq, nk, _) = dm2.dim();
    let mut out = Array2::zeros((np, nq));
    for k in 0..nk {
        out += &dm2.slice(s![.., .., k, k]);
    }
    out
}
