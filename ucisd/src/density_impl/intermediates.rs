//! One- and two-body density intermediates of a CISD wavefunction
//!
//! Blocks are named by orbital class in the order of their indices, lower case
//! for alpha and upper case for beta, e.g. `dovOV[i,a,J,B]`. The intermediates
//! hold the correlation part only; [`super::make_rdm1`] and
//! [`super::make_rdm2`] add the reference contributions.

use crate::amplitudes_impl::{cisdvec_to_amplitudes, CisdAmplitudes};
use crate::tensor::{einsum2, einsum4};
use color_eyre::eyre::Result;
use ndarray::{Array2, Array4, ArrayView1};

/// One alpha and one beta block.
pub type SpinPair<T> = (T, T);

/// One-body intermediates `(doo, dOO), (dov, dOV), (dvo, dVO), (dvv, dVV)`.
#[derive(Debug, Clone)]
pub struct Gamma1 {
    pub doo: SpinPair<Array2<f64>>,
    pub dov: SpinPair<Array2<f64>>,
    pub dvo: SpinPair<Array2<f64>>,
    pub dvv: SpinPair<Array2<f64>>,
}

/// Four spin variants of one two-body block. `ba` holds the block with the
/// beta pair first; variants that are never needed are `None`.
#[derive(Debug, Clone, Default)]
pub struct SpinBlocks {
    pub aa: Option<Array4<f64>>,
    pub ab: Option<Array4<f64>>,
    pub ba: Option<Array4<f64>>,
    pub bb: Option<Array4<f64>>,
}

/// Two-body intermediates grouped by orbital classes.
#[derive(Debug, Clone)]
pub struct Gamma2 {
    pub ovov: SpinBlocks,
    pub vvvv: SpinBlocks,
    pub oooo: SpinBlocks,
    pub oovv: SpinBlocks,
    pub ovvo: SpinBlocks,
    pub vvov: SpinBlocks,
    pub ovvv: SpinBlocks,
    pub ooov: SpinBlocks,
}

fn transpose(x: &Array4<f64>, perm: [usize; 4]) -> Array4<f64> {
    x.view().permuted_axes(perm).as_standard_layout().into_owned()
}

/// `x.T(0,2,1,3) - x.T(0,3,1,2)`
fn exchange_pairs(x: &Array4<f64>) -> Array4<f64> {
    transpose(x, [0, 2, 1, 3]) - transpose(x, [0, 3, 1, 2])
}

/// `-(x + x.T(1,0,3,2)) / 2`
fn symmetrized_negative(x: Array4<f64>) -> Array4<f64> {
    let t = transpose(&x, [1, 0, 3, 2]);
    (x + t) * -0.5
}

/// Correlation part of the one-body density from a flat CISD vector.
pub fn gamma1_intermediates(
    civec: ArrayView1<'_, f64>,
    nmo: (usize, usize),
    nocc: (usize, usize),
) -> Result<Gamma1> {
    let CisdAmplitudes {
        c0,
        c1a,
        c1b,
        c2aa,
        c2ab,
        c2bb,
    } = cisdvec_to_amplitudes(civec, nmo, nocc)?;

    let mut dova = &c1a * c0;
    let mut dovb = &c1b * c0;
    dova += &einsum2("jb,ijab->ia", c1a.view(), c2aa.view());
    dova += &einsum2("jb,ijab->ia", c1b.view(), c2ab.view());
    dovb += &einsum2("jb,ijab->ia", c1b.view(), c2bb.view());
    dovb += &einsum2("jb,jiba->ia", c1a.view(), c2ab.view());

    let mut dooa = -einsum2("ia,ka->ik", c1a.view(), c1a.view());
    let mut doob = -einsum2("ia,ka->ik", c1b.view(), c1b.view());
    dooa.scaled_add(-0.5, &einsum2("ijab,ikab->jk", c2aa.view(), c2aa.view()));
    dooa -= &einsum2("jiab,kiab->jk", c2ab.view(), c2ab.view());
    doob.scaled_add(-0.5, &einsum2("ijab,ikab->jk", c2bb.view(), c2bb.view()));
    doob -= &einsum2("ijab,ikab->jk", c2ab.view(), c2ab.view());

    let mut dvva = einsum2("ia,ic->ca", c1a.view(), c1a.view());
    let mut dvvb = einsum2("ia,ic->ca", c1b.view(), c1b.view());
    dvva.scaled_add(0.5, &einsum2("ijab,ijac->cb", c2aa.view(), c2aa.view()));
    dvva += &einsum2("ijba,ijca->cb", c2ab.view(), c2ab.view());
    dvvb.scaled_add(0.5, &einsum2("ijba,ijca->cb", c2bb.view(), c2bb.view()));
    dvvb += &einsum2("ijab,ijac->cb", c2ab.view(), c2ab.view());

    let dvoa = dova.t().to_owned();
    let dvob = dovb.t().to_owned();
    Ok(Gamma1 {
        doo: (dooa, doob),
        dov: (dova, dovb),
        dvo: (dvoa, dvob),
        dvv: (dvva, dvvb),
    })
}

pub fn gamma2_intermediates(
    civec: ArrayView1<'_, f64>,
    nmo: (usize, usize),
    nocc: (usize, usize),
) -> Result<Gamma2> {
    let CisdAmplitudes {
        c0,
        c1a,
        c1b,
        c2aa,
        c2ab,
        c2bb,
    } = cisdvec_to_amplitudes(civec, nmo, nocc)?;
    let (c1a, c1b) = (c1a.view(), c1b.view());
    let (c2aa, c2ab, c2bb) = (c2aa.view(), c2ab.view(), c2bb.view());

    let goovv = &c2aa * (c0 * 0.5);
    let go_ov_v = &c2ab * c0;
    let g_oovv = &c2bb * (c0 * 0.5);

    let govvv = einsum4("ia,ikcd->kadc", c1a, c2aa) * 0.5;
    let g_ov_vv = einsum4("ia,ikcd->kadc", c1a, c2ab);
    let go_vv_v = einsum4("ia,kidc->kadc", c1b, c2ab);
    let g_ovvv = einsum4("ia,ikcd->kadc", c1b, c2bb) * 0.5;

    let gooov = einsum4("ia,klac->klic", c1a, c2aa) * -0.5;
    let go_oo_v = -einsum4("ia,klac->klic", c1a, c2ab);
    let g_oo_ov = -einsum4("ia,lkca->klic", c1b, c2ab);
    let g_ooov = einsum4("ia,klac->klic", c1b, c2bb) * -0.5;

    let goooo = einsum4("ijab,klab->ijkl", c2aa, c2aa) * 0.25;
    let go_oo_o = einsum4("ijab,klab->ijkl", c2ab, c2ab);
    let g_oooo = einsum4("ijab,klab->ijkl", c2bb, c2bb) * 0.25;
    let gvvvv = einsum4("ijab,ijcd->abcd", c2aa, c2aa) * 0.25;
    let gv_vv_v = einsum4("ijab,ijcd->abcd", c2ab, c2ab);
    let g_vvvv = einsum4("ijab,ijcd->abcd", c2bb, c2bb) * 0.25;

    let go_vo_v = einsum4("jIaB,kIaC->jCkB", c2ab, c2ab);
    let g_ov_ov = einsum4("iJbA,iKcA->JcKb", c2ab, c2ab);

    let mut govvo = einsum4("ijab,ikac->jcbk", c2aa, c2aa);
    govvo += &einsum4("jIbA,kIcA->jcbk", c2ab, c2ab);
    govvo += &einsum4("ia,jb->ibaj", c1a, c1a);
    let mut go_vv_o = einsum4("jIbA,IKAC->jCbK", c2ab, c2bb);
    go_vv_o += &einsum4("ijab,iKaC->jCbK", c2aa, c2ab);
    go_vv_o += &einsum4("ia,jb->ibaj", c1a, c1b);
    let mut g_ovvo = einsum4("ijab,ikac->jcbk", c2bb, c2bb);
    g_ovvo += &einsum4("iJaB,iKaC->JCBK", c2ab, c2ab);
    g_ovvo += &einsum4("ia,jb->ibaj", c1b, c1b);

    let swap_inner = [0, 2, 1, 3];

    let dovvo = transpose(&govvo, swap_inner);
    let doovv = -transpose(&dovvo, [0, 3, 2, 1]);
    let dovvo_bb = transpose(&g_ovvo, swap_inner);
    let doovv_bb = -transpose(&dovvo_bb, [0, 3, 2, 1]);
    let dooov = transpose(&gooov, swap_inner) - transpose(&gooov, [1, 2, 0, 3]);
    let dooov_bb = transpose(&g_ooov, swap_inner) - transpose(&g_ooov, [1, 2, 0, 3]);

    let dovvo_ab = transpose(&go_vv_o, swap_inner);
    let dovvo_ba = transpose(&dovvo_ab, [3, 2, 1, 0]);
    let doovv_ab = symmetrized_negative(transpose(&go_vo_v, swap_inner));
    let doovv_ba = symmetrized_negative(transpose(&g_ov_ov, swap_inner));

    Ok(Gamma2 {
        ovov: SpinBlocks {
            aa: Some(exchange_pairs(&goovv)),
            ab: Some(transpose(&go_ov_v, swap_inner)),
            ba: None,
            bb: Some(exchange_pairs(&g_oovv)),
        },
        vvvv: SpinBlocks {
            aa: Some(exchange_pairs(&gvvvv)),
            ab: Some(transpose(&gv_vv_v, swap_inner)),
            ba: None,
            bb: Some(exchange_pairs(&g_vvvv)),
        },
        oooo: SpinBlocks {
            aa: Some(exchange_pairs(&goooo)),
            ab: Some(transpose(&go_oo_o, swap_inner)),
            ba: None,
            bb: Some(exchange_pairs(&g_oooo)),
        },
        oovv: SpinBlocks {
            aa: Some(doovv),
            ab: Some(doovv_ab),
            ba: Some(doovv_ba),
            bb: Some(doovv_bb),
        },
        ovvo: SpinBlocks {
            aa: Some(dovvo),
            ab: Some(dovvo_ab),
            ba: Some(dovvo_ba),
            bb: Some(dovvo_bb),
        },
        vvov: SpinBlocks::default(),
        ovvv: SpinBlocks {
            aa: Some(exchange_pairs(&govvv)),
            ab: Some(transpose(&go_vv_v, swap_inner)),
            ba: Some(transpose(&g_ov_vv, swap_inner)),
            bb: Some(exchange_pairs(&g_ovvv)),
        },
        ooov: SpinBlocks {
            aa: Some(dooov),
            ab: Some(transpose(&go_oo_v, swap_inner)),
            ba: Some(transpose(&g_oo_ov, swap_inner)),
            bb: Some(dooov_bb),
        },
    })
}
