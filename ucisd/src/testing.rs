//! Random fixtures shared by the unit tests

use crate::amplitudes_impl::{amplitudes_to_cisdvec, CisdAmplitudes, CisdLayout};
use crate::reference::UhfReference;
use crate::tensor::einsum4;
use nalgebra::DMatrix;
use ndarray::{Array, Array1, Array2, Array4, Dimension, ShapeBuilder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn random_array<Sh>(shape: Sh, rng: &mut StdRng) -> Array<f64, Sh::Dim>
where
    Sh: ShapeBuilder,
    Sh::Dim: Dimension,
{
    Array::from_shape_simple_fn(shape, || rng.gen_range(-1.0..1.0))
}

/// `(1 - P_ab)(1 - P_ij) t`
pub fn antisymmetrize(t: &Array4<f64>) -> Array4<f64> {
    let t = t - &t.view().permuted_axes([0, 1, 3, 2]);
    &t - &t.view().permuted_axes([1, 0, 2, 3])
}

pub fn random_amplitudes(layout: &CisdLayout, rng: &mut StdRng) -> CisdAmplitudes {
    let CisdLayout {
        nocca,
        noccb,
        nvira,
        nvirb,
    } = *layout;
    CisdAmplitudes {
        c0: rng.gen_range(-1.0..1.0),
        c1a: random_array((nocca, nvira), rng),
        c1b: random_array((noccb, nvirb), rng),
        c2aa: antisymmetrize(&random_array((nocca, nocca, nvira, nvira), rng)),
        c2ab: random_array((nocca, noccb, nvira, nvirb), rng),
        c2bb: antisymmetrize(&random_array((noccb, noccb, nvirb, nvirb), rng)),
    }
}

/// Random unit-norm CISD vector.
pub fn random_civec(layout: &CisdLayout, rng: &mut StdRng) -> Array1<f64> {
    let civec = amplitudes_to_cisdvec(&random_amplitudes(layout, rng));
    let norm = civec.dot(&civec).sqrt();
    civec / norm
}

/// Orthogonal matrix close to the identity, so orbital ordering survives.
fn near_identity_rotation(n: usize, rng: &mut StdRng) -> Array2<f64> {
    let m = DMatrix::from_fn(n, n, |i, j| {
        let noise: f64 = 0.15 * rng.gen_range(-1.0..1.0);
        if i == j {
            1.0 + noise
        } else {
            noise
        }
    });
    let q = m.qr().q();
    Array2::from_shape_fn((n, n), |(i, j)| {
        // undo Householder sign flips so that q stays close to +1 on the diagonal
        q[(i, j)] * q[(j, j)].signum()
    })
}

/// `(mn|ls)` with full 8-fold permutational symmetry.
fn symmetric_eri(n: usize, rng: &mut StdRng) -> Array4<f64> {
    let raw: Array4<f64> = random_array((n, n, n, n), rng);
    let mut eri = Array4::from_shape_fn((n, n, n, n), |(p, q, r, s)| {
        (raw[[p, q, r, s]]
            + raw[[q, p, r, s]]
            + raw[[p, q, s, r]]
            + raw[[q, p, s, r]]
            + raw[[r, s, p, q]]
            + raw[[s, r, p, q]]
            + raw[[r, s, q, p]]
            + raw[[s, r, q, p]])
            * 0.0125
    });
    // a positive Coulomb-like background
    for p in 0..n {
        for r in 0..n {
            eri[[p, p, r, r]] += 0.4;
        }
    }
    eri
}

/// `(pq|rs)` in the orbital bases `c1` (bra) and `c2` (ket).
pub fn transform_eri(eri: &Array4<f64>, c1: &Array2<f64>, c2: &Array2<f64>) -> Array4<f64> {
    let x = einsum4("mnls,sd->mnld", eri.view(), c2.view());
    let x = einsum4("mnld,lc->mncd", x.view(), c2.view());
    let x = einsum4("mncd,nb->mbcd", x.view(), c1.view());
    einsum4("mbcd,ma->abcd", x.view(), c1.view())
}

/// Small UHF-like reference with realistic integral symmetry: one set of
/// model "AO" integrals rotated into different alpha and beta orbital bases.
pub fn random_reference(nmo: usize, nocc: (usize, usize), seed: u64) -> UhfReference {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut h_ao = Array2::from_shape_fn((nmo, nmo), |(p, q)| {
        if p == q {
            -2.0 + 0.6 * p as f64
        } else {
            0.0
        }
    });
    let noise: Array2<f64> = random_array((nmo, nmo), &mut rng);
    h_ao = h_ao + (&noise + &noise.t()) * 0.03;
    let eri_ao = symmetric_eri(nmo, &mut rng);

    let ca = near_identity_rotation(nmo, &mut rng);
    let cb = near_identity_rotation(nmo, &mut rng);
    let h1a = ca.t().dot(&h_ao).dot(&ca);
    let h1b = cb.t().dot(&h_ao).dot(&cb);
    let eri_aa = transform_eri(&eri_ao, &ca, &ca);
    let eri_ab = transform_eri(&eri_ao, &ca, &cb);
    let eri_bb = transform_eri(&eri_ao, &cb, &cb);

    UhfReference::new(h1a, h1b, eri_aa, eri_ab, eri_bb, nocc, 1.5).unwrap()
}
