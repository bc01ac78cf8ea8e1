//! Spin-blocked MO integral container
//!
//! All two-electron blocks are chemist-notation slices `(pq|rs)` of the MO
//! integrals. Lower-case block letters refer to alpha orbitals, upper-case to
//! beta orbitals; a block named `ovVO` below is `(i a|B J)` with `i, a` alpha
//! and `B, J` beta. Blocks with three or four virtual indices are kept with
//! their trailing virtual pair packed as a lower triangle.

use crate::tensor::{pack_tril_last, unpack_tril_last, TrilPairs};
use color_eyre::eyre::{eyre, Result};
use ndarray::{s, Array2, Array3, Array4, ArrayView2, ArrayView4, Axis};

/// Blocks of `(pq|rs)` where all four orbitals share one spin.
#[derive(Debug, Clone)]
pub struct SameSpinBlocks {
    pub oooo: Array4<f64>,
    pub ovoo: Array4<f64>,
    pub oovv: Array4<f64>,
    pub ovvo: Array4<f64>,
    /// `(ia|bc)` with `bc` packed, shape `(nocc, nvir, nvir*(nvir+1)/2)`
    pub ovvv: Array3<f64>,
    /// `(ab|cd)` with both pairs packed
    pub vvvv: Option<Array2<f64>>,
}

/// Blocks of `(pq|RS)` with an alpha bra pair and a beta ket pair, plus the
/// three blocks that are stored with the beta pair first.
#[derive(Debug, Clone)]
pub struct MixedSpinBlocks {
    /// ooOO
    pub oooo: Array4<f64>,
    /// ovOO
    pub ovoo: Array4<f64>,
    /// ooVV
    pub oovv: Array4<f64>,
    /// ovVO
    pub ovvo: Array4<f64>,
    /// ovVV, `VV` packed
    pub ovvv: Array3<f64>,
    /// vvVV, both pairs packed
    pub vvvv: Option<Array2<f64>>,
    /// OVoo
    pub ovoo_ba: Array4<f64>,
    /// OOvv
    pub oovv_ba: Array4<f64>,
    /// OVvv, `vv` packed
    pub ovvv_ba: Array3<f64>,
}

/// Integral container read by the amplitude engine.
#[derive(Debug, Clone)]
pub struct UEris {
    pub focka: Array2<f64>,
    pub fockb: Array2<f64>,
    pub nocca: usize,
    pub noccb: usize,
    pub aa: SameSpinBlocks,
    pub ab: MixedSpinBlocks,
    pub bb: SameSpinBlocks,
}

/// Packed `(ab|cd)` over pairs `ab` of `eri_v`'s first two and `cd` of its
/// last two axes.
fn pack_vvvv(eri_v: ArrayView4<'_, f64>) -> Array2<f64> {
    let (nv1, _, nv2, _) = eri_v.dim();
    let bra = TrilPairs::with_diagonal(nv1);
    let ket = TrilPairs::with_diagonal(nv2);
    let mut packed = Array2::zeros((bra.len(), ket.len()));
    for (ab, (a, b)) in bra.iter().enumerate() {
        for (cd, (c, d)) in ket.iter().enumerate() {
            packed[[ab, cd]] = eri_v[[a, b, c, d]];
        }
    }
    packed
}

fn transposed(block: ArrayView4<'_, f64>, perm: [usize; 4]) -> Array4<f64> {
    block.permuted_axes(perm).as_standard_layout().into_owned()
}

fn lookup<'a>(block: &'a Option<Array2<f64>>, name: &str) -> Result<ArrayView2<'a, f64>> {
    block
        .as_ref()
        .map(|b| b.view())
        .ok_or_else(|| eyre!("integral block `{}` is not available in this container", name))
}

type Span = (usize, usize);

fn block<'a>(eri: ArrayView4<'a, f64>, [p, q, r, t]: [Span; 4]) -> ArrayView4<'a, f64> {
    eri.slice_move(s![p.0..p.1, q.0..q.1, r.0..r.1, t.0..t.1])
}

impl SameSpinBlocks {
    fn from_mo(eri: ArrayView4<'_, f64>, nocc: usize) -> Self {
        let (o, v) = ((0, nocc), (nocc, eri.len_of(Axis(0))));
        SameSpinBlocks {
            oooo: block(eri, [o, o, o, o]).to_owned(),
            ovoo: block(eri, [o, v, o, o]).to_owned(),
            oovv: block(eri, [o, o, v, v]).to_owned(),
            ovvo: block(eri, [o, v, v, o]).to_owned(),
            ovvv: pack_tril_last(block(eri, [o, v, v, v])),
            vvvv: Some(pack_vvvv(block(eri, [v, v, v, v]))),
        }
    }
}

impl MixedSpinBlocks {
    fn from_mo(eri_ab: ArrayView4<'_, f64>, nocca: usize, noccb: usize) -> Self {
        let (_, _, nmob, _) = eri_ab.dim();
        let (o, v) = ((0, nocca), (nocca, eri_ab.len_of(Axis(0))));
        let (oo, vv) = ((0, noccb), (noccb, nmob));
        let swap = [2, 3, 0, 1];
        MixedSpinBlocks {
            oooo: block(eri_ab, [o, o, oo, oo]).to_owned(),
            ovoo: block(eri_ab, [o, v, oo, oo]).to_owned(),
            oovv: block(eri_ab, [o, o, vv, vv]).to_owned(),
            ovvo: block(eri_ab, [o, v, vv, oo]).to_owned(),
            ovvv: pack_tril_last(block(eri_ab, [o, v, vv, vv])),
            vvvv: Some(pack_vvvv(block(eri_ab, [v, v, vv, vv]))),
            ovoo_ba: transposed(block(eri_ab, [o, o, oo, vv]), swap),
            oovv_ba: transposed(block(eri_ab, [v, v, oo, oo]), swap),
            ovvv_ba: pack_tril_last(block(eri_ab, [v, v, oo, vv]).permuted_axes(swap)),
        }
    }
}

impl UEris {
    /// Slice full MO integrals `eri_aa = (pq|rs)`, `eri_ab = (pq|RS)` and
    /// `eri_bb = (PQ|RS)` into the blocks used by the engine.
    pub fn from_mo_integrals(
        focka: ArrayView2<'_, f64>,
        fockb: ArrayView2<'_, f64>,
        eri_aa: ArrayView4<'_, f64>,
        eri_ab: ArrayView4<'_, f64>,
        eri_bb: ArrayView4<'_, f64>,
        nocc: (usize, usize),
    ) -> Result<Self> {
        let (nocca, noccb) = nocc;
        let nmoa = focka.nrows();
        let nmob = fockb.nrows();
        if focka.ncols() != nmoa || fockb.ncols() != nmob {
            return Err(eyre!(
                "Fock matrices must be square, got {:?} and {:?}",
                focka.dim(),
                fockb.dim()
            ));
        }
        if nocca > nmoa || noccb > nmob {
            return Err(eyre!(
                "more occupied than total orbitals: nmo=({}, {}), nocc={:?}",
                nmoa,
                nmob,
                nocc
            ));
        }
        let expected = [
            ("eri_aa", eri_aa.dim(), (nmoa, nmoa, nmoa, nmoa)),
            ("eri_ab", eri_ab.dim(), (nmoa, nmoa, nmob, nmob)),
            ("eri_bb", eri_bb.dim(), (nmob, nmob, nmob, nmob)),
        ];
        for (name, found, wanted) in expected {
            if found != wanted {
                return Err(eyre!("{} has shape {:?}, expected {:?}", name, found, wanted));
            }
        }

        Ok(UEris {
            focka: focka.to_owned(),
            fockb: fockb.to_owned(),
            nocca,
            noccb,
            aa: SameSpinBlocks::from_mo(eri_aa, nocca),
            ab: MixedSpinBlocks::from_mo(eri_ab, nocca, noccb),
            bb: SameSpinBlocks::from_mo(eri_bb, noccb),
        })
    }

    pub fn nmo(&self) -> (usize, usize) {
        (self.focka.nrows(), self.fockb.nrows())
    }

    pub fn nocc(&self) -> (usize, usize) {
        (self.nocca, self.noccb)
    }

    pub fn nvir(&self) -> (usize, usize) {
        let (nmoa, nmob) = self.nmo();
        (nmoa - self.nocca, nmob - self.noccb)
    }

    /// Packed `vvvv`, `vvVV` and `VVVV` blocks, or a lookup error naming the
    /// first one that is absent.
    pub fn vvvv_blocks(&self) -> Result<[ArrayView2<'_, f64>; 3]> {
        Ok([
            lookup(&self.aa.vvvv, "vvvv")?,
            lookup(&self.ab.vvvv, "vvVV")?,
            lookup(&self.bb.vvvv, "VVVV")?,
        ])
    }

    /// Drop the four-virtual blocks, e.g. when they are too large to keep.
    pub fn without_vvvv(mut self) -> Self {
        self.aa.vvvv = None;
        self.ab.vvvv = None;
        self.bb.vvvv = None;
        self
    }

    /// Estimated size of the in-core blocks in MB.
    pub fn memory_mb(&self) -> f64 {
        let same = |b: &SameSpinBlocks| {
            b.oooo.len()
                + b.ovoo.len()
                + b.oovv.len()
                + b.ovvo.len()
                + b.ovvv.len()
                + b.vvvv.as_ref().map_or(0, |x| x.len())
        };
        let ab = &self.ab;
        let mixed = ab.oooo.len()
            + ab.ovoo.len()
            + ab.oovv.len()
            + ab.ovvo.len()
            + ab.ovvv.len()
            + ab.vvvv.as_ref().map_or(0, |x| x.len())
            + ab.ovoo_ba.len()
            + ab.oovv_ba.len()
            + ab.ovvv_ba.len();
        let fock = self.focka.len() + self.fockb.len();
        (same(&self.aa) + same(&self.bb) + mixed + fock) as f64 * 8.0 / 1e6
    }
}

/// Unpack `(ia|bc)` with `b` restricted to `p0..p1` from a packed three-virtual
/// block, giving shape `(nocc, p1-p0, nvir, nvir)`.
pub(crate) fn unpack_ovvv(packed: &Array3<f64>, p0: usize, p1: usize, nvir: usize) -> Array4<f64> {
    unpack_tril_last(packed.slice_axis(Axis(1), (p0..p1).into()), nvir)
}
