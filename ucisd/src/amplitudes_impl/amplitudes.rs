//! Flat amplitude vector <-> spin-blocked amplitude tensors
//!
//! The flat layout is `c0 | c1a | c1b | c2ab | c2aa | c2bb`. Singles and the
//! mixed-spin doubles are stored densely in row-major order; the same-spin
//! doubles keep only `i > j`, `a > b` (see [`crate::tensor::TrilPairs`]).

use crate::tensor::{pack_4fold, unpack_4fold, TrilPairs};
use color_eyre::eyre::{eyre, Result};
use ndarray::{s, Array1, Array2, Array4, ArrayView1};

/// Orbital counts that fix the length and segment boundaries of a CISD vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CisdLayout {
    pub nocca: usize,
    pub noccb: usize,
    pub nvira: usize,
    pub nvirb: usize,
}

impl CisdLayout {
    /// Fails when a spin has more occupied than total orbitals.
    pub fn try_from_nmo_nocc(nmo: (usize, usize), nocc: (usize, usize)) -> Result<Self> {
        let (nmoa, nmob) = nmo;
        let (nocca, noccb) = nocc;
        if nocca > nmoa || noccb > nmob {
            return Err(eyre!(
                "more occupied than total orbitals: nmo={:?}, nocc={:?}",
                nmo,
                nocc
            ));
        }
        Ok(CisdLayout {
            nocca,
            noccb,
            nvira: nmoa - nocca,
            nvirb: nmob - noccb,
        })
    }

    /// # Panics
    ///
    /// Panics when a spin has more occupied than total orbitals.
    pub fn from_nmo_nocc(nmo: (usize, usize), nocc: (usize, usize)) -> Self {
        Self::try_from_nmo_nocc(nmo, nocc).unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn nmo(&self) -> (usize, usize) {
        (self.nocca + self.nvira, self.noccb + self.nvirb)
    }

    pub fn nocc(&self) -> (usize, usize) {
        (self.nocca, self.noccb)
    }

    /// Segment lengths in storage order: c0, c1a, c1b, c2ab, c2aa, c2bb.
    pub fn sizes(&self) -> [usize; 6] {
        let CisdLayout {
            nocca,
            noccb,
            nvira,
            nvirb,
        } = *self;
        [
            1,
            nocca * nvira,
            noccb * nvirb,
            nocca * noccb * nvira * nvirb,
            TrilPairs::strict(nocca).len() * TrilPairs::strict(nvira).len(),
            TrilPairs::strict(noccb).len() * TrilPairs::strict(nvirb).len(),
        ]
    }

    /// Cumulative segment ends; segment `k` is `offsets[k-1]..offsets[k]`.
    pub fn offsets(&self) -> [usize; 6] {
        let mut loc = self.sizes();
        for k in 1..loc.len() {
            loc[k] += loc[k - 1];
        }
        loc
    }

    pub fn len(&self) -> usize {
        self.offsets()[5]
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Structured CISD amplitudes. `c2aa` and `c2bb` are full antisymmetric tensors.
#[derive(Debug, Clone, PartialEq)]
pub struct CisdAmplitudes {
    pub c0: f64,
    pub c1a: Array2<f64>,
    pub c1b: Array2<f64>,
    pub c2aa: Array4<f64>,
    pub c2ab: Array4<f64>,
    pub c2bb: Array4<f64>,
}

impl CisdAmplitudes {
    pub fn zeros(layout: &CisdLayout) -> Self {
        let CisdLayout {
            nocca,
            noccb,
            nvira,
            nvirb,
        } = *layout;
        CisdAmplitudes {
            c0: 0.0,
            c1a: Array2::zeros((nocca, nvira)),
            c1b: Array2::zeros((noccb, nvirb)),
            c2aa: Array4::zeros((nocca, nocca, nvira, nvira)),
            c2ab: Array4::zeros((nocca, noccb, nvira, nvirb)),
            c2bb: Array4::zeros((noccb, noccb, nvirb, nvirb)),
        }
    }

    pub fn layout(&self) -> CisdLayout {
        let (nocca, nvira) = self.c1a.dim();
        let (noccb, nvirb) = self.c1b.dim();
        CisdLayout {
            nocca,
            noccb,
            nvira,
            nvirb,
        }
    }
}

/// Pack structured amplitudes into one flat vector.
pub fn amplitudes_to_cisdvec(amps: &CisdAmplitudes) -> Array1<f64> {
    let layout = amps.layout();
    let loc = layout.offsets();
    let mut civec = Array1::zeros(layout.len());

    civec[0] = amps.c0;
    let dense = [
        (amps.c1a.iter(), loc[0], loc[1]),
        (amps.c1b.iter(), loc[1], loc[2]),
    ];
    for (values, p0, p1) in dense {
        civec.slice_mut(s![p0..p1]).iter_mut().zip(values).for_each(|(dst, &v)| *dst = v);
    }
    civec
        .slice_mut(s![loc[2]..loc[3]])
        .iter_mut()
        .zip(amps.c2ab.iter())
        .for_each(|(dst, &v)| *dst = v);
    civec
        .slice_mut(s![loc[3]..loc[4]])
        .assign(&pack_4fold(amps.c2aa.view()));
    civec
        .slice_mut(s![loc[4]..loc[5]])
        .assign(&pack_4fold(amps.c2bb.view()));
    civec
}

/// Unpack a flat vector for `nmo = (nmoa, nmob)` orbitals with `nocc = (nocca, noccb)`
/// occupied. Fails when the vector length does not match the layout.
pub fn cisdvec_to_amplitudes(
    civec: ArrayView1<'_, f64>,
    nmo: (usize, usize),
    nocc: (usize, usize),
) -> Result<CisdAmplitudes> {
    let layout = CisdLayout::try_from_nmo_nocc(nmo, nocc)?;
    if civec.len() != layout.len() {
        return Err(eyre!(
            "CISD vector has length {} but nmo={:?}, nocc={:?} requires {}",
            civec.len(),
            nmo,
            nocc,
            layout.len()
        ));
    }
    let CisdLayout {
        nocca,
        noccb,
        nvira,
        nvirb,
    } = layout;
    let loc = layout.offsets();

    let segment = |p0: usize, p1: usize| civec.slice(s![p0..p1]).to_owned();
    let c1a = segment(loc[0], loc[1]).into_shape((nocca, nvira))?;
    let c1b = segment(loc[1], loc[2]).into_shape((noccb, nvirb))?;
    let c2ab = segment(loc[2], loc[3]).into_shape((nocca, noccb, nvira, nvirb))?;

    Ok(CisdAmplitudes {
        c0: civec[0],
        c1a,
        c1b,
        c2aa: unpack_4fold(civec.slice(s![loc[3]..loc[4]]), nocca, nvira),
        c2ab,
        c2bb: unpack_4fold(civec.slice(s![loc[4]..loc[5]]), noccb, nvirb),
    })
}
