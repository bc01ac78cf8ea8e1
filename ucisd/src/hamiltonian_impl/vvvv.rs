//! Particle-particle ladder `t2[i,j,a,b] = sum_ef c2[i,j,e,f] (ae|bf)`

use crate::eris_impl::UEris;
use crate::tensor::{choose_block_size, einsum4, BlockRange, TrilPairs};
use color_eyre::eyre::Result;
use ndarray::{s, Array4, ArrayView2, ArrayView4};
use tracing::debug;

use super::SpinDoubles;

/// `(ae|bf)` for `a` in `p0..p1`, unpacked from pair-packed storage.
fn unpack_vvvv_rows(
    packed: ArrayView2<'_, f64>,
    nvir_bra: usize,
    nvir_ket: usize,
    p0: usize,
    p1: usize,
) -> Array4<f64> {
    let bra = TrilPairs::with_diagonal(nvir_bra);
    let ket = TrilPairs::with_diagonal(nvir_ket);
    Array4::from_shape_fn((p1 - p0, nvir_bra, nvir_ket, nvir_ket), |(a, e, b, f)| {
        let ae = bra.index_of(p0 + a, e).unwrap_or(0);
        let bf = ket.index_of(b, f).unwrap_or(0);
        packed[[ae, bf]]
    })
}

fn ladder(c2: ArrayView4<'_, f64>, vvvv: ArrayView2<'_, f64>, budget_bytes: f64, label: &str) -> Array4<f64> {
    let (nocc1, nocc2, nvir1, nvir2) = c2.dim();
    let mut t2 = Array4::zeros((nocc1, nocc2, nvir1, nvir2));
    if nvir1 == 0 || nvir2 == 0 {
        return t2;
    }
    let blksize = choose_block_size(budget_bytes, 8, nvir1 * nvir2 * nvir2);
    debug!("{} ladder: {} virtuals per block", label, blksize);
    for (p0, p1) in BlockRange::new(0, nvir1, blksize) {
        let eri = unpack_vvvv_rows(vvvv, nvir1, nvir2, p0, p1);
        t2.slice_mut(s![.., .., p0..p1, ..])
            .assign(&einsum4("ijef,aebf->ijab", c2, eri.view()));
    }
    t2
}

pub(super) fn add_vvvv(c2: &SpinDoubles, eris: &UEris, budget_mb: f64) -> Result<SpinDoubles> {
    let [vvvv, vv_vv, vvvv_bb] = eris.vvvv_blocks()?;
    let budget = budget_mb * 1e6;
    Ok(SpinDoubles {
        aa: ladder(c2.aa.view(), vvvv, budget, "vvvv"),
        ab: ladder(c2.ab.view(), vv_vv, budget, "vvVV"),
        bb: ladder(c2.bb.view(), vvvv_bb, budget, "VVVV"),
    })
}
