//! Sigma vector `(H - E_ref) c` for unrestricted CISD
//!
//! Index letters follow the usual convention: `i, j, m, n` occupied and
//! `a, b, e, f` virtual alpha orbitals, upper case for beta. Same-spin doubles
//! are accumulated without their permutational partners and antisymmetrized
//! with `(1 - P_ab)(1 - P_ij)` once all partner-free terms are in; the factors
//! 1/4 and 1/2 on those terms compensate the four images this creates.

use crate::amplitudes_impl::{amplitudes_to_cisdvec, cisdvec_to_amplitudes, CisdAmplitudes};
use crate::eris_impl::{unpack_ovvv, UEris};
use crate::tensor::{choose_block_size, einsum0, einsum2, einsum4, BlockRange};
use color_eyre::eyre::Result;
use ndarray::{s, Array1, Array4, ArrayView1};
use tracing::debug;

use super::{vvvv, SpinDoubles};

fn antisymmetrize(t2: Array4<f64>) -> Array4<f64> {
    let t2 = &t2 - &t2.view().permuted_axes([0, 1, 3, 2]);
    &t2 - &t2.view().permuted_axes([1, 0, 2, 3])
}

pub(super) fn contract(civec: ArrayView1<'_, f64>, eris: &UEris, max_memory: f64) -> Result<Array1<f64>> {
    let (nocca, noccb) = eris.nocc();
    let (nvira, nvirb) = eris.nvir();
    let CisdAmplitudes {
        c0,
        c1a,
        c1b,
        c2aa,
        c2ab,
        c2bb,
    } = cisdvec_to_amplitudes(civec, eris.nmo(), eris.nocc())?;
    let budget_mb = crate::memory::available_memory_mb(max_memory);

    let c2 = SpinDoubles {
        aa: c2aa,
        ab: c2ab,
        bb: c2bb,
    };
    let SpinDoubles {
        aa: mut t2aa,
        ab: mut t2ab,
        bb: mut t2bb,
    } = vvvv::add_vvvv(&c2, eris, budget_mb)?;
    let SpinDoubles {
        aa: c2aa,
        ab: c2ab,
        bb: c2bb,
    } = c2;
    t2aa *= 0.25;
    t2bb *= 0.25;

    let fooa = eris.focka.slice(s![..nocca, ..nocca]);
    let foob = eris.fockb.slice(s![..noccb, ..noccb]);
    let fova = eris.focka.slice(s![..nocca, nocca..]);
    let fovb = eris.fockb.slice(s![..noccb, noccb..]);
    let fvva = eris.focka.slice(s![nocca.., nocca..]);
    let fvvb = eris.fockb.slice(s![noccb.., noccb..]);

    let (aa, ab, bb) = (&eris.aa, &eris.ab, &eris.bb);
    let eris_ovvo = aa.ovvo.view();
    let eris_ovvo_bb = bb.ovvo.view();
    let eris_ovvo_ab = ab.ovvo.view();

    // reference weight times <ij||ab>
    t2aa.scaled_add(0.25 * c0, &eris_ovvo.permuted_axes([0, 3, 1, 2]));
    t2aa.scaled_add(-0.25 * c0, &eris_ovvo.permuted_axes([0, 3, 2, 1]));
    t2bb.scaled_add(0.25 * c0, &eris_ovvo_bb.permuted_axes([0, 3, 1, 2]));
    t2bb.scaled_add(-0.25 * c0, &eris_ovvo_bb.permuted_axes([0, 3, 2, 1]));
    t2ab.scaled_add(c0, &eris_ovvo_ab.permuted_axes([0, 3, 1, 2]));

    let mut t0 = 0.0;
    t0 += einsum0("iabj,ijab->", eris_ovvo, c2aa.view()) * 0.25;
    t0 -= einsum0("jabi,ijab->", eris_ovvo, c2aa.view()) * 0.25;
    t0 += einsum0("iabj,ijab->", eris_ovvo_bb, c2bb.view()) * 0.25;
    t0 -= einsum0("jabi,ijab->", eris_ovvo_bb, c2bb.view()) * 0.25;
    t0 += einsum0("iabj,ijab->", eris_ovvo_ab, c2ab.view());

    // particle-hole rings
    let ovvo = &aa.ovvo - &aa.oovv.view().permuted_axes([0, 3, 2, 1]);
    let ovvo_bb = &bb.ovvo - &bb.oovv.view().permuted_axes([0, 3, 2, 1]);
    t2aa += &einsum4("imae,jbem->ijab", c2aa.view(), ovvo.view());
    t2aa += &einsum4("iMaE,jbEM->ijab", c2ab.view(), eris_ovvo_ab);
    t2bb += &einsum4("imae,jbem->ijab", c2bb.view(), ovvo_bb.view());
    t2bb += &einsum4("mIeA,meBJ->IJAB", c2ab.view(), eris_ovvo_ab);
    t2ab += &einsum4("imae,meBJ->iJaB", c2aa.view(), eris_ovvo_ab);
    t2ab += &einsum4("iMaE,MEBJ->iJaB", c2ab.view(), ovvo_bb.view());
    t2ab += &einsum4("IMAE,jbEM->jIbA", c2bb.view(), eris_ovvo_ab);
    t2ab += &einsum4("mIeA,jbem->jIbA", c2ab.view(), ovvo.view());
    t2ab -= &einsum4("iMeA,JMeb->iJbA", c2ab.view(), ab.oovv_ba.view());
    t2ab -= &einsum4("mIaE,jmEB->jIaB", c2ab.view(), ab.oovv.view());

    // singles coupled through the exchange blocks
    let mut t1a = einsum2("nf,nfai->ia", c1a.view(), eris_ovvo);
    t1a -= &einsum2("nf,nifa->ia", c1a.view(), aa.oovv.view());
    let mut t1b = einsum2("nf,nfai->ia", c1b.view(), eris_ovvo_bb);
    t1b -= &einsum2("nf,nifa->ia", c1b.view(), bb.oovv.view());
    t1b += &einsum2("nf,nfai->ia", c1a.view(), eris_ovvo_ab);
    t1a += &einsum2("nf,iafn->ia", c1b.view(), eris_ovvo_ab);

    // three-occupied blocks
    t1a += &einsum2("mnae,meni->ia", c2aa.view(), aa.ovoo.view());
    t1b += &einsum2("mnae,meni->ia", c2bb.view(), bb.ovoo.view());
    t1a -= &einsum2("nMaE,MEni->ia", c2ab.view(), ab.ovoo_ba.view());
    t1b -= &einsum2("mNeA,meNI->IA", c2ab.view(), ab.ovoo.view());
    t2aa -= &einsum4("ma,jbmi->jiba", c1a.view(), aa.ovoo.view());
    t2bb -= &einsum4("ma,jbmi->jiba", c1b.view(), bb.ovoo.view());
    t2ab -= &einsum4("ma,JBmi->iJaB", c1a.view(), ab.ovoo_ba.view());
    t2ab -= &einsum4("MA,ibMJ->iJbA", c1b.view(), ab.ovoo.view());

    // three-virtual blocks, streamed over their first virtual index
    let budget = budget_mb * 1e6;
    if nvira > 0 && nocca > 0 {
        let blksize = choose_block_size(budget, 8, nvira * nvira * nocca * 2);
        debug!("ovvv: {} virtuals per block", blksize);
        for (p0, p1) in BlockRange::new(0, nvira, blksize) {
            let ovvv = unpack_ovvv(&aa.ovvv, p0, p1, nvira);
            t1a += &einsum2("mief,mefa->ia", c2aa.slice(s![.., .., p0..p1, ..]), ovvv.view());
            let mut block = t2aa.slice_mut(s![.., .., p0..p1, ..]);
            block += &einsum4("mbae,ie->miba", ovvv.view(), c1a.view());
        }
    }
    if nvirb > 0 && noccb > 0 {
        let blksize = choose_block_size(budget, 8, nvirb * nvirb * noccb * 2);
        debug!("OVVV: {} virtuals per block", blksize);
        for (p0, p1) in BlockRange::new(0, nvirb, blksize) {
            let ovvv = unpack_ovvv(&bb.ovvv, p0, p1, nvirb);
            t1b += &einsum2("MIEF,MEFA->IA", c2bb.slice(s![.., .., p0..p1, ..]), ovvv.view());
            let mut block = t2bb.slice_mut(s![.., .., p0..p1, ..]);
            block += &einsum4("mbae,ie->miba", ovvv.view(), c1b.view());
        }
    }
    if nvirb > 0 && nocca > 0 {
        let blksize = choose_block_size(budget, 8, nvirb * nvirb * nocca * 2);
        debug!("ovVV: {} virtuals per block", blksize);
        for (p0, p1) in BlockRange::new(0, nvira, blksize) {
            let ovvv = unpack_ovvv(&ab.ovvv, p0, p1, nvirb);
            t1b += &einsum2("mIeF,meAF->IA", c2ab.slice(s![.., .., p0..p1, ..]), ovvv.view());
            let mut block = t2ab.slice_mut(s![.., .., p0..p1, ..]);
            block += &einsum4("maBE,IE->mIaB", ovvv.view(), c1b.view());
        }
    }
    if nvira > 0 && noccb > 0 {
        let blksize = choose_block_size(budget, 8, nvira * nvira * noccb * 2);
        debug!("OVvv: {} virtuals per block", blksize);
        for (p0, p1) in BlockRange::new(0, nvirb, blksize) {
            let ovvv = unpack_ovvv(&ab.ovvv_ba, p0, p1, nvira);
            t1a += &einsum2("iMfE,MEaf->ia", c2ab.slice(s![.., .., .., p0..p1]), ovvv.view());
            let mut block = t2ab.slice_mut(s![.., .., .., p0..p1]);
            block += &einsum4("MBae,ie->iMaB", ovvv.view(), c1a.view());
        }
    }

    // Fock particle and hole lines
    t1a += &einsum2("ie,ae->ia", c1a.view(), fvva);
    t1b += &einsum2("ie,ae->ia", c1b.view(), fvvb);
    t1a -= &einsum2("ma,mi->ia", c1a.view(), fooa);
    t1b -= &einsum2("ma,mi->ia", c1b.view(), foob);
    t1a += &einsum2("imae,me->ia", c2aa.view(), fova);
    t1a += &einsum2("imae,me->ia", c2ab.view(), fovb);
    t1b += &einsum2("imae,me->ia", c2bb.view(), fovb);
    t1b += &einsum2("miea,me->ia", c2ab.view(), fova);

    t2aa.scaled_add(0.5, &einsum4("ijae,be->ijab", c2aa.view(), fvva));
    t2bb.scaled_add(0.5, &einsum4("ijae,be->ijab", c2bb.view(), fvvb));
    t2ab += &einsum4("iJaE,BE->iJaB", c2ab.view(), fvvb);
    t2ab += &einsum4("iJeA,be->iJbA", c2ab.view(), fvva);
    t2aa.scaled_add(-0.5, &einsum4("imab,mj->ijab", c2aa.view(), fooa));
    t2bb.scaled_add(-0.5, &einsum4("imab,mj->ijab", c2bb.view(), foob));
    t2ab -= &einsum4("iMaB,MJ->iJaB", c2ab.view(), foob);
    t2ab -= &einsum4("mIaB,mj->jIaB", c2ab.view(), fooa);

    t2aa += &einsum4("ia,jb->ijab", c1a.view(), fova);
    t2bb += &einsum4("ia,jb->ijab", c1b.view(), fovb);
    t2ab += &einsum4("ia,jb->ijab", c1a.view(), fovb);
    t2ab += &einsum4("ia,jb->jiba", c1b.view(), fova);

    let mut t2aa = antisymmetrize(t2aa);
    let mut t2bb = antisymmetrize(t2bb);

    // hole-hole ladder
    t2aa += &einsum4("mnab,minj->ijab", c2aa.view(), aa.oooo.view());
    t2bb += &einsum4("mnab,minj->ijab", c2bb.view(), bb.oooo.view());
    t2ab += &einsum4("mNaB,miNJ->iJaB", c2ab.view(), ab.oooo.view());

    t1a.scaled_add(c0, &fova);
    t1b.scaled_add(c0, &fovb);
    t0 += einsum0("ia,ia->", fova, c1a.view());
    t0 += einsum0("ia,ia->", fovb, c1b.view());

    Ok(amplitudes_to_cisdvec(&CisdAmplitudes {
        c0: t0,
        c1a: t1a,
        c1b: t1b,
        c2aa: t2aa,
        c2ab: t2ab,
        c2bb: t2bb,
    }))
}
