//! Density matrices of a CISD wavefunction
//!
//! [`gamma1_intermediates`] and [`gamma2_intermediates`] return the
//! spin-blocked correlation pieces; [`make_rdm1`] and [`make_rdm2`] assemble
//! them into full-orbital density matrices with the reference contributions.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ucisd::{gamma1_intermediates, gamma2_intermediates, make_rdm1, make_rdm2};
//!
//! let d1 = gamma1_intermediates(civec.view(), nmo, nocc)?;
//! let d2 = gamma2_intermediates(civec.view(), nmo, nocc)?;
//! let (dm1a, dm1b) = make_rdm1(&d1);
//! let (dm2aa, dm2ab, dm2bb) = make_rdm2(&d1, &d2)?;
//! ```

mod intermediates;
mod rdm;

pub use intermediates::{gamma1_intermediates, gamma2_intermediates, Gamma1, Gamma2, SpinBlocks, SpinPair};
pub use rdm::{make_rdm1, make_rdm2, trace_last_pair};
