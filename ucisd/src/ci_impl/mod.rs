//! Unrestricted CISD driver
//!
//! # Usage
//!
//! ```rust,ignore
//! use ucisd::{CisdParams, UhfReference, UCISD};
//!
//! let reference = UhfReference::new(h1a, h1b, eri_aa, eri_ab, eri_bb, (nocca, noccb), e_nuc)?;
//! let mut ci = UCISD::new(reference, CisdParams::default());
//! let eris = ci.ao2mo()?;
//! let e_corr = ci.kernel(&eris)?;
//! let (dm1a, dm1b) = ci.make_rdm1(None)?;
//! ```

mod ci;

pub use ci::UCISD;
