//! CISD amplitude vector codec
//!
//! Converts between the flat vector handed to the eigensolver and the
//! spin-blocked tensors `(c0, c1a, c1b, c2aa, c2ab, c2bb)` used by the
//! contractions.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ucisd::{amplitudes_to_cisdvec, cisdvec_to_amplitudes};
//!
//! let civec = amplitudes_to_cisdvec(&amps);
//! let amps = cisdvec_to_amplitudes(civec.view(), (nmoa, nmob), (nocca, noccb))?;
//! ```

mod amplitudes;
mod tests;

pub use amplitudes::{amplitudes_to_cisdvec, cisdvec_to_amplitudes, CisdAmplitudes, CisdLayout};
