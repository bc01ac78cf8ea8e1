//! CISD Hamiltonian in amplitude space
//!
//! The eigensolver only sees flat vectors: it asks for the diagonal once and
//! for `(H - E_ref) c` on every trial vector. [`AmplitudeHamiltonian`] names
//! these operations so a driver can be written once and handed the spin
//! variant at construction.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ucisd::{AmplitudeHamiltonian, UnrestrictedHamiltonian};
//!
//! let ham = UnrestrictedHamiltonian::new(4000.0);
//! let diag = ham.make_diagonal(&eris);
//! let sigma = ham.contract(civec.view(), &eris)?;
//! ```

mod contract;
mod diagonal;
mod hamiltonian;
mod vvvv;

pub use hamiltonian::{AmplitudeHamiltonian, SpinDoubles, UnrestrictedHamiltonian};
