// Main library file for unrestricted CISD calculations

pub mod amplitudes_impl;
pub mod ci_impl;
pub mod config;
pub mod davidson_impl;
pub mod density_impl;
pub mod eris_impl;
pub mod hamiltonian_impl;
pub mod io;
pub mod memory;
pub mod reference;
pub mod tensor;
#[cfg(test)]
mod testing;

pub use amplitudes_impl::{amplitudes_to_cisdvec, cisdvec_to_amplitudes, CisdAmplitudes, CisdLayout};
pub use ci_impl::UCISD;
pub use config::{CisdParams, Config};
pub use davidson_impl::{davidson, DavidsonParams, DavidsonResult};
pub use density_impl::{gamma1_intermediates, gamma2_intermediates, make_rdm1, make_rdm2, Gamma1, Gamma2};
pub use eris_impl::UEris;
pub use hamiltonian_impl::{AmplitudeHamiltonian, SpinDoubles, UnrestrictedHamiltonian};
pub use reference::UhfReference;
