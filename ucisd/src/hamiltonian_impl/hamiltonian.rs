//! Amplitude-space Hamiltonian capability and its unrestricted implementation

use crate::eris_impl::UEris;
use color_eyre::eyre::Result;
use ndarray::{Array1, Array4, ArrayView1};

use super::{contract, diagonal, vvvv};

/// Operations an eigensolver needs from a CI Hamiltonian acting on flat
/// amplitude vectors.
pub trait AmplitudeHamiltonian {
    /// Integral container the operations read from
    type Eris;
    /// Doubles amplitudes in the spin blocking of this variant
    type Doubles;

    /// Diagonal of `H` in the flat layout; element 0 is the reference energy.
    fn make_diagonal(&self, eris: &Self::Eris) -> Array1<f64>;

    /// `(H - E_ref) c` for a flat amplitude vector `c`.
    fn contract(&self, civec: ArrayView1<'_, f64>, eris: &Self::Eris) -> Result<Array1<f64>>;

    /// Particle-particle ladder contribution of the four-virtual integrals.
    fn add_vvvv(&self, c2: &Self::Doubles, eris: &Self::Eris) -> Result<Self::Doubles>;
}

/// Doubles amplitudes for the three spin channels.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinDoubles {
    pub aa: Array4<f64>,
    pub ab: Array4<f64>,
    pub bb: Array4<f64>,
}

/// Unrestricted (spin-separated alpha/beta orbitals) CISD Hamiltonian.
#[derive(Debug, Clone, Copy)]
pub struct UnrestrictedHamiltonian {
    /// Memory ceiling in MB for the streamed three- and four-virtual contractions
    pub max_memory: f64,
}

impl Default for UnrestrictedHamiltonian {
    fn default() -> Self {
        UnrestrictedHamiltonian { max_memory: 4000.0 }
    }
}

impl UnrestrictedHamiltonian {
    pub fn new(max_memory: f64) -> Self {
        UnrestrictedHamiltonian { max_memory }
    }
}

impl AmplitudeHamiltonian for UnrestrictedHamiltonian {
    type Eris = UEris;
    type Doubles = SpinDoubles;

    fn make_diagonal(&self, eris: &UEris) -> Array1<f64> {
        diagonal::make_diagonal(eris)
    }

    fn contract(&self, civec: ArrayView1<'_, f64>, eris: &UEris) -> Result<Array1<f64>> {
        contract::contract(civec, eris, self.max_memory)
    }

    fn add_vvvv(&self, c2: &SpinDoubles, eris: &UEris) -> Result<SpinDoubles> {
        vvvv::add_vvvv(c2, eris, crate::memory::available_memory_mb(self.max_memory))
    }
}
