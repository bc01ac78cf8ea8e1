//! Davidson eigensolver over flat amplitude vectors
//!
//! The operator is supplied as a batch mat-vec closure so the caller decides
//! how trial vectors are evaluated (the CISD driver maps them over a rayon
//! pool). The subspace problem is solved with `nalgebra`'s symmetric
//! eigendecomposition.

mod davidson;

pub use davidson::{davidson, DavidsonParams, DavidsonResult};
