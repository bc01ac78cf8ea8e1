//! MO integral container for the unrestricted amplitude engine
//!
//! [`UEris`] is built once per calculation and only read afterwards. Blocks
//! are grouped by spin: `aa` and `bb` hold same-spin integrals, `ab` holds the
//! mixed alpha/beta integrals.

mod eris;
mod tests;

pub(crate) use eris::unpack_ovvv;
pub use eris::{MixedSpinBlocks, SameSpinBlocks, UEris};
