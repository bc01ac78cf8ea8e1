//! Dense tensor helpers shared by the amplitude engine
//!
//! - [`einsum`]: two-operand contractions in `einsum` notation, evaluated as GEMM
//! - [`TrilPairs`] and the `pack_*`/`unpack_*` helpers: symmetry-compressed pair storage
//! - [`choose_block_size`] and [`BlockRange`]: streaming over a memory budget

mod blocking;
mod einsum;
mod tests;
mod tril;

pub use blocking::{choose_block_size, BlockRange};
pub use einsum::{einsum, einsum0, einsum2, einsum4};
pub use tril::{
    pack_4fold, pack_tril, pack_tril_last, unpack_4fold, unpack_tril, unpack_tril_last, TrilPairs,
};

use ndarray::{Array4, ArrayView2};

/// Pairwise sum `out[i,j,a,b] = x[i,a] + y[j,b]`.
pub fn pair_sum(x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>) -> Array4<f64> {
    let (ni, na) = x.dim();
    let (nj, nb) = y.dim();
    Array4::from_shape_fn((ni, nj, na, nb), |(i, j, a, b)| x[[i, a]] + y[[j, b]])
}
