//! Lower-triangular pair indexing
//!
//! Same-spin doubles are antisymmetric in both index pairs and are stored only
//! for `i > j`, `a > b`; the packed `ovvv`/`vvvv` integral blocks are symmetric
//! in their pair and keep the diagonal. Both orders follow the row-major lower
//! triangle: `(1,0), (2,0), (2,1), (3,0), ...` for strict pairs and
//! `(0,0), (1,0), (1,1), (2,0), ...` when the diagonal is included.

use itertools::iproduct;
use ndarray::{Array1, Array2, Array3, Array4, ArrayView1, ArrayView2, ArrayView3, ArrayView4};

/// Compressed index over the unordered pairs of `0..n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrilPairs {
    n: usize,
    strict: bool,
}

impl TrilPairs {
    /// Pairs with `i > j`.
    pub fn strict(n: usize) -> Self {
        TrilPairs { n, strict: true }
    }

    /// Pairs with `i >= j`.
    pub fn with_diagonal(n: usize) -> Self {
        TrilPairs { n, strict: false }
    }

    pub fn dim(&self) -> usize {
        self.n
    }

    pub fn len(&self) -> usize {
        if self.strict {
            self.n * self.n.saturating_sub(1) / 2
        } else {
            self.n * (self.n + 1) / 2
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compressed index of the pair `{i, j}`; the argument order does not matter.
    /// Returns `None` for `i == j` on strict pairs.
    #[inline]
    pub fn index_of(&self, i: usize, j: usize) -> Option<usize> {
        let (hi, lo) = if i >= j { (i, j) } else { (j, i) };
        debug_assert!(hi < self.n);
        if self.strict {
            (hi != lo).then(|| hi * (hi - 1) / 2 + lo)
        } else {
            Some(hi * (hi + 1) / 2 + lo)
        }
    }

    /// Pair `(i, j)` with `i > j` (or `i >= j`) stored at `index`.
    pub fn pair_at(&self, index: usize) -> (usize, usize) {
        assert!(index < self.len(), "pair index {} out of range", index);
        let mut row = if self.strict { 1 } else { 0 };
        let mut start = 0;
        loop {
            let width = if self.strict { row } else { row + 1 };
            if index < start + width {
                return (row, index - start);
            }
            start += width;
            row += 1;
        }
    }

    /// Pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + Clone {
        let strict = self.strict;
        (0..self.n).flat_map(move |i| {
            let end = if strict { i } else { i + 1 };
            (0..end).map(move |j| (i, j))
        })
    }
}

/// Gather the strict-lower-triangle occupied-pair x virtual-pair submatrix of
/// an antisymmetric doubles tensor of shape `(no, no, nv, nv)`.
pub fn pack_4fold(full: ArrayView4<'_, f64>) -> Array1<f64> {
    let (no, _, nv, _) = full.dim();
    let oo = TrilPairs::strict(no);
    let vv = TrilPairs::strict(nv);
    iproduct!(oo.iter(), vv.iter())
        .map(|((i, j), (a, b))| full[[i, j, a, b]])
        .collect()
}

/// Expand a packed doubles segment back to the full antisymmetric tensor.
pub fn unpack_4fold(packed: ArrayView1<'_, f64>, no: usize, nv: usize) -> Array4<f64> {
    let oo = TrilPairs::strict(no);
    let vv = TrilPairs::strict(nv);
    assert_eq!(packed.len(), oo.len() * vv.len(), "packed doubles length");

    let mut full = Array4::zeros((no, no, nv, nv));
    for (value, ((i, j), (a, b))) in packed.iter().zip(iproduct!(oo.iter(), vv.iter())) {
        full[[i, j, a, b]] = *value;
        full[[j, i, a, b]] = -*value;
        full[[i, j, b, a]] = -*value;
        full[[j, i, b, a]] = *value;
    }
    full
}

/// Lower triangle (diagonal included) of a square matrix.
pub fn pack_tril(mat: ArrayView2<'_, f64>) -> Array1<f64> {
    let pairs = TrilPairs::with_diagonal(mat.nrows());
    pairs.iter().map(|(i, j)| mat[[i, j]]).collect()
}

/// Symmetric matrix from its packed lower triangle.
pub fn unpack_tril(packed: ArrayView1<'_, f64>, n: usize) -> Array2<f64> {
    let pairs = TrilPairs::with_diagonal(n);
    assert_eq!(packed.len(), pairs.len(), "packed triangle length");
    Array2::from_shape_fn((n, n), |(i, j)| packed[pairs.index_of(i, j).unwrap_or(0)])
}

/// Unpack the trailing pair axis of a `(d0, d1, npair)` block into `(d0, d1, n, n)`.
pub fn unpack_tril_last(packed: ArrayView3<'_, f64>, n: usize) -> Array4<f64> {
    let (d0, d1, npair) = packed.dim();
    let pairs = TrilPairs::with_diagonal(n);
    assert_eq!(npair, pairs.len(), "packed pair axis length");
    Array4::from_shape_fn((d0, d1, n, n), |(p, q, r, s)| {
        packed[[p, q, pairs.index_of(r, s).unwrap_or(0)]]
    })
}

/// Pack the trailing two axes of a `(d0, d1, n, n)` block symmetric in them.
pub fn pack_tril_last(full: ArrayView4<'_, f64>) -> Array3<f64> {
    let (d0, d1, n, _) = full.dim();
    let pairs = TrilPairs::with_diagonal(n);
    let mut packed = Array3::zeros((d0, d1, pairs.len()));
    for (ij, (i, j)) in pairs.iter().enumerate() {
        packed
            .slice_mut(ndarray::s![.., .., ij])
            .assign(&full.slice(ndarray::s![.., .., i, j]));
    }
    packed
}
