//! Pairwise tensor contraction written in `einsum` notation
//!
//! A contraction such as `"imae,jbem->ijab"` is evaluated by permuting both
//! operands so that the summed labels are adjacent, flattening them to
//! matrices and handing the product to `ndarray`'s GEMM. Only two-operand
//! expressions are supported. Every label of an operand must either be summed
//! against the other operand or appear in the output; a label may not appear
//! in both operands and in the output at the same time (no batch axes), and no
//! label may repeat inside one operand (diagonal extraction is done by hand).

use itertools::Itertools;
use ndarray::{Array2, Array4, ArrayD, ArrayView, ArrayViewD, Dimension, Ix2, Ix4, IxDyn};

struct Subscripts {
    a: Vec<char>,
    b: Vec<char>,
    out: Vec<char>,
}

impl Subscripts {
    fn parse(expr: &str) -> Self {
        let (inputs, out) = expr
            .split_once("->")
            .unwrap_or_else(|| panic!("einsum `{}` needs an explicit output after `->`", expr));
        let (a, b) = inputs
            .split_once(',')
            .unwrap_or_else(|| panic!("einsum `{}` needs exactly two operands", expr));

        let subscripts = Subscripts {
            a: a.trim().chars().collect(),
            b: b.trim().chars().collect(),
            out: out.trim().chars().collect(),
        };
        assert!(
            subscripts.a.iter().all_unique()
                && subscripts.b.iter().all_unique()
                && subscripts.out.iter().all_unique(),
            "einsum `{}`: repeated label inside one term",
            expr
        );
        subscripts
    }
}

fn position(labels: &[char], label: char, expr: &str) -> usize {
    labels
        .iter()
        .position(|&l| l == label)
        .unwrap_or_else(|| panic!("einsum `{}`: label `{}` has no source axis", expr, label))
}

fn as_matrix(x: ArrayViewD<'_, f64>, perm: &[usize], rows: usize, cols: usize) -> Array2<f64> {
    x.permuted_axes(IxDyn(perm))
        .as_standard_layout()
        .into_owned()
        .into_shape((rows, cols))
        .unwrap_or_else(|e| panic!("standard-layout array does not reshape to a matrix: {}", e))
}

/// Contract two tensors according to `expr`, e.g. `"ijef,aebf->ijab"`.
///
/// # Panics
///
/// Panics when the subscripts do not match the operand ranks, when a summed
/// label has different extents in the two operands, or when the expression
/// uses a feature listed in the module documentation as unsupported.
pub fn einsum<D1: Dimension, D2: Dimension>(
    expr: &str,
    a: ArrayView<'_, f64, D1>,
    b: ArrayView<'_, f64, D2>,
) -> ArrayD<f64> {
    let sub = Subscripts::parse(expr);
    assert_eq!(sub.a.len(), a.ndim(), "einsum `{}`: rank of first operand", expr);
    assert_eq!(sub.b.len(), b.ndim(), "einsum `{}`: rank of second operand", expr);
    let shape_a = a.shape().to_vec();
    let shape_b = b.shape().to_vec();

    let mut summed = Vec::new();
    let mut free_a = Vec::new();
    for (axis, &label) in sub.a.iter().enumerate() {
        match (sub.b.contains(&label), sub.out.contains(&label)) {
            (true, false) => summed.push(label),
            (false, true) => free_a.push(axis),
            _ => panic!("einsum `{}`: unsupported use of label `{}`", expr, label),
        }
    }
    let mut free_b = Vec::new();
    for (axis, &label) in sub.b.iter().enumerate() {
        if summed.contains(&label) {
            continue;
        }
        assert!(
            sub.out.contains(&label),
            "einsum `{}`: label `{}` is neither summed nor kept",
            expr,
            label
        );
        free_b.push(axis);
    }

    let summed_a: Vec<usize> = summed.iter().map(|&l| position(&sub.a, l, expr)).collect();
    let summed_b: Vec<usize> = summed.iter().map(|&l| position(&sub.b, l, expr)).collect();
    for (&pa, &pb) in summed_a.iter().zip(&summed_b) {
        assert_eq!(
            shape_a[pa], shape_b[pb],
            "einsum `{}`: extent mismatch on label `{}`",
            expr, sub.a[pa]
        );
    }

    let m: usize = free_a.iter().map(|&ax| shape_a[ax]).product();
    let k: usize = summed_a.iter().map(|&ax| shape_a[ax]).product();
    let n: usize = free_b.iter().map(|&ax| shape_b[ax]).product();

    let a_perm: Vec<usize> = free_a.iter().chain(&summed_a).copied().collect();
    let b_perm: Vec<usize> = summed_b.iter().chain(&free_b).copied().collect();
    let product = as_matrix(a.into_dyn(), &a_perm, m, k).dot(&as_matrix(b.into_dyn(), &b_perm, k, n));

    // free axes sit in `product` as (free_a..., free_b...)
    let extents: Vec<usize> = free_a
        .iter()
        .map(|&ax| shape_a[ax])
        .chain(free_b.iter().map(|&ax| shape_b[ax]))
        .collect();
    let labels: Vec<char> = free_a
        .iter()
        .map(|&ax| sub.a[ax])
        .chain(free_b.iter().map(|&ax| sub.b[ax]))
        .collect();
    let out_perm: Vec<usize> = sub.out.iter().map(|&l| position(&labels, l, expr)).collect();

    product
        .as_standard_layout()
        .into_owned()
        .into_shape(IxDyn(&extents))
        .unwrap_or_else(|e| panic!("einsum `{}`: cannot shape the product: {}", expr, e))
        .permuted_axes(IxDyn(&out_perm))
        .as_standard_layout()
        .into_owned()
}

/// Full contraction to a scalar, e.g. `"iabj,ijab->"`.
pub fn einsum0<D1: Dimension, D2: Dimension>(
    expr: &str,
    a: ArrayView<'_, f64, D1>,
    b: ArrayView<'_, f64, D2>,
) -> f64 {
    let result = einsum(expr, a, b);
    assert_eq!(result.ndim(), 0, "einsum `{}` does not reduce to a scalar", expr);
    result.sum()
}

/// Contraction with a two-index result.
pub fn einsum2<D1: Dimension, D2: Dimension>(
    expr: &str,
    a: ArrayView<'_, f64, D1>,
    b: ArrayView<'_, f64, D2>,
) -> Array2<f64> {
    einsum(expr, a, b)
        .into_dimensionality::<Ix2>()
        .unwrap_or_else(|_| panic!("einsum `{}` does not produce a matrix", expr))
}

/// Contraction with a four-index result.
pub fn einsum4<D1: Dimension, D2: Dimension>(
    expr: &str,
    a: ArrayView<'_, f64, D1>,
    b: ArrayView<'_, f64, D2>,
) -> Array4<f64> {
    einsum(expr, a, b)
        .into_dimensionality::<Ix4>()
        .unwrap_or_else(|_| panic!("einsum `{}` does not produce a 4-index tensor", expr))
}
