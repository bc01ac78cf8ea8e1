//! Block Davidson iteration for the lowest eigenpairs of a symmetric operator

extern crate nalgebra as na;

use color_eyre::eyre::{eyre, Result};
use na::DMatrix;
use ndarray::Array1;
use tracing::{info, warn};

/// Davidson solver controls
#[derive(Debug, Clone, Copy)]
pub struct DavidsonParams {
    /// Energy convergence threshold; the residual threshold is its square root
    pub conv_tol: f64,
    pub max_cycle: usize,
    /// Subspace size that triggers a restart from the current Ritz vectors
    pub max_space: usize,
    /// Trial vectors with squared norm below this after orthogonalization are dropped
    pub lindep: f64,
    pub nroots: usize,
}

impl Default for DavidsonParams {
    fn default() -> Self {
        DavidsonParams {
            conv_tol: 1e-9,
            max_cycle: 50,
            max_space: 12,
            lindep: 1e-14,
            nroots: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DavidsonResult {
    pub converged: Vec<bool>,
    pub energies: Vec<f64>,
    pub vectors: Vec<Array1<f64>>,
    pub iterations: usize,
}

/// Removes the components of `v` along an orthonormal `basis`, twice for
/// numerical stability. Returns `None` when nothing above `lindep` survives.
fn orthonormalize(mut v: Array1<f64>, basis: &[Array1<f64>], lindep: f64) -> Option<Array1<f64>> {
    for _ in 0..2 {
        for b in basis {
            let overlap = b.dot(&v);
            v.scaled_add(-overlap, b);
        }
    }
    let norm2 = v.dot(&v);
    if norm2 > lindep && norm2.is_finite() {
        Some(v / norm2.sqrt())
    } else {
        None
    }
}

/// `sum_i coeffs[i] * vectors[i]`
fn combine(vectors: &[Array1<f64>], coeffs: impl Iterator<Item = f64>) -> Array1<f64> {
    let mut out = Array1::zeros(vectors[0].len());
    for (v, c) in vectors.iter().zip(coeffs) {
        out.scaled_add(c, v);
    }
    out
}

struct Ritz {
    energies: Vec<f64>,
    vectors: Vec<Array1<f64>>,
    sigmas: Vec<Array1<f64>>,
}

fn ritz_pairs(basis: &[Array1<f64>], sigmas: &[Array1<f64>], nroots: usize) -> Result<Ritz> {
    let n = basis.len();
    let h = DMatrix::from_fn(n, n, |i, j| 0.5 * (basis[i].dot(&sigmas[j]) + basis[j].dot(&sigmas[i])));
    let eigen = h.symmetric_eigen();
    if eigen.eigenvalues.iter().any(|e| !e.is_finite()) {
        return Err(eyre!("Davidson subspace matrix has non-finite eigenvalues"));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
    order.truncate(nroots.min(n));

    let mut ritz = Ritz {
        energies: Vec::with_capacity(order.len()),
        vectors: Vec::with_capacity(order.len()),
        sigmas: Vec::with_capacity(order.len()),
    };
    for k in order {
        let column = eigen.eigenvectors.column(k);
        ritz.energies.push(eigen.eigenvalues[k]);
        ritz.vectors.push(combine(basis, column.iter().copied()));
        ritz.sigmas.push(combine(sigmas, column.iter().copied()));
    }
    Ok(ritz)
}

/// Lowest `params.nroots` eigenpairs of the operator `apply`.
///
/// `apply` maps a batch of vectors to their images and is called once per
/// iteration with all new trial vectors. `precond(r, e)` turns the residual of
/// a root with Ritz value `e` into a correction vector.
pub fn davidson<A, P>(
    apply: A,
    x0: Vec<Array1<f64>>,
    precond: P,
    params: &DavidsonParams,
) -> Result<DavidsonResult>
where
    A: Fn(&[Array1<f64>]) -> Result<Vec<Array1<f64>>>,
    P: Fn(&Array1<f64>, f64) -> Array1<f64>,
{
    let toloose = params.conv_tol.sqrt();
    let max_space = params.max_space.max(2 * params.nroots.max(1));

    let mut basis: Vec<Array1<f64>> = Vec::new();
    for x in x0 {
        if let Some(v) = orthonormalize(x, &basis, params.lindep) {
            basis.push(v);
        }
    }
    if basis.is_empty() {
        return Err(eyre!("Davidson needs at least one linearly independent initial vector"));
    }

    let mut sigmas: Vec<Array1<f64>> = Vec::new();
    let mut fresh = basis.clone();
    let mut previous: Option<Vec<f64>> = None;
    let mut converged = Vec::new();
    let mut ritz = None;

    for cycle in 0..params.max_cycle {
        let images = apply(&fresh)?;
        if images.len() != fresh.len() {
            return Err(eyre!(
                "operator returned {} vectors for {} inputs",
                images.len(),
                fresh.len()
            ));
        }
        sigmas.extend(images);

        let current = ritz_pairs(&basis, &sigmas, params.nroots)?;
        let residuals: Vec<Array1<f64>> = current
            .sigmas
            .iter()
            .zip(&current.vectors)
            .zip(&current.energies)
            .map(|((ax, x), &e)| ax - &(x * e))
            .collect();
        let rnorms: Vec<f64> = residuals.iter().map(|r| r.dot(r).sqrt()).collect();
        let de: Vec<f64> = match &previous {
            Some(prev) if prev.len() == current.energies.len() => {
                current.energies.iter().zip(prev).map(|(e, p)| e - p).collect()
            }
            _ => current.energies.clone(),
        };
        converged = de
            .iter()
            .zip(&rnorms)
            .map(|(d, r)| d.abs() < params.conv_tol && *r < toloose)
            .collect();

        let max_de = de.iter().fold(0.0_f64, |m, d| m.max(d.abs()));
        let max_r = rnorms.iter().fold(0.0_f64, |m, &r| m.max(r));
        info!(
            "davidson {:3} space {:3}  e = {:?}  max|de| = {:.3e}  max|r| = {:.3e}",
            cycle,
            basis.len(),
            current.energies,
            max_de,
            max_r
        );

        if converged.iter().all(|&c| c) {
            return Ok(DavidsonResult {
                converged,
                energies: current.energies,
                vectors: current.vectors,
                iterations: cycle + 1,
            });
        }

        let mut new_vectors: Vec<Array1<f64>> = Vec::new();
        for ((r, &e), &done) in residuals.iter().zip(&current.energies).zip(&converged) {
            if done {
                continue;
            }
            let mut against = basis.clone();
            against.extend(new_vectors.iter().cloned());
            if let Some(v) = orthonormalize(precond(r, e), &against, params.lindep) {
                new_vectors.push(v);
            }
        }

        if new_vectors.is_empty() {
            // subspace exhausted
            converged = rnorms.iter().map(|&r| r < toloose).collect();
            warn!("Davidson stopped at cycle {}: no new linearly independent directions", cycle);
            return Ok(DavidsonResult {
                converged,
                energies: current.energies,
                vectors: current.vectors,
                iterations: cycle + 1,
            });
        }

        if basis.len() + new_vectors.len() > max_space {
            info!("davidson restart with {} Ritz vectors", current.vectors.len());
            basis = current.vectors.clone();
            sigmas = current.sigmas.clone();
        }
        basis.extend(new_vectors.iter().cloned());
        fresh = new_vectors;
        previous = Some(current.energies.clone());
        ritz = Some(current);
    }

    warn!("Davidson did not converge in {} cycles", params.max_cycle);
    let last = match ritz {
        Some(r) => r,
        None => return Err(eyre!("Davidson ran zero cycles")),
    };
    Ok(DavidsonResult {
        converged,
        energies: last.energies,
        vectors: last.vectors,
        iterations: params.max_cycle,
    })
}
