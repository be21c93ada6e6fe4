// src/linalg_backends.rs

use log::trace;
use ndarray::{Array1, Array2, Axis};
use ndarray_linalg::{Eig as NdLinalgEig, Eigh as NdLinalgEigh, UPLO};

use crate::config::EigenSolver;
use crate::error::{IpcaError, Result};

/// Raw output of an eigendecomposition, in whatever order the routine produced it.
#[derive(Debug, Clone)]
pub struct EigOutput {
    /// Real parts of the eigenvalues.
    pub eigenvalues_re: Array1<f64>,
    /// Imaginary parts of the eigenvalues. All zero for symmetric solvers.
    pub eigenvalues_im: Array1<f64>,
    /// Real parts of the eigenvectors, as columns.
    /// eigenvectors.column(i) corresponds to eigenvalues_re[i].
    pub eigenvectors: Array2<f64>,
}

/// Real eigen-basis sorted by descending eigenvalue.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenBasis {
    pub eigenvalues: Array1<f64>,
    /// eigenvectors.column(i) corresponds to eigenvalues[i].
    pub eigenvectors: Array2<f64>,
}

/// Eigendecomposition of a square real matrix.
pub trait BackendEig {
    /// General (non-symmetric) eigendecomposition, similar to LAPACK's DGEEV.
    /// Only the real parts of the eigenvectors are kept, so a conjugate pair that passes
    /// the complex tolerance collapses to two identical columns.
    fn eig_general(&self, matrix: &Array2<f64>) -> Result<EigOutput>;

    /// Symmetric eigendecomposition reading the upper triangle, similar to LAPACK's DSYEVD.
    fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EigOutput>;
}

/// `ndarray-linalg` backed implementation. The BLAS/LAPACK provider is chosen
/// through the crate's `backend_*` features.
#[derive(Debug, Default, Copy, Clone)]
pub struct NdarrayLinAlgBackend;

impl BackendEig for NdarrayLinAlgBackend {
    fn eig_general(&self, matrix: &Array2<f64>) -> Result<EigOutput> {
        let (values, vectors) = matrix.eig()?;
        Ok(EigOutput {
            eigenvalues_re: values.mapv(|v| v.re),
            eigenvalues_im: values.mapv(|v| v.im),
            eigenvectors: vectors.mapv(|v| v.re),
        })
    }

    fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EigOutput> {
        let (eigenvalues, eigenvectors) = matrix.eigh(UPLO::Upper)?;
        let eigenvalues_im = Array1::zeros(eigenvalues.len());
        Ok(EigOutput {
            eigenvalues_re: eigenvalues,
            eigenvalues_im,
            eigenvectors,
        })
    }
}

/// Decomposes `matrix` with the chosen solver and returns the basis sorted by
/// descending eigenvalue.
///
/// # Errors
/// Propagates backend failures, and rejects NaN/infinite eigenvalues or
/// eigenvalues whose imaginary part exceeds
/// `complex_tolerance * max(1, max_i |lambda_i|)`.
pub fn decompose_sorted<B: BackendEig>(
    backend: &B,
    matrix: &Array2<f64>,
    solver: EigenSolver,
    complex_tolerance: f64,
) -> Result<EigenBasis> {
    let raw = match solver {
        EigenSolver::General => backend.eig_general(matrix)?,
        EigenSolver::Symmetric => backend.eigh_upper(matrix)?,
    };
    into_sorted_real_basis(raw, complex_tolerance)
}

/// Checks that every eigenvalue is real (within tolerance) and finite, then
/// co-sorts eigenvalues and eigenvector columns in descending order.
///
/// The sort is stable, so equal eigenvalues keep the routine's original order.
pub fn into_sorted_real_basis(raw: EigOutput, complex_tolerance: f64) -> Result<EigenBasis> {
    let EigOutput {
        eigenvalues_re,
        eigenvalues_im,
        eigenvectors,
    } = raw;

    for (index, (&re, &im)) in eigenvalues_re.iter().zip(eigenvalues_im.iter()).enumerate() {
        if !re.is_finite() || !im.is_finite() {
            return Err(IpcaError::NonFiniteEigenvalue { index });
        }
    }

    let spectral_scale = eigenvalues_re
        .iter()
        .zip(eigenvalues_im.iter())
        .map(|(re, im)| re.hypot(*im))
        .fold(1.0_f64, f64::max);
    let im_threshold = complex_tolerance * spectral_scale;
    if let Some((index, (&re, &im))) = eigenvalues_re
        .iter()
        .zip(eigenvalues_im.iter())
        .enumerate()
        .find(|(_, (_, im))| im.abs() > im_threshold)
    {
        return Err(IpcaError::ComplexEigenvalue { index, re, im });
    }

    let mut order: Vec<usize> = (0..eigenvalues_re.len()).collect();
    // All values are finite here, so partial_cmp never fails.
    order.sort_by(|&a, &b| {
        eigenvalues_re[b]
            .partial_cmp(&eigenvalues_re[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    trace!("Eigenvalue order after descending sort: {:?}", order);

    Ok(EigenBasis {
        eigenvalues: eigenvalues_re.select(Axis(0), &order),
        eigenvectors: eigenvectors.select(Axis(1), &order),
    })
}
