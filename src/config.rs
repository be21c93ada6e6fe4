// src/config.rs

use serde::{Deserialize, Serialize};

use crate::error::{IpcaError, Result};

/// Divisor applied to the scatter matrix of the seed window.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CovarianceNormalization {
    /// Divide by the seed window size B (biased estimate, `ddof = 0`).
    #[default]
    Population,
    /// Divide by B - 1 (unbiased estimate, `ddof = 1`, as `numpy.cov` does). Requires B >= 2.
    Sample,
}

impl CovarianceNormalization {
    /// Denominator used for a seed window of `window` samples.
    /// `IncrementalPcaConfig::validate` rules out the zero divisors.
    pub(crate) fn divisor(self, window: usize) -> f64 {
        match self {
            CovarianceNormalization::Population => window as f64,
            CovarianceNormalization::Sample => window.saturating_sub(1) as f64,
        }
    }
}

/// Eigen routine used on the running covariance matrix.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EigenSolver {
    /// General real eigen solver (LAPACK `geev`). Sees the matrix exactly as accumulated,
    /// including any round-off asymmetry.
    #[default]
    General,
    /// Symmetric eigen solver (LAPACK `syevd`) reading only the upper triangle.
    Symmetric,
}

fn default_complex_tolerance() -> f64 {
    1e-9
}

/// Configuration for an [`IncrementalPCA`](crate::IncrementalPCA) estimator.
///
/// Only `seed_window_size` is required when deserializing; the remaining
/// fields fall back to their defaults.
///
/// ```
/// use incremental_pca::{CovarianceNormalization, IncrementalPcaConfig};
///
/// let config = IncrementalPcaConfig::new(50)
///     .with_covariance_normalization(CovarianceNormalization::Sample);
/// assert_eq!(config.seed_window_size, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncrementalPcaConfig {
    /// Number of leading samples (B) used to seed the statistics in closed form.
    pub seed_window_size: usize,
    #[serde(default)]
    pub covariance_normalization: CovarianceNormalization,
    #[serde(default)]
    pub eigen_solver: EigenSolver,
    /// Largest accepted imaginary part of an eigenvalue, relative to `max(1, max |lambda|)`.
    #[serde(default = "default_complex_tolerance")]
    pub complex_tolerance: f64,
}

impl IncrementalPcaConfig {
    pub fn new(seed_window_size: usize) -> Self {
        Self {
            seed_window_size,
            covariance_normalization: CovarianceNormalization::default(),
            eigen_solver: EigenSolver::default(),
            complex_tolerance: default_complex_tolerance(),
        }
    }

    pub fn with_covariance_normalization(mut self, normalization: CovarianceNormalization) -> Self {
        self.covariance_normalization = normalization;
        self
    }

    pub fn with_eigen_solver(mut self, solver: EigenSolver) -> Self {
        self.eigen_solver = solver;
        self
    }

    pub fn with_complex_tolerance(mut self, tolerance: f64) -> Self {
        self.complex_tolerance = tolerance;
        self
    }

    /// Checks the configuration before an estimator is built from it.
    ///
    /// # Errors
    /// Returns `IpcaError::InvalidConfig` if the seed window is empty, if the
    /// sample normalization is combined with a single-sample window, or if the
    /// complex tolerance is negative or non-finite.
    pub fn validate(&self) -> Result<()> {
        if self.seed_window_size == 0 {
            return Err(IpcaError::InvalidConfig(
                "seed_window_size must be at least 1.".to_string(),
            ));
        }
        if self.covariance_normalization == CovarianceNormalization::Sample
            && self.seed_window_size < 2
        {
            return Err(IpcaError::InvalidConfig(format!(
                "Sample covariance normalization divides by B - 1 and needs seed_window_size >= 2 (got {}).",
                self.seed_window_size
            )));
        }
        if !self.complex_tolerance.is_finite() || self.complex_tolerance < 0.0 {
            return Err(IpcaError::InvalidConfig(format!(
                "complex_tolerance must be finite and non-negative (got {}).",
                self.complex_tolerance
            )));
        }
        Ok(())
    }
}
