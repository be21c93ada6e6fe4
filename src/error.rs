//! Error types for incremental PCA.

use ndarray_linalg::error::LinalgError;
use thiserror::Error;

/// Errors raised while seeding, updating or projecting with an [`IncrementalPCA`](crate::IncrementalPCA).
#[derive(Error, Debug)]
pub enum IpcaError {
    /// The estimator configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A sample's length disagrees with the established feature dimension.
    #[error("Dimension mismatch: expected {expected} features, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Fewer rows were supplied than the seed window requires.
    #[error("Insufficient seed data: seed window needs {required} samples, only {available} supplied")]
    InsufficientSeedData { required: usize, available: usize },

    /// Empty input where non-empty was required.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A streaming operation was attempted before the seed window was processed.
    #[error("Estimator is not seeded. Call fit_transform or seed first.")]
    NotSeeded,

    /// The LAPACK eigen routine failed (e.g. non-convergence).
    #[error("Eigen decomposition of covariance matrix failed: {0}")]
    Decomposition(#[from] LinalgError),

    /// The covariance matrix produced an eigenvalue with a non-negligible imaginary part.
    #[error("Eigenvalue {index} is complex ({re} + {im}i); covariance matrix is not diagonalizable over the reals")]
    ComplexEigenvalue { index: usize, re: f64, im: f64 },

    /// The covariance matrix produced a NaN or infinite eigenvalue.
    #[error("Eigenvalue {index} is not finite")]
    NonFiniteEigenvalue { index: usize },
}

/// Result type alias for incremental PCA operations.
pub type Result<T> = std::result::Result<T, IpcaError>;
