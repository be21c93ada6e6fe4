// Incremental principal component analysis (IPCA) for streaming sensor data

#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod ipca;
pub mod linalg_backends;

pub use config::{CovarianceNormalization, EigenSolver, IncrementalPcaConfig};
pub use error::{IpcaError, Result};
pub use ipca::{rows_to_matrix, EstimatorState, IncrementalPCA, StreamingStatistics};
pub use linalg_backends::{BackendEig, EigOutput, EigenBasis, NdarrayLinAlgBackend};
