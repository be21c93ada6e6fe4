// Incremental principal component analysis (IPCA)

use log::{debug, info, trace};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::config::IncrementalPcaConfig;
use crate::error::{IpcaError, Result};
use crate::linalg_backends::{decompose_sorted, BackendEig, EigenBasis, NdarrayLinAlgBackend};

/// Running statistics of a seeded estimator.
///
/// After `n_samples_seen` samples, `mean` and `covariance` reflect exactly
/// those samples and `basis` is the eigendecomposition of `covariance`.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamingStatistics {
    mean: Array1<f64>,
    covariance: Array2<f64>,
    basis: EigenBasis,
    n_samples_seen: usize,
}

impl StreamingStatistics {
    /// Running mean, shape (n_features).
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Running covariance matrix A, shape (n_features, n_features).
    pub fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    /// Eigenvalues of A in non-increasing order.
    pub fn eigenvalues(&self) -> &Array1<f64> {
        &self.basis.eigenvalues
    }

    /// Eigenvectors of A as columns, co-sorted with `eigenvalues`.
    pub fn eigenvectors(&self) -> &Array2<f64> {
        &self.basis.eigenvectors
    }

    pub fn n_samples_seen(&self) -> usize {
        self.n_samples_seen
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn project(&self, centered: ArrayView1<f64>) -> Array1<f64> {
        centered.dot(&self.basis.eigenvectors)
    }
}

/// Lifecycle of an estimator: nothing is defined until the seed window has been processed.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EstimatorState {
    #[default]
    Unseeded,
    Seeded(StreamingStatistics),
}

/// Incremental PCA estimator.
///
/// The first `seed_window_size` samples (B) are summarized in closed form:
/// mean, covariance and a sorted eigendecomposition. Every later sample at
/// zero-based index `n` is folded in with
///
/// - `mean <- mean + (x - mean) / (n + 1)`
/// - `A <- ((n - 1) / n) * A + (xc xc^T) / n^2`, where `xc = x - mean` uses the updated mean
///
/// after which A is decomposed again from scratch. Each sample is projected
/// onto the eigen-basis that is current once it has been folded in.
///
/// # Examples
///
/// ```
/// use incremental_pca::IncrementalPCA;
/// use ndarray::array;
///
/// let mut ipca = IncrementalPCA::with_seed_window(2).unwrap();
/// let projected = ipca.fit_transform(array![[0.0], [10.0], [5.0]].view()).unwrap();
/// assert_eq!(projected.dim(), (3, 1));
/// assert!((projected[[0, 0]].abs() - 5.0).abs() < 1e-9);
/// assert!((ipca.eigenvalues().unwrap()[0] - 12.5).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct IncrementalPCA<B = NdarrayLinAlgBackend> {
    config: IncrementalPcaConfig,
    backend: B,
    state: EstimatorState,
}

impl IncrementalPCA<NdarrayLinAlgBackend> {
    /// Creates an unseeded estimator backed by `ndarray-linalg`.
    ///
    /// # Errors
    /// Returns `IpcaError::InvalidConfig` if the configuration does not validate.
    pub fn new(config: IncrementalPcaConfig) -> Result<Self> {
        Self::with_backend(config, NdarrayLinAlgBackend)
    }

    /// Shorthand for `new(IncrementalPcaConfig::new(seed_window_size))`.
    pub fn with_seed_window(seed_window_size: usize) -> Result<Self> {
        Self::new(IncrementalPcaConfig::new(seed_window_size))
    }
}

impl<B: BackendEig> IncrementalPCA<B> {
    /// Creates an unseeded estimator that decomposes through `backend`.
    pub fn with_backend(config: IncrementalPcaConfig, backend: B) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            backend,
            state: EstimatorState::Unseeded,
        })
    }

    pub fn config(&self) -> &IncrementalPcaConfig {
        &self.config
    }

    pub fn state(&self) -> &EstimatorState {
        &self.state
    }

    pub fn is_seeded(&self) -> bool {
        matches!(self.state, EstimatorState::Seeded(_))
    }

    /// Number of samples folded into the statistics so far (0 while unseeded).
    pub fn n_samples_seen(&self) -> usize {
        self.statistics().map_or(0, StreamingStatistics::n_samples_seen)
    }

    pub fn statistics(&self) -> Option<&StreamingStatistics> {
        match &self.state {
            EstimatorState::Seeded(stats) => Some(stats),
            EstimatorState::Unseeded => None,
        }
    }

    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.statistics().map(StreamingStatistics::mean)
    }

    pub fn covariance(&self) -> Option<&Array2<f64>> {
        self.statistics().map(StreamingStatistics::covariance)
    }

    pub fn eigenvalues(&self) -> Option<&Array1<f64>> {
        self.statistics().map(StreamingStatistics::eigenvalues)
    }

    pub fn eigenvectors(&self) -> Option<&Array2<f64>> {
        self.statistics().map(StreamingStatistics::eigenvectors)
    }

    /// Each eigenvalue as a fraction of the eigenvalue sum.
    /// All zeros when the sum is zero (e.g. constant data).
    pub fn explained_variance_ratio(&self) -> Option<Array1<f64>> {
        self.eigenvalues().map(|values| {
            let total = values.sum();
            if total == 0.0 {
                Array1::zeros(values.len())
            } else {
                values.mapv(|v| v / total)
            }
        })
    }

    /// Drops all statistics and returns to the unseeded state.
    pub fn reset(&mut self) {
        self.state = EstimatorState::Unseeded;
    }

    fn seeded_statistics(&self) -> Result<&StreamingStatistics> {
        self.statistics().ok_or(IpcaError::NotSeeded)
    }

    /// Seeds on the first B rows, then streams the remaining rows one at a time.
    ///
    /// * `samples` - Input data, shape (n_samples, n_features), rows in arrival order.
    ///
    /// Returns the projected samples, shape (n_samples, n_features), in input order.
    /// Any previous state is discarded first.
    ///
    /// # Errors
    /// Returns an error if the input is empty, if it has fewer rows than the seed
    /// window, or if any eigendecomposition fails. A failure in the streaming phase
    /// leaves the statistics as of the last sample that was folded in successfully.
    pub fn fit_transform(&mut self, samples: ArrayView2<f64>) -> Result<Array2<f64>> {
        let (n_samples, n_features) = samples.dim();
        let window = self.config.seed_window_size;

        let seed_scores = self.seed(samples)?;
        let mut output = Array2::<f64>::zeros((n_samples, n_features));
        output.slice_mut(s![..window, ..]).assign(&seed_scores);

        for (index, sample) in samples.outer_iter().enumerate().skip(window) {
            let scores = self.update(sample)?;
            output.row_mut(index).assign(&scores);
        }

        info!(
            "Incremental PCA processed {} samples ({} seed, {} streamed) with {} features.",
            n_samples,
            window,
            n_samples - window,
            n_features
        );
        Ok(output)
    }

    /// Same as [`fit_transform`](Self::fit_transform) for row slices that may be ragged.
    ///
    /// # Errors
    /// Returns `IpcaError::DimensionMismatch` for the first row whose length differs
    /// from the first row's, before any state is touched.
    pub fn fit_transform_rows<R: AsRef<[f64]>>(&mut self, rows: &[R]) -> Result<Array2<f64>> {
        let samples = rows_to_matrix(rows)?;
        self.fit_transform(samples.view())
    }

    /// Runs the seed phase on the first B rows of `samples` and returns their projections.
    ///
    /// Rows after the first B are ignored. Any previous state is discarded.
    ///
    /// # Errors
    /// Returns an error if `samples` is empty or shorter than the seed window, or if
    /// the eigendecomposition fails (the estimator is left unseeded).
    pub fn seed(&mut self, samples: ArrayView2<f64>) -> Result<Array2<f64>> {
        let (n_samples, n_features) = samples.dim();
        let window = self.config.seed_window_size;

        if n_samples == 0 {
            return Err(IpcaError::EmptyInput("input has zero samples.".to_string()));
        }
        if n_features == 0 {
            return Err(IpcaError::EmptyInput("input has zero features.".to_string()));
        }
        if n_samples < window {
            return Err(IpcaError::InsufficientSeedData {
                required: window,
                available: n_samples,
            });
        }

        self.state = EstimatorState::Unseeded;

        let seed_block = samples.slice(s![..window, ..]);
        let mean = seed_block
            .mean_axis(Axis(0))
            .ok_or_else(|| IpcaError::EmptyInput("seed window is empty.".to_string()))?;
        let centered = &seed_block - &mean;

        let divisor = self.config.covariance_normalization.divisor(window);
        let covariance = centered.t().dot(&centered) / divisor;

        let basis = decompose_sorted(
            &self.backend,
            &covariance,
            self.config.eigen_solver,
            self.config.complex_tolerance,
        )?;
        debug!(
            "Seeded on {} samples x {} features; leading eigenvalue {:?}.",
            window,
            n_features,
            basis.eigenvalues.get(0)
        );

        let scores = centered.dot(&basis.eigenvectors);
        self.state = EstimatorState::Seeded(StreamingStatistics {
            mean,
            covariance,
            basis,
            n_samples_seen: window,
        });
        Ok(scores)
    }

    /// Folds one sample into a seeded estimator and returns its projection onto
    /// the refreshed eigen-basis.
    ///
    /// # Errors
    /// Returns `IpcaError::NotSeeded` before seeding, `IpcaError::DimensionMismatch`
    /// if the sample length differs from the seeded dimension, or a decomposition
    /// error. The statistics are left unchanged on error.
    pub fn update(&mut self, sample: ArrayView1<f64>) -> Result<Array1<f64>> {
        let stats = self.seeded_statistics()?;
        if sample.len() != stats.n_features() {
            return Err(IpcaError::DimensionMismatch {
                expected: stats.n_features(),
                got: sample.len(),
            });
        }

        // Zero-based index of the incoming sample; never below 1 since B >= 1.
        let n = stats.n_samples_seen as f64;
        let mean = &stats.mean + &((&sample - &stats.mean) / (n + 1.0));
        let centered = &sample - &mean;

        let column = centered.view().insert_axis(Axis(1));
        let outer = column.dot(&column.t());
        let covariance = &stats.covariance * ((n - 1.0) / n) + &(outer / (n * n));

        let basis = decompose_sorted(
            &self.backend,
            &covariance,
            self.config.eigen_solver,
            self.config.complex_tolerance,
        )?;
        trace!(
            "Folded sample {} into statistics; eigenvalues {:?}.",
            stats.n_samples_seen,
            basis.eigenvalues
        );

        let next = StreamingStatistics {
            mean,
            covariance,
            basis,
            n_samples_seen: stats.n_samples_seen + 1,
        };
        let scores = next.project(centered.view());
        self.state = EstimatorState::Seeded(next);
        Ok(scores)
    }

    /// Projects `samples` onto the current mean and eigen-basis without updating anything.
    ///
    /// # Errors
    /// Returns `IpcaError::NotSeeded` before seeding, or `IpcaError::DimensionMismatch`
    /// if the feature count differs from the seeded dimension.
    pub fn transform(&self, samples: ArrayView2<f64>) -> Result<Array2<f64>> {
        let stats = self.seeded_statistics()?;
        if samples.ncols() != stats.n_features() {
            return Err(IpcaError::DimensionMismatch {
                expected: stats.n_features(),
                got: samples.ncols(),
            });
        }
        let centered = &samples - &stats.mean;
        Ok(centered.dot(&stats.basis.eigenvectors))
    }
}

/// Builds an (n_rows, n_features) matrix from row slices, rejecting ragged input.
pub fn rows_to_matrix<R: AsRef<[f64]>>(rows: &[R]) -> Result<Array2<f64>> {
    let first = rows
        .first()
        .ok_or_else(|| IpcaError::EmptyInput("input has zero samples.".to_string()))?;
    let n_features = first.as_ref().len();
    if let Some(got) = rows
        .iter()
        .map(|row| row.as_ref().len())
        .find(|&len| len != n_features)
    {
        return Err(IpcaError::DimensionMismatch {
            expected: n_features,
            got,
        });
    }
    Ok(Array2::from_shape_fn((rows.len(), n_features), |(i, j)| {
        rows[i].as_ref()[j]
    }))
}
