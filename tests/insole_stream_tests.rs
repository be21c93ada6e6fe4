// Streaming scenarios shaped like multi-channel insole pressure readings.

use incremental_pca::{EigenSolver, IncrementalPCA, IncrementalPcaConfig, IpcaError};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const LOADING: [f64; 3] = [1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0];

/// Three pressure channels driven by one shared load signal plus small sensor noise.
fn generate_pressure_stream(n_samples: usize, noise: f64, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Array2::<f64>::zeros((n_samples, LOADING.len()));
    for mut row in data.outer_iter_mut() {
        let load: f64 = rng.gen_range(-10.0..10.0);
        for (value, weight) in row.iter_mut().zip(LOADING.iter()) {
            *value = 50.0 + load * weight + rng.gen_range(-noise..noise);
        }
    }
    data
}

fn leading_axis_alignment(ipca: &IncrementalPCA) -> f64 {
    let leading = ipca.eigenvectors().unwrap().column(0).to_owned();
    leading.dot(&Array1::from(LOADING.to_vec())).abs()
}

#[test]
fn test_leading_component_tracks_shared_load() {
    let data = generate_pressure_stream(200, 0.1, 2024);
    let mut ipca = IncrementalPCA::with_seed_window(20).unwrap();
    let projected = ipca.fit_transform(data.view()).unwrap();

    assert_eq!(projected.dim(), (200, 3));
    assert_eq!(ipca.n_samples_seen(), 200);

    let alignment = leading_axis_alignment(&ipca);
    assert!(alignment > 0.999, "Leading eigenvector misaligned with load direction: {}", alignment);

    let ratio = ipca.explained_variance_ratio().unwrap();
    assert!(ratio[0] > 0.99, "Leading component explains too little variance: {:?}", ratio);

    let final_mean = ipca.mean().unwrap();
    let true_mean = data.mean_axis(Axis(0)).unwrap();
    for (m, t) in final_mean.iter().zip(true_mean.iter()) {
        assert!((m - t).abs() < 1e-9, "Running mean drifted: {} vs {}", m, t);
    }
}

#[test]
fn test_live_feed_matches_batch_run() {
    let data = generate_pressure_stream(60, 0.5, 7);
    let config = IncrementalPcaConfig::new(10).with_eigen_solver(EigenSolver::General);

    let mut batch = IncrementalPCA::new(config.clone()).unwrap();
    let batch_scores = batch.fit_transform(data.view()).unwrap();

    let mut live = IncrementalPCA::new(config).unwrap();
    let rows: Vec<Vec<f64>> = data.outer_iter().map(|row| row.to_vec()).collect();
    let seed_scores = live.seed(data.view()).unwrap();
    for (i, seed_row) in seed_scores.outer_iter().enumerate() {
        for (a, b) in seed_row.iter().zip(batch_scores.row(i).iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }
    for (i, reading) in rows.iter().enumerate().skip(10) {
        let scores = live.update(Array1::from(reading.clone()).view()).unwrap();
        for (a, b) in scores.iter().zip(batch_scores.row(i).iter()) {
            assert!((a - b).abs() < 1e-12, "Row {} differs: {} vs {}", i, a, b);
        }
    }
    assert_eq!(live.state(), batch.state());
}

#[test]
fn test_short_recording_is_rejected() {
    let data = generate_pressure_stream(5, 0.1, 1);
    let mut ipca = IncrementalPCA::with_seed_window(50).unwrap();
    let err = ipca.fit_transform(data.view()).unwrap_err();
    assert!(matches!(err, IpcaError::InsufficientSeedData { required: 50, available: 5 }));
}
