use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use incremental_pca::{EigenSolver, IncrementalPCA, IncrementalPcaConfig};
use ndarray::{Array, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

fn generate_data(n_samples: usize, n_features: usize) -> Array2<f64> {
    Array::random((n_samples, n_features), Uniform::new(0., 10.))
}

// Benchmark for IncrementalPCA::fit_transform with each eigen solver
fn bench_fit_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("IncrementalPCA_fit_transform");

    for &(n_samples, n_features, seed_window) in [(500, 3, 50), (1000, 8, 100), (500, 32, 64)].iter() {
        let data = generate_data(n_samples, n_features);
        group.throughput(Throughput::Elements((n_samples * n_features) as u64));

        for solver in [EigenSolver::General, EigenSolver::Symmetric] {
            let config = IncrementalPcaConfig::new(seed_window).with_eigen_solver(solver);
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", solver), format!("{}x{}", n_samples, n_features)),
                &data,
                |b, data_matrix| {
                    b.iter_with_setup(
                        || IncrementalPCA::new(config.clone()).unwrap(),
                        |mut ipca| ipca.fit_transform(data_matrix.view()).unwrap(),
                    );
                },
            );
        }
    }
    group.finish();
}

// Benchmark for a single streaming update on a seeded estimator
fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("IncrementalPCA_update");

    for &n_features in [3usize, 16, 64].iter() {
        let data = generate_data(4 * n_features + 1, n_features);
        let seed_rows = 4 * n_features;
        let mut seeded = IncrementalPCA::with_seed_window(seed_rows).unwrap();
        seeded.seed(data.view()).unwrap();
        let sample = data.row(seed_rows).to_owned();

        group.bench_with_input(BenchmarkId::new("update", n_features), &sample, |b, x| {
            b.iter_with_setup(|| seeded.clone(), |mut ipca| ipca.update(x.view()).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fit_transform, bench_update);
criterion_main!(benches);
