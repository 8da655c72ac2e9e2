use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::Rng;
use rref::{Matrix, PivotPolicy, ReduceConfig, ReductionLog};

static POLICIES: [PivotPolicy; 2] = [PivotPolicy::FirstNonzero, PivotPolicy::LargestMagnitude];

fn random_matrix(dimension: usize) -> Matrix {
    Matrix::from_vec(
        &(0..dimension)
            .map(|_| random_vector(dimension))
            .collect::<Vec<_>>(),
    )
}

fn row_reductions(c: &mut Criterion) {
    for pivot in POLICIES {
        let config = ReduceConfig {
            pivot,
            ..Default::default()
        };
        let mut group = c.benchmark_group(format!("row_reduce_{pivot}"));
        for dimension in [10, 20, 69, 100, 420] {
            group.bench_function(format!("row_reduce_{dimension}"), move |b| {
                b.iter_batched_ref(
                    || random_matrix(dimension),
                    |matrix| matrix.row_reduce(&config, &mut ()).unwrap(),
                    BatchSize::SmallInput,
                )
            });
            group.bench_function(format!("row_reduce_logged_{dimension}"), move |b| {
                b.iter_batched_ref(
                    || {
                        let matrix = random_matrix(dimension);
                        let log = ReductionLog::for_matrix(&matrix);
                        (matrix, log)
                    },
                    |(matrix, log)| matrix.row_reduce(&config, log).unwrap(),
                    BatchSize::SmallInput,
                )
            });
        }
        group.finish();
    }
}

fn random_vector(dimension: usize) -> Vec<f64> {
    let mut result = Vec::with_capacity(dimension);
    let mut rng = rand::thread_rng();
    result.resize_with(dimension, || rng.gen_range(-1.0..1.0));
    result
}

criterion_group! {
    name = row_reduction;
    config = Criterion::default().sample_size(50);
    targets = row_reductions
}

criterion_main!(row_reduction);
