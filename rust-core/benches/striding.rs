use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array1;
use stft_windowing::striding::{available_number_of_windows, StridingFunctionLabel};
use stft_windowing::{WindowingScheme, WindowingSchemeConfig};

const LABELS: [StridingFunctionLabel; 3] = [
    StridingFunctionLabel::Crude,
    StridingFunctionLabel::Accelerated,
    StridingFunctionLabel::StridedView,
];

fn random_series(len: usize) -> Array1<f64> {
    use rand::prelude::*;
    let mut rng = StdRng::seed_from_u64(7);
    Array1::from_iter((0..len).map(|_| rng.gen_range(-1.0..=1.0)))
}

fn bench_striding_functions(c: &mut Criterion) {
    let data = random_series(100_000);
    let (window, advance) = (256, 64);
    let num_windows = available_number_of_windows(data.len(), window, advance).unwrap();

    let mut group = c.benchmark_group("Striding functions");
    for label in LABELS {
        let striding = label.striding_function();
        group.bench_function(BenchmarkId::new(label.as_str(), "100k samples"), |b| {
            b.iter(|| {
                black_box(
                    striding
                        .extract_windows(data.view(), window, advance, num_windows)
                        .unwrap(),
                );
            });
        });
    }
    group.finish();
}

fn bench_stft(c: &mut Criterion) {
    let data = random_series(100_000);

    let mut group = c.benchmark_group("STFT");
    for label in LABELS {
        let scheme = WindowingScheme::new(WindowingSchemeConfig {
            num_samples_window: 256,
            num_samples_overlap: 192,
            striding_function_label: label,
            ..WindowingSchemeConfig::default()
        })
        .unwrap();
        group.bench_function(BenchmarkId::new(label.as_str(), "100k samples"), |b| {
            b.iter(|| {
                black_box(scheme.stft(&data, None, true).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group! {
  name = benches;
  config = Criterion::default().measurement_time(Duration::from_secs(5));
  targets = bench_striding_functions, bench_stft
}
criterion_main!(benches);
