//! Criterion benchmarks for meridian-barycenter: DBA (both updates) and soft-DTW.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use meridian_barycenter::{DbaConfig, DbaMethod, SoftDtwConfig};
use meridian_dtw::{AlignmentConstraint, Dataset};

fn make_sine_dataset(n: usize, len: usize) -> Dataset {
    let rows = (0..n)
        .map(|k| {
            let phase = k as f64 * 0.15;
            (0..len).map(|i| (i as f64 * 0.1 + phase).sin()).collect()
        })
        .collect();
    Dataset::univariate(rows).unwrap()
}

fn bench_dba(c: &mut Criterion) {
    let data = make_sine_dataset(20, 128);
    let mut group = c.benchmark_group("dba_20x128_iter10");

    for (method, label) in [
        (DbaMethod::MajorizeMinimize, "mm"),
        (DbaMethod::Petitjean, "petitjean"),
    ] {
        for (constraint, c_label) in [
            (AlignmentConstraint::Unconstrained, "unconstrained"),
            (AlignmentConstraint::SakoeChiba { radius: 5 }, "band_r5"),
        ] {
            let config = DbaConfig::new(constraint)
                .with_method(method)
                .with_max_iter(10);
            group.bench_with_input(BenchmarkId::new(label, c_label), &config, |b, config| {
                b.iter(|| config.average(&data, None, None).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_soft_dtw(c: &mut Criterion) {
    let data = make_sine_dataset(10, 64);
    let config = SoftDtwConfig::new(1.0).with_max_iter(20);

    c.bench_function("softdtw_barycenter_10x64_iter20", |b| {
        b.iter(|| config.average(&data, None, None).unwrap());
    });
}

criterion_group!(benches, bench_dba, bench_soft_dtw);
criterion_main!(benches);
