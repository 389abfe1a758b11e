use criterion::{black_box, criterion_group, criterion_main, Criterion};
use motion_core::{KalmanFilter, MeasVec, StateCov, StateVec};

fn make_states(n: usize) -> Vec<(StateVec, StateCov)> {
    let kf = KalmanFilter::xywh();
    (0..n)
        .map(|i| {
            let x = (i % 100) as f64 * 20.0;
            let y = (i / 100) as f64 * 20.0;
            kf.initiate(&MeasVec::new(x, y, 40.0, 80.0))
        })
        .collect()
}

fn bench_predict(c: &mut Criterion) {
    let kf = KalmanFilter::xywh();
    let (mean, cov) = kf.initiate(&MeasVec::new(100.0, 100.0, 40.0, 80.0));

    c.bench_function("predict_single", |b| {
        b.iter(|| black_box(kf.predict(black_box(&mean), black_box(&cov))));
    });

    let mut group = c.benchmark_group("multi_predict");
    for n in [64, 512, 2048] {
        let states = make_states(n);
        group.bench_function(format!("{n}_tracks"), |b| {
            b.iter(|| black_box(kf.multi_predict(black_box(&states))));
        });
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let kf = KalmanFilter::xywh();
    let (mean, cov) = kf.initiate(&MeasVec::new(100.0, 100.0, 40.0, 80.0));
    let (mean, cov) = kf.predict(&mean, &cov);
    let z = MeasVec::new(103.0, 99.0, 40.0, 80.0);

    c.bench_function("update_single", |b| {
        b.iter(|| kf.update(black_box(&mean), black_box(&cov), black_box(&z), 0.8));
    });
}

fn bench_gating(c: &mut Criterion) {
    let kf = KalmanFilter::xywh();
    let (mean, cov) = kf.initiate(&MeasVec::new(500.0, 500.0, 40.0, 80.0));
    let (mean, cov) = kf.predict(&mean, &cov);
    let measurements: Vec<MeasVec> = (0..256)
        .map(|i| MeasVec::new((i * 7 % 1000) as f64, (i * 13 % 1000) as f64, 40.0, 80.0))
        .collect();

    let mut group = c.benchmark_group("gating_distance");
    for metric in ["maha", "gaussian"] {
        group.bench_function(metric, |b| {
            b.iter(|| kf.gating_distance(&mean, &cov, black_box(&measurements), false, metric));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_predict, bench_update, bench_gating);
criterion_main!(benches);
