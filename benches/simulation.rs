use criterion::{black_box, criterion_group, criterion_main, Criterion};
use empagliflozin::experiments::base;
use empagliflozin::prelude::*;

/// Benchmark a 24 hr simulation of a single 25 mg oral dose
fn benchmark_single_dose(c: &mut Criterion) {
    let simulator = Simulator::default();
    let sim = TimecourseSim::single(base::timecourse(
        24.0,
        base::STEPS,
        base::initial_changes(None, Some(base::FPG_HEALTHY), 25.0),
    ));
    c.bench_function("single_dose_24h", |b| {
        b.iter(|| simulator.run_timecourse(black_box(&sim)));
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(10))
        .noise_threshold(0.10); // Performance changes less than 10% will be ignored
    targets = benchmark_single_dose
}
criterion_main!(benches);
