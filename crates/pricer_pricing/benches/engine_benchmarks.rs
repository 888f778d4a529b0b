//! Criterion benchmarks for the regression Monte Carlo engine.
//!
//! Benchmarks cover:
//! - Nested continuation estimation (varying inner sample count)
//! - Hindsight evaluation (varying path count)
//! - Nyström fit on a training batch

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricer_models::instruments::{BasketPayoff, PayoffKind};
use pricer_models::models::{MarketModel, MarketParams};
use pricer_models::regression::{ComputeDevice, Hyperparameters, NystromKrr, NystromModel, Regressor};
use pricer_pricing::mc::{ContinuationEstimator, HindsightEvaluator, ValueFunction};
use pricer_pricing::rng::PricerRng;

fn market() -> MarketModel {
    MarketModel::new(MarketParams::uniform(2, 100.0, 0.2, 0.05, 0.2, 9, 1.0))
        .expect("valid market")
}

fn payoff() -> BasketPayoff {
    BasketPayoff::new(PayoffKind::MaxCall, 100.0).expect("valid payoff")
}

/// Benchmark nested continuation estimation.
fn bench_continuation(c: &mut Criterion) {
    let mut group = c.benchmark_group("continuation");
    group.sample_size(20);

    let market = market();
    let states = market.sample_states(4, 500, &mut PricerRng::from_seed(1));
    let terminal: ValueFunction<NystromModel> = ValueFunction::Terminal(payoff());

    for inner in [50, 150] {
        group.bench_with_input(BenchmarkId::new("terminal_payoff", inner), &inner, |b, &m| {
            let estimator = ContinuationEstimator::new(&market, m);
            let rng = PricerRng::from_seed(42);
            b.iter(|| black_box(estimator.estimate(&states, &terminal, &rng)));
        });
    }

    group.finish();
}

/// Benchmark the hindsight evaluator.
fn bench_hindsight(c: &mut Criterion) {
    let mut group = c.benchmark_group("hindsight");

    let market = market();
    let payoff = payoff();

    for n_paths in [1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("max_call", n_paths), &n_paths, |b, &n| {
            let evaluator = HindsightEvaluator::new(&market, &payoff, n);
            let rng = PricerRng::from_seed(42);
            b.iter(|| black_box(evaluator.evaluate(&rng)));
        });
    }

    group.finish();
}

/// Benchmark a single Nyström fit.
fn bench_nystrom_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("nystrom_fit");
    group.sample_size(20);

    let market = market();
    let x = market.sample_states(4, 350, &mut PricerRng::from_seed(3));
    let y = payoff().evaluate(&x);
    let hyper = Hyperparameters::from_lengthscale(1e-6, 110.0);

    for device in [ComputeDevice::Cpu, ComputeDevice::Parallel] {
        group.bench_function(format!("{device:?}"), |b| {
            let krr = NystromKrr::new(250, device);
            b.iter(|| {
                let mut rng = PricerRng::from_seed(7);
                black_box(krr.fit(&x, &y, hyper, &mut rng))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_continuation, bench_hindsight, bench_nystrom_fit);
criterion_main!(benches);
