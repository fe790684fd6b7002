//! Performance benchmarks for the transition table
//!
//! - Table build over synthetic policies of growing size
//! - Forward and reverse analysis on a built table

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sepolgraph_analysis::config::AnalysisConfig;
use sepolgraph_analysis::features::domain_trans::{
    Direction, DomainTransAnalysis, DomainTransEngine, TransitionTable,
};
use sepolgraph_policy::{Policy, PolicyBuilder};

/// `n` daemons, each entered from init_t through its own executable
///
/// Every daemon is also in the `daemon` attribute, which may execute
/// every executable without a transition.
fn synthetic_policy(n: usize) -> Policy {
    let mut b = PolicyBuilder::new().with_version(30);
    b.declare_type("init_t").unwrap();
    b.declare_attribute("daemon").unwrap();
    b.declare_attribute("daemon_exec").unwrap();
    for i in 0..n {
        let domain = format!("d{i}_t");
        let exec = format!("d{i}_exec_t");
        b.declare_type(&domain).unwrap();
        b.declare_type(&exec).unwrap();
        b.assign(&domain, "daemon").unwrap();
        b.assign(&exec, "daemon_exec").unwrap();

        b.allow("init_t", &domain, "process", &["transition"]).unwrap();
        b.allow("init_t", &exec, "file", &["execute"]).unwrap();
        b.allow(&domain, &exec, "file", &["entrypoint"]).unwrap();
        b.type_transition("init_t", &exec, "process", &domain)
            .unwrap();
    }
    b.allow("daemon", "daemon_exec", "file", &["execute", "execute_no_trans"])
        .unwrap();
    b.build()
}

// ============================================================================
// Table Build
// ============================================================================

fn bench_table_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_build");

    for n in [10usize, 100, 500] {
        let policy = synthetic_policy(n);
        group.throughput(Throughput::Elements(policy.rule_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &policy, |b, policy| {
            b.iter(|| {
                let table = TransitionTable::build(black_box(policy)).unwrap();
                black_box(table)
            });
        });
    }

    group.finish();
}

// ============================================================================
// Analysis
// ============================================================================

fn bench_analysis(c: &mut Criterion) {
    let policy = synthetic_policy(200);
    let config = AnalysisConfig::default().auto_reset(true);
    let mut engine = DomainTransEngine::with_config(&policy, config).unwrap();
    engine.build_table().unwrap();

    let mut forward = DomainTransAnalysis::new();
    forward.set_direction(Direction::Forward).set_start_type("init_t");
    c.bench_function("forward_from_init", |b| {
        b.iter(|| black_box(engine.run(&forward).unwrap()));
    });

    let mut reverse = DomainTransAnalysis::new();
    reverse.set_direction(Direction::Reverse).set_start_type("d42_t");
    c.bench_function("reverse_into_daemon", |b| {
        b.iter(|| black_box(engine.run(&reverse).unwrap()));
    });
}

criterion_group!(benches, bench_table_build, bench_analysis);
criterion_main!(benches);
