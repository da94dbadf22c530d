#![allow(dead_code)]

use criterion::{criterion_group, criterion_main, Criterion};
use std::time::Duration;

use tnf_beaver::chain_simulator::ChainSimulator;
use tnf_beaver::direct_simulator::DirectSimulator;
use tnf_beaver::machine::Machine;
use tnf_beaver::machine_adapter::MachineAdapter;
use tnf_beaver::proof_system::ProofSystem;
use tnf_beaver::transition::TransitionTable;

const WARM_UP_TIME_MS: u64 = 500;
const MEASUREMENT_TIME_MS: u64 = 2000;

// BB(4) and BB(2,4) champions, used throughout as "notable machines".
const BB4_MAX: &str = "1RB1LB_1LA1RC_1RZ1LD_1RD0RA";
const BB2X4_MAX: &str = "1RB2LA1RA1RA_1LB1LA3RB1RZ";

criterion_group!(
    benches,
    benchmark_direct_simulator,
    benchmark_chain_simulator,
);
criterion_main!(benches);

fn notable_machine(text: &str) -> Machine {
    Machine::from_table(
        TransitionTable::from_standard_tm_text_format(text).unwrap(),
        "bench",
    )
}

fn benchmark_direct_simulator(c: &mut Criterion) {
    let mut group = c.benchmark_group("Bench DirectSimulator");

    group.warm_up_time(Duration::from_millis(WARM_UP_TIME_MS));
    group.measurement_time(Duration::from_millis(MEASUREMENT_TIME_MS));
    group.sample_size(10);

    let bb4 = notable_machine(BB4_MAX);
    let bb2x4 = notable_machine(BB2X4_MAX);

    group.bench_function("BB4 champion", |b| {
        b.iter(|| bench_direct_simulate(&bb4, 200))
    });
    group.bench_function("BB(2,4) champion", |b| {
        b.iter(|| bench_direct_simulate(&bb2x4, 3_000))
    });

    group.finish();
}

fn benchmark_chain_simulator(c: &mut Criterion) {
    let mut group = c.benchmark_group("Bench ChainSimulator");

    group.warm_up_time(Duration::from_millis(WARM_UP_TIME_MS));
    group.measurement_time(Duration::from_millis(MEASUREMENT_TIME_MS));
    group.sample_size(10);

    let bb4 = notable_machine(BB4_MAX);
    let bb2x4 = notable_machine(BB2X4_MAX);

    group.bench_function("BB4 champion, no proof system", |b| {
        b.iter(|| bench_chain_simulate(&bb4, 100_000, false))
    });
    group.bench_function("BB4 champion, with proof system", |b| {
        b.iter(|| bench_chain_simulate(&bb4, 100_000, true))
    });
    group.bench_function("BB(2,4) champion, with proof system", |b| {
        b.iter(|| bench_chain_simulate(&bb2x4, 100_000, true))
    });

    group.finish();
}

fn bench_direct_simulate(machine: &Machine, step_budget: u64) {
    let mut sim = DirectSimulator::new(machine);
    sim.seek(step_budget);
}

fn bench_chain_simulate(machine: &Machine, step_budget: u64, with_proof_system: bool) {
    let adapter = MachineAdapter::simple(machine.table().clone());
    if with_proof_system {
        let mut proof = ProofSystem::new(&adapter, true);
        let mut sim = ChainSimulator::new(&adapter, Some(&mut proof));
        sim.seek(&num_bigint::BigInt::from(step_budget));
    } else {
        let mut sim = ChainSimulator::new(&adapter, None);
        sim.seek(&num_bigint::BigInt::from(step_budget));
    }
}
