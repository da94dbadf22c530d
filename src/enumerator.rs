//! Depth-first Tree-Normal-Form enumerator: a LIFO work stack of `Machine`s,
//! a configurable filter, and the fixed child-expansion order.
//!
//! Grounded almost verbatim on `original_source/LazyBeaver/enumeration.h`/
//! `.cpp` (`Enumerate`, `ExpandTM`, `MinMissing`) for the stack-pop/simulate/
//! expand-on-undefined driving loop; the per-push `Vec` used as the stack
//! mirrors the teacher's `data_provider/enumerator_tnf.rs`'s `machine_stack`
//! idiom rather than `std::stack` (no equivalent crate needed — `Vec` is
//! already a LIFO stack in Rust).

use std::collections::BTreeSet;

use crate::chain_simulator::ChainSimulator;
use crate::direct_simulator::{DirectSimulator, RunState};
use crate::lin_recur;
use crate::machine::Machine;
use crate::machine_adapter::{AdapterOutcome, AdapterState, MachineAdapter};
use crate::outcome::{InfiniteReason, MachineOutcome, UndecidedReason};
use crate::proof_system::ProofSystem;
use crate::transition::{NextState, Transition};
use num_traits::ToPrimitive;

/// Decides, for one popped machine, whether it halts, runs forever, is
/// undefined (and so should be expanded), or remains undecided within the
/// given step budget.
pub trait Filter {
    fn run(&self, machine: &Machine, step_budget: u64) -> MachineOutcome;
}

/// Lazy-beaver style filter: a plain `DirectSimulator`, matching the
/// original `DirectSimulate` exactly (SPEC_FULL.md §4.7's first filter
/// option).
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectFilter;

impl Filter for DirectFilter {
    fn run(&self, machine: &Machine, step_budget: u64) -> MachineOutcome {
        let mut sim = DirectSimulator::new(machine);
        sim.seek(step_budget);
        match sim.run_state() {
            RunState::Halted => MachineOutcome::Halted {
                steps: sim.step_num(),
                sigma_score: sim.sigma_score(),
            },
            RunState::Undefined => MachineOutcome::Undefined {
                state: sim.last_state(),
                symbol: sim.last_symbol(),
            },
            RunState::Infinite => MachineOutcome::Infinite(InfiniteReason::TrivialSweep),
            RunState::Running => MachineOutcome::Undecided(UndecidedReason::StepLimit),
        }
    }
}

/// Infinite-recurrence style filter: runs a `ChainSimulator` over a
/// `MachineAdapter::Simple` (SPEC_FULL.md §4.7's second filter option) with a
/// `ProofSystem` attached, falling back to an independent
/// `LinRecurDetector` pass before giving up as undecided. Restricted to
/// `Simple` (no `Macro`/`Backsymbol` promotion): the block-accelerated
/// adapters change the symbol/state space the simulator runs over, and this
/// filter's `Undefined` outcome must report the *base* table cell the
/// Enumerator expands on (see DESIGN.md).
pub struct ChainFilter {
    recursive_proofs: bool,
}

impl ChainFilter {
    pub fn new(recursive_proofs: bool) -> Self {
        Self { recursive_proofs }
    }
}

impl Default for ChainFilter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Filter for ChainFilter {
    fn run(&self, machine: &Machine, step_budget: u64) -> MachineOutcome {
        let adapter = MachineAdapter::simple(machine.table().clone());
        let mut proof = ProofSystem::new(&adapter, self.recursive_proofs);
        let mut sim = ChainSimulator::new(&adapter, Some(&mut proof));
        sim.seek(&num_bigint::BigInt::from(step_budget));

        use crate::chain_simulator::ChainOpState;
        match sim.op_state() {
            ChainOpState::Halted => MachineOutcome::Halted {
                steps: sim.step_num().to_u64().unwrap_or(u64::MAX),
                sigma_score: sim.num_nonzero().to_u64().unwrap_or(u64::MAX),
            },
            ChainOpState::Undefined => {
                let AdapterState { state, .. } = sim.state();
                let symbol = sim.tape().top_symbol() as crate::transition::Symbol;
                MachineOutcome::Undefined { state, symbol }
            }
            ChainOpState::Infinite => {
                let reason = sim.inf_reason().unwrap_or("Unknown");
                MachineOutcome::Infinite(MachineOutcome::infinite_reason(reason))
            }
            ChainOpState::Running => match lin_recur::detect(machine, step_budget) {
                lin_recur::LinRecurResult::LinRecurrent {
                    start_step,
                    period,
                    offset,
                } => MachineOutcome::Infinite(InfiniteReason::LinRecur {
                    start_step,
                    period,
                    offset,
                }),
                lin_recur::LinRecurResult::Halted { last_state, last_symbol } => {
                    MachineOutcome::Undefined {
                        state: last_state,
                        symbol: last_symbol,
                    }
                }
                lin_recur::LinRecurResult::Inconclusive => {
                    MachineOutcome::Undecided(UndecidedReason::StepLimit)
                }
            },
        }
    }
}

/// Result of one completed (or aborted) enumeration run.
#[derive(Debug, Clone, Default)]
pub struct EnumerationStats {
    pub machines_simulated: u64,
    pub machines_halted: u64,
    pub machines_infinite: u64,
    pub machines_undecided: u64,
}

impl std::fmt::Display for EnumerationStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "simulated {}, halted {}, infinite {}, undecided {}",
            self.machines_simulated,
            self.machines_halted,
            self.machines_infinite,
            self.machines_undecided
        )
    }
}

/// Accepts every terminal `MachineOutcome` the Enumerator produces, so the
/// driving loop stays independent of how results are recorded (witness
/// logs, a stack snapshot sink, or plain in-memory collection in tests).
pub trait OutcomeSink {
    fn record_halted(&mut self, machine: &Machine, steps: u64, sigma_score: u64);
    fn record_infinite(&mut self, machine: &Machine, reason: &InfiniteReason);
    fn record_undecided(&mut self, machine: &Machine, reason: UndecidedReason);
}

/// In-memory sink used by tests and by the lazy-beaver `MinMissing`
/// computation (`original_source/LazyBeaver/enumeration.cpp`'s
/// `std::set<long> steps_run`).
#[derive(Debug, Default)]
pub struct InMemorySink {
    pub steps_halted: BTreeSet<u64>,
    pub num_halted: u64,
    pub num_infinite: u64,
    pub num_undecided: u64,
}

impl OutcomeSink for InMemorySink {
    fn record_halted(&mut self, _machine: &Machine, steps: u64, _sigma_score: u64) {
        self.steps_halted.insert(steps);
        self.num_halted += 1;
    }

    fn record_infinite(&mut self, _machine: &Machine, _reason: &InfiniteReason) {
        self.num_infinite += 1;
    }

    fn record_undecided(&mut self, _machine: &Machine, _reason: UndecidedReason) {
        self.num_undecided += 1;
    }
}

impl InMemorySink {
    /// Smallest step count never realized by a halting machine
    /// (`original_source/LazyBeaver/enumeration.cpp`'s `MinMissing`); the
    /// Lazy Beaver number once the enumeration is exhaustive and conclusive.
    pub fn min_missing(&self) -> u64 {
        let mut i = 1u64;
        loop {
            if !self.steps_halted.contains(&i) {
                return i;
            }
            i += 1;
        }
    }
}

/// Generates every admissible child of a machine that stopped at
/// `(last_state, last_symbol)` with no transition defined there, in the
/// fixed order (state outer, symbol middle, Right before Left) from
/// SPEC_FULL.md §4.7, assigning each its `hereditary_sub_order`.
fn expand(machine: &Machine, last_state: crate::transition::State, last_symbol: crate::transition::Symbol) -> Vec<Machine> {
    let mut children = Vec::new();
    let mut order = 0usize;
    for next_state in 0..=machine.max_next_state() {
        for next_symbol in 0..=machine.max_next_symbol() {
            for &dir in machine.admissible_directions() {
                let transition = Transition::Defined {
                    write: next_symbol,
                    move_dir: dir,
                    next: NextState::State(next_state),
                };
                children.push(machine.expand_child(last_state, last_symbol, transition, order));
                order += 1;
            }
        }
    }
    children
}

/// Drains `stack` (LIFO) to exhaustion, recording every leaf outcome into
/// `sink` and pushing children of every `Undefined` outcome back onto it.
/// Shared by the single-threaded [`enumerate`] driver and by `engine.rs`'s
/// per-worker loops, each with its own stack seeded from
/// [`initial_frontier`].
pub fn drive(
    stack: &mut Vec<Machine>,
    step_budget: u64,
    filter: &dyn Filter,
    sink: &mut dyn OutcomeSink,
) -> EnumerationStats {
    let mut stats = EnumerationStats::default();

    while let Some(machine) = stack.pop() {
        stats.machines_simulated += 1;
        let outcome = filter.run(&machine, step_budget);
        match outcome {
            MachineOutcome::Halted { steps, sigma_score } => {
                stats.machines_halted += 1;
                sink.record_halted(&machine, steps, sigma_score);
            }
            MachineOutcome::Infinite(reason) => {
                stats.machines_infinite += 1;
                sink.record_infinite(&machine, &reason);
            }
            MachineOutcome::Undecided(reason) => {
                stats.machines_undecided += 1;
                sink.record_undecided(&machine, reason);
            }
            MachineOutcome::Undefined { state, symbol } => {
                if machine.num_halts() > 1 {
                    stack.extend(expand(&machine, state, symbol));
                }
                // Exactly one undefined cell left and `allow_no_halt` is
                // false: treat as a leaf without expanding further, mirroring
                // the original's "keep at least one halt transition" policy
                // (`Machine::num_halts` tracks this; the `allow_no_halt`
                // knob itself lives in `config.rs`).
            }
        }
    }

    stats
}

/// The root machine's children, i.e. the first generation the Enumerator
/// ever expands to (every (N, S) machine starts all-undefined, so its first
/// `Undefined` cell is always `(state 0, symbol 0)`). `engine.rs` distributes
/// this generation's machines round-robin across worker threads as their
/// initial stacks.
pub fn initial_frontier(n_states: usize, n_symbols: usize) -> Vec<Machine> {
    expand(&Machine::new_empty(n_states, n_symbols), 0, 0)
}

/// Runs the work-stack enumeration to exhaustion on a single thread.
/// Callers wanting a multi-threaded run should use `engine.rs` instead,
/// which seeds one stack per worker from [`initial_frontier`] and drives
/// each with [`drive`].
pub fn enumerate(
    n_states: usize,
    n_symbols: usize,
    step_budget: u64,
    filter: &dyn Filter,
    sink: &mut dyn OutcomeSink,
) -> EnumerationStats {
    let mut stack = vec![Machine::new_empty(n_states, n_symbols)];
    drive(&mut stack, step_budget, filter, sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bb1_direct_enumeration_finds_the_champion() {
        let mut sink = InMemorySink::default();
        let filter = DirectFilter;
        let stats = enumerate(1, 2, 100, &filter, &mut sink);
        assert!(stats.machines_simulated > 0);
        // BB(1,2): the champion halts after 1 step.
        assert!(sink.steps_halted.contains(&1));
    }

    #[test]
    fn bb2_direct_enumeration_finds_the_champion_step_count() {
        let mut sink = InMemorySink::default();
        let filter = DirectFilter;
        enumerate(2, 2, 100, &filter, &mut sink);
        assert!(sink.steps_halted.contains(&6));
    }

    #[test]
    fn min_missing_skips_gaps() {
        let mut sink = InMemorySink::default();
        sink.steps_halted.insert(1);
        sink.steps_halted.insert(2);
        sink.steps_halted.insert(4);
        assert_eq!(sink.min_missing(), 3);
    }

    #[test]
    fn chain_filter_halts_the_bb2_champion() {
        let m = Machine::from_table(
            crate::transition::TransitionTable::from_standard_tm_text_format("1RB 1LB  1LA 1RZ")
                .unwrap(),
            "bb2",
        );
        let filter = ChainFilter::default();
        match filter.run(&m, 10_000) {
            MachineOutcome::Halted { steps, .. } => assert_eq!(steps, 6),
            other => panic!("expected Halted, got {other:?}"),
        }
    }

    #[test]
    fn chain_filter_reports_the_trivial_sweep_as_infinite() {
        let m = Machine::from_table(
            crate::transition::TransitionTable::from_standard_tm_text_format("1RA 1RA").unwrap(),
            "sweep",
        );
        let filter = ChainFilter::default();
        match filter.run(&m, 1_000) {
            MachineOutcome::Infinite(_) => {}
            other => panic!("expected Infinite, got {other:?}"),
        }
    }
}
