//! Compresses an infinite tape into a `RunLengthTape<BigInt>` and steps a
//! `MachineAdapter` over it, recognizing in-place chain moves and deferring
//! to an optional proof hook before falling back to a single macro move.
//!
//! Grounded on `original_source/FastSim/Chain_Simulator.h` (field layout:
//! the four stat counters, `op_state`, `inf_reason`) and SPEC_FULL.md §4.4
//! for the per-step algorithm, since `Chain_Simulator.cpp` was not part of
//! the retrieved pack.

use num_bigint::BigInt;
use num_traits::Zero;

use crate::machine_adapter::{AdapterOutcome, AdapterState, MachineAdapter};
use crate::run_length_tape::{RunCount, RunLengthTape};
use crate::transition::{Direction, State};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOpState {
    Running,
    Halted,
    Infinite,
    Undefined,
}

/// Reported only when `op_state == Infinite`.
pub const REASON_PROOF_SYSTEM: &str = "Proof_System";
pub const REASON_CHAIN_MOVE: &str = "Chain_Move";
pub const REASON_REPEAT_IN_PLACE: &str = "Repeat_in_Place";

#[derive(Debug, Clone)]
pub struct StepStats {
    pub loops: u64,
    pub macro_moves: u64,
    pub macro_steps: BigInt,
    pub chain_moves: u64,
    pub chain_steps: BigInt,
    pub rule_moves: u64,
    pub rule_steps: BigInt,
}

impl Default for StepStats {
    fn default() -> Self {
        Self {
            loops: 0,
            macro_moves: 0,
            macro_steps: BigInt::zero(),
            chain_moves: 0,
            chain_steps: BigInt::zero(),
            rule_moves: 0,
            rule_steps: BigInt::zero(),
        }
    }
}

/// What a `ProofHook` (implemented by `ProofSystem`) reports for one
/// `(state, tape)` configuration.
pub enum ProofLogResult {
    NoRule,
    Applied {
        new_tape: RunLengthTape<BigInt>,
        delta_steps: BigInt,
    },
    AppliedInfinite,
}

/// Decouples `ChainSimulator` from `proof_system.rs`: the proof system
/// implements this rather than the simulator depending on it directly.
pub trait ProofHook {
    fn log(&mut self, tape: &RunLengthTape<BigInt>, state: AdapterState, loop_num: u64) -> ProofLogResult;
}

pub struct ChainSimulator<'a> {
    adapter: &'a MachineAdapter,
    tape: RunLengthTape<BigInt>,
    state: AdapterState,
    /// (state, direction) of the previously emitted transition; `None`
    /// before the first step (so the first transition is never treated as
    /// a chain move).
    last_transition: Option<(State, Direction)>,
    step_num: BigInt,
    loop_num: u64,
    op_state: ChainOpState,
    inf_reason: Option<&'static str>,
    proof: Option<&'a mut dyn ProofHook>,
    stats: StepStats,
}

impl<'a> ChainSimulator<'a> {
    pub fn new(adapter: &'a MachineAdapter, proof: Option<&'a mut dyn ProofHook>) -> Self {
        Self {
            adapter,
            tape: RunLengthTape::define(0, Direction::Right),
            state: AdapterState::new(0, Direction::Right),
            last_transition: None,
            step_num: BigInt::zero(),
            loop_num: 0,
            op_state: ChainOpState::Running,
            inf_reason: None,
            proof,
            stats: StepStats::default(),
        }
    }

    pub fn op_state(&self) -> ChainOpState {
        self.op_state
    }

    pub fn inf_reason(&self) -> Option<&'static str> {
        self.inf_reason
    }

    pub fn step_num(&self) -> &BigInt {
        &self.step_num
    }

    pub fn stats(&self) -> &StepStats {
        &self.stats
    }

    pub fn tape(&self) -> &RunLengthTape<BigInt> {
        &self.tape
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    /// Sigma score via the adapter's `eval_symbol`/`eval_state`
    /// (SPEC_FULL.md §4.2/§9(a)) — never a running counter.
    pub fn num_nonzero(&self) -> BigInt {
        self.tape.weighted_sum(|sym| self.adapter.eval_symbol(sym))
            + BigInt::from(self.adapter.eval_state(&self.state))
    }

    pub fn seek(&mut self, cutoff: &BigInt) {
        while self.op_state == ChainOpState::Running && &self.step_num < cutoff {
            self.step();
        }
    }

    pub fn step(&mut self) {
        if self.op_state != ChainOpState::Running {
            return;
        }
        self.loop_num += 1;

        if let Some(proof) = self.proof.as_deref_mut() {
            match proof.log(&self.tape, self.state, self.loop_num) {
                ProofLogResult::Applied {
                    new_tape,
                    delta_steps,
                } => {
                    self.tape = new_tape;
                    self.step_num += &delta_steps;
                    self.stats.rule_moves += 1;
                    self.stats.rule_steps += &delta_steps;
                    return;
                }
                ProofLogResult::AppliedInfinite => {
                    self.op_state = ChainOpState::Infinite;
                    self.inf_reason = Some(REASON_PROOF_SYSTEM);
                    return;
                }
                ProofLogResult::NoRule => {}
            }
        }

        let top_symbol = self.tape.top_symbol();
        let result = self.adapter.get_transition(self.state, top_symbol);

        match result.outcome {
            AdapterOutcome::Undefined => {
                self.op_state = ChainOpState::Undefined;
            }
            AdapterOutcome::Halted => {
                let write = self.adapter.encode_write(&result.write);
                self.tape.apply_single_move(write, result.move_dir);
                self.step_num += BigInt::from(result.num_steps);
                self.op_state = ChainOpState::Halted;
            }
            AdapterOutcome::Infinite => {
                self.op_state = ChainOpState::Infinite;
                self.inf_reason = Some(REASON_REPEAT_IN_PLACE);
            }
            AdapterOutcome::Running => {
                let next_state = result.next_state.expect("Running implies a next state");
                let write = self.adapter.encode_write(&result.write);
                let is_chain_move = self
                    .last_transition
                    .map(|(s, d)| s == next_state && d == result.move_dir)
                    .unwrap_or(false);

                if is_chain_move {
                    match self.tape.apply_chain_move(write) {
                        RunCount::Infinite => {
                            self.op_state = ChainOpState::Infinite;
                            self.inf_reason = Some(REASON_CHAIN_MOVE);
                        }
                        RunCount::Finite(reps) => {
                            let added = BigInt::from(result.num_steps) * &reps;
                            self.step_num += &added;
                            self.stats.chain_moves += 1;
                            self.stats.chain_steps += added;
                        }
                    }
                } else {
                    self.tape.apply_single_move(write, result.move_dir);
                    self.step_num += BigInt::from(result.num_steps);
                    self.stats.macro_moves += 1;
                    self.stats.macro_steps += BigInt::from(result.num_steps);
                }

                self.state = AdapterState {
                    state: next_state,
                    entering_dir: result.move_dir,
                    back_symbol: result.next_back_symbol,
                };
                self.last_transition = Some((next_state, result.move_dir));
                self.stats.loops += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::TransitionTable;

    fn adapter_from(text: &str) -> MachineAdapter {
        MachineAdapter::simple(TransitionTable::from_standard_tm_text_format(text).unwrap())
    }

    #[test]
    fn halts_and_matches_direct_simulator_step_count() {
        let adapter = adapter_from("1RB 1LB  1LA 1RZ");
        let mut sim = ChainSimulator::new(&adapter, None);
        sim.seek(&BigInt::from(10_000));
        assert_eq!(sim.op_state(), ChainOpState::Halted);
        assert_eq!(sim.step_num(), &BigInt::from(6));
    }

    #[test]
    fn uniform_sweep_is_infinite_via_repeat_in_place() {
        let adapter = adapter_from("1RA 1RA");
        let mut sim = ChainSimulator::new(&adapter, None);
        sim.seek(&BigInt::from(1000));
        assert_eq!(sim.op_state(), ChainOpState::Infinite);
    }

    #[test]
    fn undefined_transition_is_reported() {
        let adapter = MachineAdapter::simple(crate::transition::TransitionTable::new_undefined(2, 2));
        let mut sim = ChainSimulator::new(&adapter, None);
        sim.seek(&BigInt::from(10));
        assert_eq!(sim.op_state(), ChainOpState::Undefined);
    }

    #[test]
    fn chain_move_accumulates_large_step_counts() {
        // 1RB 1LB / 1LA 1RZ sweeps right through state A writing 1s, each
        // time re-entering the same (state, dir) pair once past the first
        // step — exercising the chain-move path rather than halting
        // immediately on a short tape.
        let adapter = adapter_from("1RB 1LB  1LA 1RZ");
        let mut sim = ChainSimulator::new(&adapter, None);
        sim.seek(&BigInt::from(3));
        assert_eq!(sim.op_state(), ChainOpState::Running);
    }
}
