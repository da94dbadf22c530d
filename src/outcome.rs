//! Terminal result of running one machine through a filter to conclusion
//! (SPEC_FULL.md §4.7's Running → {Halted, Undefined, Infinite} state
//! machine, folded with the step-budget/tape-limit cases from §5/§7 into one
//! outcome value per machine). Grounded on `status.rs`'s `MachineStatus`/
//! `EndlessReason`/`UndecidedReason`, trimmed to the reasons this crate's
//! simulators (`direct_simulator.rs`, `chain_simulator.rs`, `lin_recur.rs`)
//! actually produce; the teacher's bouncer/cycler-specific reasons have no
//! counterpart here since those deciders are outside the hard core.

use std::fmt::Display;

use crate::chain_simulator::{REASON_CHAIN_MOVE, REASON_PROOF_SYSTEM, REASON_REPEAT_IN_PLACE};
use crate::transition::{State, Symbol};

/// Why a machine was decided to run forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfiniteReason {
    /// `DirectSimulator`'s trivial-sweep check (SPEC_FULL.md §4.1, S4).
    TrivialSweep,
    /// `LinRecurDetector::detect` (SPEC_FULL.md §4.6).
    LinRecur { start_step: u64, period: u64, offset: i64 },
    /// `ChainSimulator`'s `inf_reason` (one of `chain_simulator::REASON_*`).
    ChainSimulator(&'static str),
}

impl Display for InfiniteReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfiniteReason::TrivialSweep => write!(f, "Trivial_Sweep"),
            InfiniteReason::LinRecur {
                start_step,
                period,
                offset,
            } => write!(f, "Lin_Recur {period} {offset} <{start_step}"),
            InfiniteReason::ChainSimulator(reason) => write!(f, "{reason}"),
        }
    }
}

/// Why a machine was left undecided rather than halted or proven infinite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndecidedReason {
    /// The configured step budget was exhausted before any filter reached a
    /// terminal state (SPEC_FULL.md §5, "not fatal").
    StepLimit,
    /// A `RunLengthTape`/`DirectSimulator` grew past the configured tape
    /// size limit without reaching a terminal state.
    TapeSizeLimit,
    /// No decider in the configured filter chain produced a result; kept as
    /// a distinct case from `StepLimit` for machines stopped by policy
    /// (e.g. `only_undecided` short-circuiting) rather than budget.
    DeciderNoResult,
}

impl Display for UndecidedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UndecidedReason::StepLimit => write!(f, "step limit reached"),
            UndecidedReason::TapeSizeLimit => write!(f, "tape size limit reached"),
            UndecidedReason::DeciderNoResult => write!(f, "no result"),
        }
    }
}

/// The terminal outcome of simulating one machine, with enough detail to
/// produce a witness/outcome log line (SPEC_FULL.md §6) and to decide
/// whether the Enumerator should expand it further (only `Undefined` cells
/// are ever expanded; `Halted`/`Infinite`/`Undecided` are leaves).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineOutcome {
    /// Ran off the edge of the filter's currently defined transitions at
    /// `(state, symbol)`; the Enumerator expands this machine.
    Undefined { state: State, symbol: Symbol },
    /// Reached the Halt sentinel; `steps`/`sigma_score` are the explicit
    /// statistics the witness log records.
    Halted { steps: u64, sigma_score: u64 },
    /// Proven to never halt.
    Infinite(InfiniteReason),
    /// Neither proven nor refuted within budget.
    Undecided(UndecidedReason),
}

impl MachineOutcome {
    pub fn is_leaf(&self) -> bool {
        !matches!(self, MachineOutcome::Undefined { .. })
    }

    pub fn infinite_reason(reason: &'static str) -> InfiniteReason {
        debug_assert!(
            reason == REASON_PROOF_SYSTEM
                || reason == REASON_CHAIN_MOVE
                || reason == REASON_REPEAT_IN_PLACE
        );
        InfiniteReason::ChainSimulator(reason)
    }
}

impl Display for MachineOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MachineOutcome::Undefined { state, symbol } => {
                write!(f, "Undefined at (state {state}, symbol {symbol})")
            }
            MachineOutcome::Halted { steps, sigma_score } => {
                write!(f, "Halt {steps} {sigma_score}")
            }
            MachineOutcome::Infinite(reason) => write!(f, "{reason}"),
            MachineOutcome::Undecided(reason) => write!(f, "Undecided: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halted_display_matches_witness_log_grammar() {
        let outcome = MachineOutcome::Halted {
            steps: 6,
            sigma_score: 4,
        };
        assert_eq!(outcome.to_string(), "Halt 6 4");
        assert!(outcome.is_leaf());
    }

    #[test]
    fn lin_recur_display_matches_witness_log_grammar() {
        let outcome = MachineOutcome::Infinite(InfiniteReason::LinRecur {
            start_step: 12,
            period: 4,
            offset: 2,
        });
        assert_eq!(outcome.to_string(), "Lin_Recur 4 2 <12");
    }

    #[test]
    fn undefined_is_not_a_leaf() {
        let outcome = MachineOutcome::Undefined { state: 0, symbol: 1 };
        assert!(!outcome.is_leaf());
    }

    #[test]
    fn chain_simulator_reason_roundtrips_through_display() {
        let reason = MachineOutcome::infinite_reason(REASON_CHAIN_MOVE);
        assert_eq!(reason.to_string(), "Chain_Move");
    }
}
