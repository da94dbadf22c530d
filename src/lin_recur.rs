//! Detects "lin-recurrence": a machine whose tape-relative configuration at
//! some step repeats, exactly or translated by a fixed offset, with a fixed
//! period — a sufficient condition for running forever without a full chain
//! simulation.
//!
//! Grounded almost verbatim on `original_source/cpp/src/lin_recur.cpp`/`.h`
//! (`LinRecurDetect`, `are_half_tapes_equal`, `are_sections_equal`), ported
//! from its `DirectSimulator`/`Tape` pair to this crate's
//! `DirectSimulator`/`TapeSnapshot`.

use crate::direct_simulator::{DirectSimulator, RunState, TapeSnapshot};
use crate::machine::Machine;
use crate::transition::{State, Symbol};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinRecurResult {
    Halted {
        last_state: State,
        last_symbol: Symbol,
    },
    LinRecurrent {
        start_step: u64,
        period: u64,
        offset: i64,
    },
    Inconclusive,
}

fn half_tapes_equal(
    tape1: &TapeSnapshot,
    start_pos1: i64,
    tape2: &TapeSnapshot,
    start_pos2: i64,
    dir_offset: i64,
) -> bool {
    let mut pos1 = start_pos1;
    let mut pos2 = start_pos2;
    while tape1.in_range(pos1) || tape2.in_range(pos2) {
        if tape1.read(pos1) != tape2.read(pos2) {
            return false;
        }
        pos1 += dir_offset;
        pos2 += dir_offset;
    }
    true
}

fn sections_equal(
    start_tape: &TapeSnapshot,
    end_tape: &TapeSnapshot,
    most_left_pos: i64,
    most_right_pos: i64,
) -> bool {
    let mut pos = most_left_pos;
    while pos <= most_right_pos {
        if start_tape.read(pos) != end_tape.read(pos) {
            return false;
        }
        pos += 1;
    }
    true
}

/// Repeatedly doubles a reference step, snapshotting the tape at the start
/// of each doubling window and checking every intermediate return to that
/// step's state against the snapshot under all three offset cases.
pub fn detect(machine: &Machine, max_steps: u64) -> LinRecurResult {
    let mut sim = DirectSimulator::new(machine);
    let init_pos = sim.position();
    sim.step();
    match sim.run_state() {
        RunState::Halted => {
            return LinRecurResult::Halted {
                last_state: sim.last_state(),
                last_symbol: sim.last_symbol(),
            };
        }
        RunState::Infinite => {
            return LinRecurResult::LinRecurrent {
                start_step: 0,
                period: 1,
                offset: if sim.position() >= init_pos { 1 } else { -1 },
            };
        }
        RunState::Undefined => return LinRecurResult::Inconclusive,
        RunState::Running => {}
    }

    while sim.step_num() < max_steps {
        let init_step_num = sim.step_num();
        let steps_reset = 2 * init_step_num;
        let init_state = sim.state();
        let init_tape = sim.snapshot();
        let init_pos = sim.position();
        let mut most_left_pos = init_pos;
        let mut most_right_pos = init_pos;

        while sim.step_num() < steps_reset {
            sim.step();
            match sim.run_state() {
                RunState::Halted => {
                    return LinRecurResult::Halted {
                        last_state: sim.last_state(),
                        last_symbol: sim.last_symbol(),
                    };
                }
                RunState::Undefined => {
                    return LinRecurResult::Inconclusive;
                }
                RunState::Infinite => {
                    // A trivial sweep is lin-recurrent in the loosest sense
                    // (period 1, always offsetting toward infinity); report
                    // it as such rather than inconclusive.
                    return LinRecurResult::LinRecurrent {
                        start_step: init_step_num,
                        period: 1,
                        offset: if sim.position() >= init_pos { 1 } else { -1 },
                    };
                }
                RunState::Running => {}
            }

            most_left_pos = most_left_pos.min(sim.position());
            most_right_pos = most_right_pos.max(sim.position());

            if sim.state() == init_state {
                let offset = sim.position() - init_pos;
                let cur_tape = sim.snapshot();
                let success = match offset.cmp(&0) {
                    std::cmp::Ordering::Greater => half_tapes_equal(
                        &init_tape,
                        most_left_pos,
                        &cur_tape,
                        most_left_pos + offset,
                        1,
                    ),
                    std::cmp::Ordering::Less => half_tapes_equal(
                        &init_tape,
                        most_right_pos,
                        &cur_tape,
                        most_right_pos + offset,
                        -1,
                    ),
                    std::cmp::Ordering::Equal => {
                        sections_equal(&init_tape, &cur_tape, most_left_pos, most_right_pos)
                    }
                };

                if success {
                    return LinRecurResult::LinRecurrent {
                        start_step: init_step_num,
                        period: sim.step_num() - init_step_num,
                        offset,
                    };
                }
            }
        }
    }

    LinRecurResult::Inconclusive
}

/// Verifies a previously reported `(start_step, period)` pair directly,
/// without re-searching. Mirrors the original's `LinRecurCheck` intent: a
/// cheap re-validation path distinct from the doubling search in `detect`.
pub fn check(machine: &Machine, start_step: u64, period: u64) -> bool {
    let mut sim = DirectSimulator::new(machine);
    while sim.step_num() < start_step {
        sim.step();
        match sim.run_state() {
            RunState::Running => {}
            RunState::Infinite => return start_step == 0,
            RunState::Halted | RunState::Undefined => return false,
        }
    }
    if !matches!(sim.run_state(), RunState::Running) {
        return false;
    }
    let init_state = sim.state();
    let init_tape = sim.snapshot();
    let init_pos = sim.position();
    let mut most_left_pos = init_pos;
    let mut most_right_pos = init_pos;

    let target = start_step + period;
    while sim.step_num() < target {
        sim.step();
        match sim.run_state() {
            RunState::Running => {}
            RunState::Infinite => return true,
            RunState::Halted | RunState::Undefined => return false,
        }
        most_left_pos = most_left_pos.min(sim.position());
        most_right_pos = most_right_pos.max(sim.position());
    }

    if sim.state() != init_state {
        return false;
    }
    let offset = sim.position() - init_pos;
    let cur_tape = sim.snapshot();
    match offset.cmp(&0) {
        std::cmp::Ordering::Greater => {
            half_tapes_equal(&init_tape, most_left_pos, &cur_tape, most_left_pos + offset, 1)
        }
        std::cmp::Ordering::Less => half_tapes_equal(
            &init_tape,
            most_right_pos,
            &cur_tape,
            most_right_pos + offset,
            -1,
        ),
        std::cmp::Ordering::Equal => sections_equal(&init_tape, &cur_tape, most_left_pos, most_right_pos),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::TransitionTable;

    fn machine_from(text: &str) -> Machine {
        Machine::from_table(TransitionTable::from_standard_tm_text_format(text).unwrap(), "t")
    }

    #[test]
    fn halting_machine_reports_halted() {
        let m = machine_from("1RB 1LB  1LA 1RZ");
        match detect(&m, 10_000) {
            LinRecurResult::Halted { .. } => {}
            other => panic!("expected Halted, got {other:?}"),
        }
    }

    #[test]
    fn uniform_sweep_is_lin_recurrent() {
        let m = machine_from("1RA 1RA");
        match detect(&m, 10_000) {
            LinRecurResult::LinRecurrent { .. } => {}
            other => panic!("expected LinRecurrent, got {other:?}"),
        }
    }

    #[test]
    fn check_confirms_a_detected_period() {
        let m = machine_from("1RA 1RA");
        if let LinRecurResult::LinRecurrent {
            start_step, period, ..
        } = detect(&m, 10_000)
        {
            assert!(check(&m, start_step, period));
        } else {
            panic!("expected LinRecurrent");
        }
    }
}
