//! Witness/outcome logs, stack snapshots, and the three work sinks
//! (SPEC_FULL.md §6). Transition-table textual parsing/printing itself lives
//! in `transition.rs`'s `from_standard_tm_text_format`/
//! `to_standard_tm_text_format`; this module only formats/persists whole
//! lines built on top of that grammar.
//!
//! Grounded on `transition_generic.rs` for the line grammar and on
//! `original_source/LazyBeaver/turing_machine.cpp`'s
//! `WriteTuringMachine`/`ReadTuringMachine` for the on-disk shape a sink file
//! is a sequence of. Compression is not something the teacher does anywhere
//! in its own output writers; `flate2` (used by `bytecodealliance-wasmtime`
//! in the retrieved example pack) is added for the streaming gzip writer
//! SPEC_FULL.md §6 calls for.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::EnumerationError;
use crate::machine::Machine;
use crate::outcome::MachineOutcome;
use crate::transition::TransitionTable;

/// Builds the one-line witness/outcome record for `machine`'s `outcome`
/// (SPEC_FULL.md §6, "Witness and outcome logs"): `<table> Halt <steps>
/// <sigma>`, `<table> Lin_Recur <period> <offset> <<start_step>`, `<table>
/// <reason>`, or bare `<table>` for an undecided machine.
pub fn format_outcome_line(machine: &Machine, outcome: &MachineOutcome) -> String {
    let table = machine.table().to_standard_tm_text_format();
    match outcome {
        MachineOutcome::Halted { .. } | MachineOutcome::Infinite(_) => {
            format!("{table} {outcome}")
        }
        MachineOutcome::Undecided(_) => table,
        MachineOutcome::Undefined { .. } => {
            // An enumerator never logs a machine that is still being
            // expanded; callers only reach this function with a leaf
            // outcome. Format it plainly rather than panicking so a
            // misrouted call is at least diagnosable.
            format!("{table} {outcome}")
        }
    }
}

/// One line of a stack snapshot: just the transition table, no outcome
/// suffix (SPEC_FULL.md §6, "Stack snapshot").
pub fn format_stack_line(machine: &Machine) -> String {
    machine.table().to_standard_tm_text_format()
}

/// Opens `path` for appending, wrapping the writer in a gzip encoder when
/// the path ends in `.gz` (SPEC_FULL.md §6, "Optional transparent
/// compression ... selected by file extension").
fn open_sink_writer(path: &str) -> Result<Box<dyn Write + Send>, EnumerationError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    if path.ends_with(".gz") {
        Ok(Box::new(GzEncoder::new(file, Compression::default())))
    } else {
        Ok(Box::new(BufWriter::new(file)))
    }
}

/// The three contract-defined work sinks plus the stack-snapshot writer
/// (SPEC_FULL.md §6). Owned exclusively by one worker (§5, "output sinks
/// ... are owned by the worker"); not `Clone`/`Sync`.
pub struct WorkSinks {
    halt: Option<Box<dyn Write + Send>>,
    infinite: Option<Box<dyn Write + Send>>,
    undecided: Option<Box<dyn Write + Send>>,
    only_undecided: bool,
}

impl WorkSinks {
    /// Opens the halt/infinite/undecided sinks at the given paths. When
    /// `only_undecided` is set, the halt and infinite paths are never opened
    /// and every write to them is silently dropped (SPEC_FULL.md §6, "A
    /// only undecided flag suppresses the first two").
    pub fn open(
        halt_path: &str,
        infinite_path: &str,
        undecided_path: &str,
        only_undecided: bool,
    ) -> Result<Self, EnumerationError> {
        Ok(Self {
            halt: if only_undecided {
                None
            } else {
                Some(open_sink_writer(halt_path)?)
            },
            infinite: if only_undecided {
                None
            } else {
                Some(open_sink_writer(infinite_path)?)
            },
            undecided: Some(open_sink_writer(undecided_path)?),
            only_undecided,
        })
    }

    pub fn write_halted(&mut self, machine: &Machine, outcome: &MachineOutcome) -> std::io::Result<()> {
        if let Some(w) = self.halt.as_mut() {
            writeln!(w, "{}", format_outcome_line(machine, outcome))?;
        }
        Ok(())
    }

    pub fn write_infinite(&mut self, machine: &Machine, outcome: &MachineOutcome) -> std::io::Result<()> {
        if let Some(w) = self.infinite.as_mut() {
            writeln!(w, "{}", format_outcome_line(machine, outcome))?;
        }
        Ok(())
    }

    pub fn write_undecided(&mut self, machine: &Machine, outcome: &MachineOutcome) -> std::io::Result<()> {
        if let Some(w) = self.undecided.as_mut() {
            writeln!(w, "{}", format_outcome_line(machine, outcome))?;
        }
        Ok(())
    }

    pub fn only_undecided(&self) -> bool {
        self.only_undecided
    }

    /// Flushes every open sink. Called on cooperative shutdown (SPEC_FULL.md
    /// §5) and at the end of a clean run.
    pub fn flush(&mut self) -> std::io::Result<()> {
        for w in [self.halt.as_mut(), self.infinite.as_mut(), self.undecided.as_mut()]
            .into_iter()
            .flatten()
        {
            w.flush()?;
        }
        Ok(())
    }
}

/// Writes the remaining work stack to `path`, one machine per line, in pop
/// order (SPEC_FULL.md §6, "Stack snapshot"); a resumption run's seed stack
/// is this file's lines pushed back in the same order they're read, so the
/// DFS continues exactly where it left off.
pub fn write_stack_snapshot(path: &str, stack: &[Machine]) -> Result<(), EnumerationError> {
    let mut writer = open_sink_writer(path)?;
    for machine in stack {
        writeln!(writer, "{}", format_stack_line(machine))?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a stack snapshot written by [`write_stack_snapshot`] back into a
/// seed stack for resumption.
pub fn read_stack_snapshot(path: &str) -> Result<Vec<Machine>, EnumerationError> {
    let reader: Box<dyn BufRead> = if path.ends_with(".gz") {
        Box::new(BufReader::new(flate2::read::GzDecoder::new(File::open(path)?)))
    } else {
        Box::new(BufReader::new(File::open(path)?))
    };

    let mut machines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let table = TransitionTable::from_standard_tm_text_format(line)?;
        machines.push(Machine::from_table(table, "resumed"));
    }
    Ok(machines)
}

/// `true` once the cooperative-shutdown sentinel file (default
/// `stop.enumeration`, SPEC_FULL.md §6 "Environment") exists in the current
/// directory.
pub fn shutdown_requested(sentinel_filename: &str) -> bool {
    Path::new(sentinel_filename).exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{InfiniteReason, UndecidedReason};

    fn machine(text: &str) -> Machine {
        Machine::from_table(TransitionTable::from_standard_tm_text_format(text).unwrap(), "t")
    }

    #[test]
    fn formats_halt_line() {
        let m = machine("1RB 1LB  1LA 1RZ");
        let line = format_outcome_line(&m, &MachineOutcome::Halted { steps: 6, sigma_score: 4 });
        assert_eq!(line, "1RB 1LB  1LA 1RZ Halt 6 4");
    }

    #[test]
    fn formats_lin_recur_line() {
        let m = machine("1RA 1RA");
        let outcome = MachineOutcome::Infinite(InfiniteReason::LinRecur {
            start_step: 12,
            period: 4,
            offset: 2,
        });
        let line = format_outcome_line(&m, &outcome);
        assert_eq!(line, "1RA 1RA Lin_Recur 4 2 <12");
    }

    #[test]
    fn formats_undecided_line_as_bare_table() {
        let m = machine("1RA 1RA");
        let line = format_outcome_line(&m, &MachineOutcome::Undecided(UndecidedReason::StepLimit));
        assert_eq!(line, "1RA 1RA");
    }

    #[test]
    fn stack_snapshot_round_trips() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("tnf_beaver_test_stack_{}.txt", std::process::id()));
        let path = path.to_str().unwrap();

        let machines = vec![machine("1RB 1LB  1LA 1RZ"), machine("1RA 1RA")];
        write_stack_snapshot(path, &machines).unwrap();
        let read_back = read_stack_snapshot(path).unwrap();
        assert_eq!(read_back.len(), 2);
        assert_eq!(
            read_back[0].table().to_standard_tm_text_format(),
            "1RB 1LB  1LA 1RZ"
        );

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn shutdown_sentinel_is_detected() {
        assert!(!shutdown_requested("definitely_does_not_exist.sentinel"));
    }
}
