//! Command-line entry point (SPEC_FULL.md §6, "Command surface"): parses the
//! positional enumeration/resume arguments, builds a `Config`, and drives
//! the enumeration, writing results to the three work sinks plus a stack
//! snapshot on cooperative shutdown.

use std::process::ExitCode;

use tnf_beaver::arg_handler::{help_string, standard_args, ArgValue};
use tnf_beaver::config::Config;
use tnf_beaver::enumerator::{drive, initial_frontier, ChainFilter, Filter};
use tnf_beaver::io_format::{shutdown_requested, write_stack_snapshot, WorkSinks};
use tnf_beaver::machine::Machine;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    match standard_args(&args) {
        ArgValue::Done | ArgValue::None => ExitCode::SUCCESS,

        ArgValue::Error(message) => {
            eprintln!("{message}\n");
            eprintln!("{}", help_string());
            ExitCode::FAILURE
        }

        ArgValue::Machine(machine) => {
            run_single_machine(&machine);
            ExitCode::SUCCESS
        }

        ArgValue::Enumerate {
            n_states,
            n_symbols,
            step_budget,
        } => {
            let mut builder = Config::builder(n_states, n_symbols);
            if let Some(step_budget) = step_budget {
                builder = builder.step_budget(step_budget as u32);
            }
            let config = builder.build();
            let stack = vec![Machine::new_empty(n_states, n_symbols)];
            run_enumeration(&config, stack)
        }

        ArgValue::Resume { snapshot_path } => {
            match tnf_beaver::io_format::read_stack_snapshot(&snapshot_path) {
                Ok(stack) => {
                    let n_states = stack.first().map(Machine::n_states).unwrap_or(5);
                    let n_symbols = stack.first().map(Machine::n_symbols).unwrap_or(2);
                    let config = Config::builder(n_states, n_symbols).build();
                    run_enumeration(&config, stack)
                }
                Err(e) => {
                    eprintln!("could not read stack snapshot {snapshot_path}: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn run_single_machine(machine: &Machine) {
    let filter = ChainFilter::default();
    let outcome = filter.run(machine, 50_000_000);
    println!(
        "{} {outcome}",
        machine.table().to_standard_tm_text_format()
    );
}

fn run_enumeration(config: &Config, mut stack: Vec<Machine>) -> ExitCode {
    let sinks = config.sinks();
    let mut work_sinks = match WorkSinks::open(
        &sinks.halt,
        &sinks.infinite,
        &sinks.undecided,
        config.only_undecided(),
    ) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("could not open work sinks: {e}");
            return ExitCode::FAILURE;
        }
    };

    if stack.is_empty() {
        stack = initial_frontier(config.n_states(), config.n_symbols());
    }

    let filter = ChainFilter::default();
    let stop_filename = config.config_toml().stop_filename().to_string();

    // Drive in small slices so the cooperative shutdown sentinel is honored
    // roughly every few thousand machines rather than only once the whole
    // enumeration finishes (SPEC_FULL.md §5).
    struct SinkAdapter<'a> {
        sinks: &'a mut WorkSinks,
    }
    impl tnf_beaver::enumerator::OutcomeSink for SinkAdapter<'_> {
        fn record_halted(&mut self, machine: &Machine, steps: u64, sigma_score: u64) {
            let outcome = tnf_beaver::outcome::MachineOutcome::Halted { steps, sigma_score };
            let _ = self.sinks.write_halted(machine, &outcome);
        }
        fn record_infinite(&mut self, machine: &Machine, reason: &tnf_beaver::outcome::InfiniteReason) {
            let outcome = tnf_beaver::outcome::MachineOutcome::Infinite(reason.clone());
            let _ = self.sinks.write_infinite(machine, &outcome);
        }
        fn record_undecided(&mut self, machine: &Machine, reason: tnf_beaver::outcome::UndecidedReason) {
            let outcome = tnf_beaver::outcome::MachineOutcome::Undecided(reason);
            let _ = self.sinks.write_undecided(machine, &outcome);
        }
    }

    loop {
        let mut chunk: Vec<Machine> = stack.drain(stack.len().saturating_sub(1000)..).collect();
        if chunk.is_empty() {
            break;
        }
        let mut sink_adapter = SinkAdapter {
            sinks: &mut work_sinks,
        };
        drive(
            &mut chunk,
            config.step_budget() as u64,
            &filter,
            &mut sink_adapter,
        );

        if shutdown_requested(&stop_filename) {
            if let Err(e) = write_stack_snapshot(&sinks.stack_snapshot, &stack) {
                eprintln!("could not write stack snapshot: {e}");
                return ExitCode::FAILURE;
            }
            break;
        }
    }

    if let Err(e) = work_sinks.flush() {
        eprintln!("could not flush work sinks: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
