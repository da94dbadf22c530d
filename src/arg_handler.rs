//! Hand-rolled argument handler for the enumeration CLI surface
//! (SPEC_FULL.md §6a, "CLI surface"): a positional `(n_states, n_symbols,
//! step_budget)` enumeration command, a resumption form taking a stack
//! snapshot path, plus the teacher's `-h`/`--help` and `-m`/`--machine`
//! single-machine debug invocation, rebased on `machine::Machine` /
//! `transition::TransitionTable` now that those supersede
//! `machine_generic::MachineGeneric`.

use crate::machine::Machine;
use crate::transition::TransitionTable;

/// Return value of the argument handler.
#[non_exhaustive]
pub enum ArgValue {
    /// `-m`/`--machine <transitions>`: run a single machine, skipping
    /// enumeration entirely.
    Machine(Box<Machine>),
    /// `enumerate <n_states> <n_symbols> [step_budget]`: start a fresh
    /// enumeration over all (n_states, n_symbols) machines.
    Enumerate {
        n_states: usize,
        n_symbols: usize,
        step_budget: Option<u64>,
    },
    /// `resume <snapshot_path>`: continue a previously interrupted
    /// enumeration from its stack snapshot (SPEC_FULL.md §6).
    Resume { snapshot_path: String },
    /// Returned when the arg value leads to an action performed directly
    /// (e.g. printing help).
    Done,
    None,
    Error(String),
}

pub fn help_string() -> String {
    let mut s = String::new();
    s.push_str("This program accepts the following arguments:\n");
    s.push_str("-h, --help:                        This help text\n");
    s.push_str("-m, --machine <transitions>:        Run a single machine, e.g. '-m 1RB1LC_1RC1RB_1RD0LE_1LA1LD_1RZ0LA'\n");
    s.push_str("enumerate <states> <symbols> [steps]: Enumerate all (states, symbols) machines in tree-normal form\n");
    s.push_str("resume <snapshot>:                  Resume an enumeration from a stack snapshot file\n");
    s
}

pub fn standard_args(args: &[String]) -> ArgValue {
    if args.len() <= 1 {
        return ArgValue::None;
    }

    match args[1].as_str() {
        "-h" | "--help" => {
            println!("{}", help_string());
            return ArgValue::Done;
        }

        "-m" | "--machine" => {
            if args.len() != 3 {
                return ArgValue::Error("-m/--machine requires exactly one argument".to_string());
            }
            return match TransitionTable::from_standard_tm_text_format(&args[2]) {
                Ok(table) => ArgValue::Machine(Box::new(Machine::from_table(table, "cli"))),
                Err(e) => ArgValue::Error(e.to_string()),
            };
        }

        "enumerate" => {
            if args.len() < 4 || args.len() > 5 {
                return ArgValue::Error(
                    "enumerate requires <n_states> <n_symbols> [step_budget]".to_string(),
                );
            }
            let n_states = match args[2].parse::<usize>() {
                Ok(n) => n,
                Err(_) => return ArgValue::Error(format!("Invalid n_states: {}", args[2])),
            };
            let n_symbols = match args[3].parse::<usize>() {
                Ok(n) => n,
                Err(_) => return ArgValue::Error(format!("Invalid n_symbols: {}", args[3])),
            };
            let step_budget = if args.len() == 5 {
                match args[4].parse::<u64>() {
                    Ok(n) => Some(n),
                    Err(_) => return ArgValue::Error(format!("Invalid step_budget: {}", args[4])),
                }
            } else {
                None
            };
            return ArgValue::Enumerate {
                n_states,
                n_symbols,
                step_budget,
            };
        }

        "resume" => {
            if args.len() != 3 {
                return ArgValue::Error("resume requires <snapshot_path>".to_string());
            }
            return ArgValue::Resume {
                snapshot_path: args[2].clone(),
            };
        }

        _ => {}
    }

    println!("Invalid arguments: {:?}\n", &args[1..]);
    println!("{}", help_string());

    ArgValue::None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_machine() {
        let text = "1RB1LB_1LA1RZ";
        let args = vec!["path".to_string(), "-m".to_string(), text.to_string()];
        let r = standard_args(&args);
        let machine = match r {
            ArgValue::Machine(m) => m,
            _ => panic!("expected Machine"),
        };
        assert_eq!(machine.table().to_standard_tm_text_format(), text);
    }

    #[test]
    fn parses_enumerate_with_default_step_budget() {
        let args = vec![
            "path".to_string(),
            "enumerate".to_string(),
            "5".to_string(),
            "2".to_string(),
        ];
        match standard_args(&args) {
            ArgValue::Enumerate {
                n_states,
                n_symbols,
                step_budget,
            } => {
                assert_eq!(n_states, 5);
                assert_eq!(n_symbols, 2);
                assert_eq!(step_budget, None);
            }
            _ => panic!("expected Enumerate"),
        }
    }

    #[test]
    fn parses_enumerate_with_explicit_step_budget() {
        let args = vec![
            "path".to_string(),
            "enumerate".to_string(),
            "4".to_string(),
            "2".to_string(),
            "1000".to_string(),
        ];
        match standard_args(&args) {
            ArgValue::Enumerate { step_budget, .. } => assert_eq!(step_budget, Some(1000)),
            _ => panic!("expected Enumerate"),
        }
    }

    #[test]
    fn parses_resume() {
        let args = vec![
            "path".to_string(),
            "resume".to_string(),
            "stack_snapshot.txt".to_string(),
        ];
        match standard_args(&args) {
            ArgValue::Resume { snapshot_path } => assert_eq!(snapshot_path, "stack_snapshot.txt"),
            _ => panic!("expected Resume"),
        }
    }

    #[test]
    fn no_args_returns_none() {
        let args = vec!["path".to_string()];
        assert!(matches!(standard_args(&args), ArgValue::None));
    }
}
