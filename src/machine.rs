//! Machine identity for enumeration: the fields beyond the transition table
//! that the Enumerator needs to bound and canonically order expansion.
//!
//! Grounded almost 1:1 on `original_source/LazyBeaver/turing_machine.h`/`.cpp`
//! (`TuringMachine`'s three constructors and their field-update formulas),
//! adapted to this crate's explicit `Transition::Undefined` (the original
//! has no true "undefined" cell; it pre-fills unexplored cells with a
//! placeholder Halt transition and tracks `num_halts` as "how many such
//! placeholders remain", which is the same quantity this crate counts as
//! "still-undefined cells").

use crate::transition::{Direction, NextState, State, Symbol, Transition, TransitionTable};

#[derive(Debug, Clone)]
pub struct Machine {
    table: TransitionTable,
    max_next_state: State,
    max_next_symbol: Symbol,
    next_move_left_ok: bool,
    num_halts: usize,
    hereditary_name: String,
}

impl Machine {
    /// The freshly constructed empty machine of dimensions (N, S) the
    /// Enumerator seeds its work stack with. `next_move_left_ok` is false
    /// here and only here, forcing the first move Right to break left/right
    /// symmetry (SPEC_FULL.md §3).
    pub fn new_empty(n_states: usize, n_symbols: usize) -> Self {
        Self {
            table: TransitionTable::new_undefined(n_states, n_symbols),
            max_next_state: 1,
            max_next_symbol: 1,
            next_move_left_ok: false,
            num_halts: n_states * n_symbols,
            hereditary_name: String::new(),
        }
    }

    /// Builds machine identity fields from an already-complete transition
    /// table (e.g. one parsed from text), assuming it is not the blank
    /// starting machine.
    pub fn from_table(table: TransitionTable, base_name: impl Into<String>) -> Self {
        let n_states = table.n_states();
        let n_symbols = table.n_symbols();
        let mut max_state: State = 0;
        let mut max_symbol: Symbol = 0;
        let mut num_halts = 0usize;
        for state in 0..n_states as State {
            for symbol in 0..n_symbols as Symbol {
                match table.get(state, symbol) {
                    Transition::Undefined => num_halts += 1,
                    Transition::Defined { write, next, .. } => {
                        max_symbol = max_symbol.max(write);
                        if let NextState::State(s) = next {
                            max_state = max_state.max(s);
                        }
                    }
                }
            }
        }
        Self {
            max_next_state: max_state.saturating_add(1).min((n_states - 1) as State),
            max_next_symbol: max_symbol.saturating_add(1).min((n_symbols - 1) as Symbol),
            next_move_left_ok: true,
            num_halts,
            hereditary_name: base_name.into(),
            table,
        }
    }

    /// Builds the child machine obtained by filling `(last_state,
    /// last_symbol)` with `next_transition`. `hereditary_sub_order` is this
    /// child's index among its siblings in the fixed expansion order
    /// (`enumerator.rs`).
    pub fn expand_child(
        &self,
        last_state: State,
        last_symbol: Symbol,
        next_transition: Transition,
        hereditary_sub_order: usize,
    ) -> Self {
        debug_assert!(self.table.get(last_state, last_symbol).is_undefined());
        let n_states = self.table.n_states();
        let n_symbols = self.table.n_symbols();

        let (introduced_state, introduced_symbol) = match next_transition {
            Transition::Defined { write, next, .. } => {
                let state = match next {
                    NextState::State(s) => s.saturating_add(1).min((n_states - 1) as State),
                    NextState::Halt => 0,
                };
                (state, write.saturating_add(1).min((n_symbols - 1) as Symbol))
            }
            Transition::Undefined => (0, 0),
        };

        let mut hereditary_name = self.hereditary_name.clone();
        if !hereditary_name.is_empty() {
            hereditary_name.push(',');
        }
        hereditary_name.push_str(&hereditary_sub_order.to_string());

        Self {
            table: self
                .table
                .with_cell(last_state, last_symbol, next_transition),
            max_next_state: self.max_next_state.max(introduced_state),
            max_next_symbol: self.max_next_symbol.max(introduced_symbol),
            next_move_left_ok: true,
            num_halts: self.num_halts - 1,
            hereditary_name,
        }
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn n_states(&self) -> usize {
        self.table.n_states()
    }

    pub fn n_symbols(&self) -> usize {
        self.table.n_symbols()
    }

    pub fn max_next_state(&self) -> State {
        self.max_next_state
    }

    pub fn max_next_symbol(&self) -> Symbol {
        self.max_next_symbol
    }

    pub fn next_move_left_ok(&self) -> bool {
        self.next_move_left_ok
    }

    pub fn num_halts(&self) -> usize {
        self.num_halts
    }

    pub fn hereditary_name(&self) -> &str {
        &self.hereditary_name
    }

    /// All directions admissible for the *next* expansion from this machine:
    /// always Right, plus Left iff `next_move_left_ok`. Order matches the
    /// Enumerator's fixed "Right before Left" rule (SPEC_FULL.md §4.7).
    pub fn admissible_directions(&self) -> &'static [Direction] {
        if self.next_move_left_ok {
            &[Direction::Right, Direction::Left]
        } else {
            &[Direction::Right]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_machine_identity() {
        let m = Machine::new_empty(2, 2);
        assert_eq!(m.max_next_state(), 1);
        assert_eq!(m.max_next_symbol(), 1);
        assert!(!m.next_move_left_ok());
        assert_eq!(m.num_halts(), 4);
        assert_eq!(m.hereditary_name(), "");
    }

    #[test]
    fn expand_child_updates_identity() {
        let m = Machine::new_empty(2, 2);
        let child = m.expand_child(
            0,
            0,
            Transition::Defined {
                write: 1,
                move_dir: Direction::Right,
                next: NextState::State(1),
            },
            0,
        );
        assert_eq!(child.num_halts(), 3);
        assert!(child.next_move_left_ok());
        assert_eq!(child.hereditary_name(), "0");
        assert_eq!(child.max_next_state(), 1);
    }

    #[test]
    fn from_table_bb2_max() {
        let table = TransitionTable::from_standard_tm_text_format("1RB 1LB  1LA 1RZ").unwrap();
        let m = Machine::from_table(table, "BB2_MAX");
        assert_eq!(m.num_halts(), 0);
        assert!(m.next_move_left_ok());
    }
}
