//! Symbol/state/direction primitives and the transition table, in the
//! "Standard TM Text Format" used throughout the enumeration and witness
//! logs (see `io_format.rs`).
//!
//! Grounded on `transition_generic.rs` (per-cell `WDS` parsing) and on
//! `original_source/LazyBeaver/turing_machine.cpp`'s
//! `WriteTuringMachine`/`ReadTuringMachine`, whose row grammar (single-space
//! cell separator, double-space row separator, `Z` = Halt) this module
//! implements directly.

use std::fmt::Display;

use crate::error::InputError;

/// A non-negative integer in `[0, S)`.
pub type Symbol = u8;

/// A non-negative integer in `[0, N)`. The Halt sentinel lives in `NextState`,
/// not here, since a bare `State` never denotes "halted".
pub type State = u8;

/// `next` field of a defined transition: either a state in `[0, N)` or the
/// distinguished Halt sentinel. Kept as its own sum type (rather than, say,
/// encoding Halt as a magic state value) so it can never be confused with
/// `Transition::Undefined` — see SPEC_FULL.md §9(b).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NextState {
    State(State),
    Halt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn flip(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Offset applied to a tape position when moving in this direction.
    pub fn offset(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", if *self == Direction::Left { "L" } else { "R" })
    }
}

/// One table cell. `Undefined` is the implicit "unfilled" cell the Enumerator
/// expands on; it is never a sentinel write symbol or state, unlike the
/// original C++ `-1` conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Undefined,
    Defined {
        write: Symbol,
        move_dir: Direction,
        next: NextState,
    },
}

impl Transition {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Transition::Undefined)
    }

    pub fn is_halt(&self) -> bool {
        matches!(
            self,
            Transition::Defined {
                next: NextState::Halt,
                ..
            }
        )
    }
}

impl Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Undefined => write!(f, "---"),
            Transition::Defined {
                write,
                move_dir,
                next,
            } => {
                let state_char = match next {
                    NextState::Halt => 'Z',
                    NextState::State(s) => (b'A' + s) as char,
                };
                write!(f, "{write}{move_dir}{state_char}")
            }
        }
    }
}

fn parse_cell(cell: &[u8]) -> Result<Transition, InputError> {
    if cell == b"---" {
        return Ok(Transition::Undefined);
    }
    if cell.len() != 3 {
        return Err(InputError::new(format!(
            "transition cell must be 3 characters or '---', got {:?}",
            std::str::from_utf8(cell).unwrap_or("<invalid utf8>")
        )));
    }
    let write = match cell[0] {
        b'0'..=b'9' => cell[0] - b'0',
        other => {
            return Err(InputError::new(format!(
                "invalid write symbol '{}'",
                other as char
            )))
        }
    };
    let move_dir = match cell[1] {
        b'L' => Direction::Left,
        b'R' => Direction::Right,
        other => {
            return Err(InputError::new(format!(
                "invalid direction '{}'",
                other as char
            )))
        }
    };
    let next = match cell[2] {
        b'Z' => NextState::Halt,
        b'A'..=b'Y' => NextState::State(cell[2] - b'A'),
        other => {
            return Err(InputError::new(format!(
                "invalid next state '{}'",
                other as char
            )))
        }
    };
    Ok(Transition::Defined {
        write,
        move_dir,
        next,
    })
}

/// Immutable N x S table of transitions, keys exhaustive (`Undefined` is a
/// value, not a missing key). Dynamically sized, unlike the teacher's
/// fixed-size `MAX_STATES_GENERIC`/`MAX_SYMBOLS_GENERIC` arrays, because the
/// enumerator must support an arbitrary `(N, S)` chosen at run time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    n_states: usize,
    n_symbols: usize,
    cells: Vec<Transition>,
}

impl TransitionTable {
    /// A table of the given dimensions with every cell undefined.
    pub fn new_undefined(n_states: usize, n_symbols: usize) -> Self {
        Self {
            n_states,
            n_symbols,
            cells: vec![Transition::Undefined; n_states * n_symbols],
        }
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn n_symbols(&self) -> usize {
        self.n_symbols
    }

    fn index(&self, state: State, symbol: Symbol) -> usize {
        debug_assert!((state as usize) < self.n_states);
        debug_assert!((symbol as usize) < self.n_symbols);
        state as usize * self.n_symbols + symbol as usize
    }

    pub fn get(&self, state: State, symbol: Symbol) -> Transition {
        self.cells[self.index(state, symbol)]
    }

    /// Returns a new table identical to `self` except for one cell. Used by
    /// `Machine`'s expansion constructor (`machine.rs`) rather than mutating
    /// in place, preserving the "TransitionTables are immutable after
    /// construction" invariant.
    pub fn with_cell(&self, state: State, symbol: Symbol, transition: Transition) -> Self {
        let mut next = self.clone();
        let idx = next.index(state, symbol);
        next.cells[idx] = transition;
        next
    }

    /// Parses the Standard TM Text Format: rows of `WDS`/`---` cells
    /// separated by a single space, rows separated by a double space,
    /// trailing `|`- or `#`-prefixed comments and whitespace stripped.
    pub fn from_standard_tm_text_format(line: &str) -> Result<Self, InputError> {
        let without_comment = line
            .split_once('|')
            .or_else(|| line.split_once('#'))
            .map(|(head, _)| head)
            .unwrap_or(line);
        let trimmed = without_comment.trim_end();
        if trimmed.is_empty() {
            return Err(InputError::new("empty transition table line"));
        }

        let rows: Vec<&str> = trimmed.split("  ").map(|r| r.trim()).collect();
        let n_states = rows.len();
        if n_states == 0 || n_states > 25 {
            return Err(InputError::new(format!(
                "number of states must be in [1, 25], got {n_states}"
            )));
        }

        let mut n_symbols = None;
        let mut rows_cells: Vec<Vec<Transition>> = Vec::with_capacity(n_states);
        for row in &rows {
            let cell_strs: Vec<&str> = row.split(' ').filter(|c| !c.is_empty()).collect();
            match n_symbols {
                None => n_symbols = Some(cell_strs.len()),
                Some(expected) if expected != cell_strs.len() => {
                    return Err(InputError::new(
                        "all rows of a transition table must have the same number of symbols",
                    ));
                }
                _ => {}
            }
            let mut row_cells = Vec::with_capacity(cell_strs.len());
            for cell in &cell_strs {
                row_cells.push(parse_cell(cell.as_bytes())?);
            }
            rows_cells.push(row_cells);
        }
        let n_symbols = n_symbols.unwrap_or(0);
        if n_symbols == 0 || n_symbols > 9 {
            return Err(InputError::new(format!(
                "number of symbols must be in [1, 9], got {n_symbols}"
            )));
        }

        // Validate that states/symbols referenced by transitions are in range.
        for row in &rows_cells {
            for cell in row {
                if let Transition::Defined {
                    next: NextState::State(s),
                    ..
                } = cell
                {
                    if *s as usize >= n_states {
                        return Err(InputError::new(format!(
                            "transition references out-of-range state {s}"
                        )));
                    }
                }
            }
        }

        let mut cells = Vec::with_capacity(n_states * n_symbols);
        for row in rows_cells {
            cells.extend(row);
        }
        Ok(Self {
            n_states,
            n_symbols,
            cells,
        })
    }

    pub fn to_standard_tm_text_format(&self) -> String {
        let mut rows = Vec::with_capacity(self.n_states);
        for state in 0..self.n_states {
            let cells: Vec<String> = (0..self.n_symbols)
                .map(|symbol| self.get(state as State, symbol as Symbol).to_string())
                .collect();
            rows.push(cells.join(" "));
        }
        rows.join("  ")
    }

    /// Parses the bracketed legacy form, accepted only on read: a sequence of
    /// `(new_state, new_symbol, direction)` triples laid out state-major,
    /// symbol-minor, with `direction in {0, 1}` mapping `0 -> Left`,
    /// `1 -> Right`. An absent/out-of-range state is treated as Halt, as in
    /// the historical readers this form originates from.
    pub fn from_bracketed_legacy_form(
        text: &str,
        n_states: usize,
        n_symbols: usize,
    ) -> Result<Self, InputError> {
        let mut triples = Vec::new();
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '(' {
                continue;
            }
            let mut buf = String::new();
            for c2 in chars.by_ref() {
                if c2 == ')' {
                    break;
                }
                buf.push(c2);
            }
            let parts: Vec<&str> = buf.split(',').map(|p| p.trim()).collect();
            if parts.len() != 3 {
                return Err(InputError::new(format!(
                    "bracketed triple must have 3 fields, got '{buf}'"
                )));
            }
            let new_state: i64 = parts[0]
                .parse()
                .map_err(|_| InputError::new(format!("invalid state '{}'", parts[0])))?;
            let new_symbol: Symbol = parts[1]
                .parse()
                .map_err(|_| InputError::new(format!("invalid symbol '{}'", parts[1])))?;
            let direction: u8 = parts[2]
                .parse()
                .map_err(|_| InputError::new(format!("invalid direction '{}'", parts[2])))?;
            triples.push((new_state, new_symbol, direction));
        }
        if triples.len() != n_states * n_symbols {
            return Err(InputError::new(format!(
                "expected {} transitions, found {}",
                n_states * n_symbols,
                triples.len()
            )));
        }

        let mut cells = Vec::with_capacity(triples.len());
        for (new_state, new_symbol, direction) in triples {
            let next = if new_state < 0 || new_state as usize >= n_states {
                NextState::Halt
            } else {
                NextState::State(new_state as State)
            };
            let move_dir = match direction {
                0 => Direction::Left,
                1 => Direction::Right,
                other => {
                    return Err(InputError::new(format!(
                        "bracketed direction must be 0 or 1, got {other}"
                    )))
                }
            };
            cells.push(Transition::Defined {
                write: new_symbol,
                move_dir,
                next,
            });
        }
        Ok(Self {
            n_states,
            n_symbols,
            cells,
        })
    }
}

impl Display for TransitionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_standard_tm_text_format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bb2_max() {
        // BB(2) = 6, the champion 2-state 2-symbol machine.
        let table = TransitionTable::from_standard_tm_text_format("1RB 1LB  1LA 1RZ").unwrap();
        assert_eq!(table.n_states(), 2);
        assert_eq!(table.n_symbols(), 2);
        assert_eq!(
            table.get(1, 1),
            Transition::Defined {
                write: 1,
                move_dir: Direction::Right,
                next: NextState::Halt,
            }
        );
    }

    #[test]
    fn undefined_cell_roundtrips() {
        let table = TransitionTable::from_standard_tm_text_format("1RB ---  1LA 1RZ").unwrap();
        assert_eq!(table.get(0, 1), Transition::Undefined);
        assert_eq!(table.to_standard_tm_text_format(), "1RB ---  1LA 1RZ");
    }

    #[test]
    fn strips_comment_and_trailing_whitespace() {
        let table =
            TransitionTable::from_standard_tm_text_format("1RB 1LB  1LA 1RZ   | BB(2) champion\n")
                .unwrap();
        assert_eq!(table.n_states(), 2);
    }

    #[test]
    fn rejects_mismatched_row_lengths() {
        let err = TransitionTable::from_standard_tm_text_format("1RB 1LB  1LA").unwrap_err();
        assert!(err.to_string().contains("same number of symbols"));
    }

    #[test]
    fn bracketed_legacy_form_parses() {
        // A2 (2 states, 2 symbols) laid out state-major, symbol-minor.
        let text = "(1,1,1)(1,1,0)(0,1,0)(-1,1,1)";
        let table = TransitionTable::from_bracketed_legacy_form(text, 2, 2).unwrap();
        assert_eq!(
            table.get(1, 1),
            Transition::Defined {
                write: 1,
                move_dir: Direction::Right,
                next: NextState::Halt,
            }
        );
    }
}
