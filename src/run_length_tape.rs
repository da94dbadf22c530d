//! Two half-tapes of run-length blocks, generic over the count type `T`
//! (concrete `BigInt` for `ChainSimulator`, symbolic `Expression` for the
//! `ProofSystem`'s `GeneralChainSimulator`).
//!
//! Grounded on `original_source/FastSim/Tape.h`/`.cpp` (`REPEATED_SYMBOL`,
//! `apply_single_move`, `apply_chain_move`). One generalization beyond the
//! original: `m_displace` there is always a concrete integer; here it is
//! `Option<BigInt>`, populated for concrete (`BigInt`) tapes and left `None`
//! for symbolic (`Expression`) tapes, since a symbolic run count has no
//! single displacement value until a rule is applied to a concrete
//! configuration (see DESIGN.md).

use num_bigint::BigInt;
use num_traits::Zero;

use crate::expression::Expression;
use crate::transition::Direction;

/// Symbol type used on a `RunLengthTape`. Wider than the base alphabet's
/// `transition::Symbol` (`u8`) because the `ChainSimulator` runs over a
/// `MachineAdapter` that may be a block-macro machine, whose alphabet is
/// tuples of up to `k` base symbols encoded as a single integer
/// (`machine_adapter.rs::encode_block`); `u8` would overflow for `k > 2`
/// even at a modest base alphabet size.
pub type TapeSymbol = u32;

/// A run count: either a concrete/symbolic value, or the distinguished
/// infinite blank extent. Never represented as a magic value of `T` itself
/// (SPEC_FULL.md §9(b)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunCount<T> {
    Finite(T),
    Infinite,
}

/// Arithmetic capability `RunLengthTape<T>` needs from its count type.
pub trait RunCountValue: Clone + PartialEq {
    fn zero() -> Self;
    fn one() -> Self;
    fn add(&self, other: &Self) -> Self;
    fn decrement(&self) -> Self;
    fn is_zero(&self) -> bool;
    fn scale_small(&self, k: i64) -> Self;
    /// A concrete displacement contribution, if this value has one.
    fn to_bigint(&self) -> Option<BigInt>;
}

impl RunCountValue for BigInt {
    fn zero() -> Self {
        BigInt::from(0)
    }
    fn one() -> Self {
        BigInt::from(1)
    }
    fn add(&self, other: &Self) -> Self {
        self + other
    }
    fn decrement(&self) -> Self {
        self - 1
    }
    fn is_zero(&self) -> bool {
        Zero::is_zero(self)
    }
    fn scale_small(&self, k: i64) -> Self {
        self * k
    }
    fn to_bigint(&self) -> Option<BigInt> {
        Some(self.clone())
    }
}

impl RunCountValue for Expression {
    fn zero() -> Self {
        Expression::zero()
    }
    fn one() -> Self {
        Expression::constant(1)
    }
    fn add(&self, other: &Self) -> Self {
        Expression::add(self, other)
    }
    fn decrement(&self) -> Self {
        self.add_int(-1)
    }
    fn is_zero(&self) -> bool {
        // Symbolic blocks are never dropped for reaching zero: their
        // variables carry a known positive lower bound recorded by
        // `ProofSystem::compare` (`proof_system.rs`), enforced there rather
        // than here.
        false
    }
    fn scale_small(&self, k: i64) -> Self {
        self.scale(k)
    }
    fn to_bigint(&self) -> Option<BigInt> {
        self.as_constant().cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<T> {
    pub symbol: TapeSymbol,
    pub count: RunCount<T>,
}

fn half_index(dir: Direction) -> usize {
    match dir {
        Direction::Left => 0,
        Direction::Right => 1,
    }
}

/// Two ordered sequences of blocks (index 0 = left half, 1 = right half),
/// each stored outermost-first / head-adjacent-last so the "top" of a half
/// is simply its last element.
#[derive(Debug, Clone)]
pub struct RunLengthTape<T> {
    halves: [Vec<Block<T>>; 2],
    /// Direction of the most recent move; selects which half is "current"
    /// for `apply_chain_move`, which (unlike `apply_single_move`) is not
    /// given an explicit direction each call.
    dir: Direction,
    blank_symbol: TapeSymbol,
    displace: Option<BigInt>,
}

impl<T: RunCountValue> RunLengthTape<T> {
    /// Installs the blank symbol and an infinite blank block on each half.
    pub fn define(blank_symbol: TapeSymbol, init_dir: Direction) -> Self {
        let blank_block = || Block {
            symbol: blank_symbol,
            count: RunCount::Infinite,
        };
        Self {
            halves: [vec![blank_block()], vec![blank_block()]],
            dir: init_dir,
            blank_symbol,
            displace: Some(BigInt::from(0)),
        }
    }

    /// Builds a tape directly from pre-coalesced halves, e.g. when the
    /// `ProofSystem` replaces a concrete occurrence's non-unit blocks with
    /// fresh symbolic variables (`proof_system.rs::compare`). Callers are
    /// responsible for the coalescence invariant; `displace` is left
    /// unset since the caller did not reach this shape through moves.
    pub fn from_halves(blank_symbol: TapeSymbol, dir: Direction, halves: [Vec<Block<T>>; 2]) -> Self {
        Self {
            halves,
            dir,
            blank_symbol,
            displace: None,
        }
    }

    pub fn dir(&self) -> Direction {
        self.dir
    }

    pub fn displace(&self) -> Option<&BigInt> {
        self.displace.as_ref()
    }

    pub fn half(&self, dir: Direction) -> &[Block<T>] {
        &self.halves[half_index(dir)]
    }

    pub fn top_block(&self) -> &Block<T> {
        self.halves[half_index(self.dir)].last().unwrap()
    }

    pub fn top_symbol(&self) -> TapeSymbol {
        self.top_block().symbol
    }

    fn decrement_top(&mut self, idx: usize) {
        let drop = {
            let block = self.halves[idx].last_mut().unwrap();
            match &block.count {
                RunCount::Infinite => false,
                RunCount::Finite(v) => {
                    let next = v.decrement();
                    let should_drop = next.is_zero();
                    if !should_drop {
                        block.count = RunCount::Finite(next);
                    }
                    should_drop
                }
            }
        };
        if drop {
            self.halves[idx].pop();
        }
    }

    fn push_coalesce(&mut self, idx: usize, symbol: TapeSymbol, count: RunCount<T>) {
        if let Some(top) = self.halves[idx].last_mut() {
            if top.symbol == symbol {
                match (&top.count, &count) {
                    (RunCount::Infinite, _) => return,
                    (RunCount::Finite(a), RunCount::Finite(b)) => {
                        top.count = RunCount::Finite(a.add(b));
                        return;
                    }
                    (RunCount::Finite(_), RunCount::Infinite) => {
                        top.count = RunCount::Infinite;
                        return;
                    }
                }
            }
        }
        self.halves[idx].push(Block { symbol, count });
    }

    /// One base step in the expanded semantics (SPEC_FULL.md §4.2).
    pub fn apply_single_move(&mut self, write: TapeSymbol, move_dir: Direction) {
        let cur = half_index(self.dir);
        self.decrement_top(cur);
        let opp = 1 - cur;
        self.push_coalesce(opp, write, RunCount::Finite(T::one()));
        if let Some(d) = &self.displace {
            self.displace = Some(d + move_dir.offset());
        }
        self.dir = move_dir;
    }

    /// Collapses the whole top block (count `n`) into a single operation,
    /// in the already-established direction `self.dir`. Returns `Infinite`
    /// if the block itself was infinite (the machine sweeps forever in this
    /// direction) without mutating the tape.
    pub fn apply_chain_move(&mut self, write: TapeSymbol) -> RunCount<T> {
        let cur = half_index(self.dir);
        let top_count = self.halves[cur].last().unwrap().count.clone();
        match top_count {
            RunCount::Infinite => RunCount::Infinite,
            RunCount::Finite(n) => {
                self.halves[cur].pop();
                let opp = 1 - cur;
                self.push_coalesce(opp, write, RunCount::Finite(n.clone()));
                if let (Some(d), Some(nb)) = (&self.displace, n.to_bigint()) {
                    let delta = &nb * self.dir.offset();
                    self.displace = Some(d + delta);
                } else {
                    self.displace = None;
                }
                RunCount::Finite(n)
            }
        }
    }

    /// `sum(weight(symbol) * count)` over all finite blocks on both halves,
    /// the "Sigma score" defined through a `MachineAdapter`'s
    /// `eval_symbol`/`eval_state` (SPEC_FULL.md §4.2/§9(a)).
    pub fn weighted_sum(&self, weight: impl Fn(TapeSymbol) -> i64) -> T {
        let mut total = T::zero();
        for half in &self.halves {
            for block in half {
                if let RunCount::Finite(v) = &block.count {
                    let w = weight(block.symbol);
                    if w != 0 {
                        total = total.add(&v.scale_small(w));
                    }
                }
            }
        }
        total
    }

    /// Checks invariant 1 (tape coalescence): no two adjacent blocks on a
    /// half share a symbol, and only the outermost block of each half is
    /// infinite.
    pub fn is_coalesced(&self) -> bool {
        for half in &self.halves {
            if half.is_empty() {
                return false;
            }
            if !matches!(half[0].count, RunCount::Infinite) || half[0].symbol != self.blank_symbol
            {
                return false;
            }
            for window in half.windows(2) {
                if window[0].symbol == window[1].symbol {
                    return false;
                }
            }
            for block in &half[1..] {
                if matches!(block.count, RunCount::Infinite) {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_is_coalesced() {
        let tape: RunLengthTape<BigInt> = RunLengthTape::define(0, Direction::Right);
        assert!(tape.is_coalesced());
        assert_eq!(tape.top_symbol(), 0);
    }

    #[test]
    fn single_moves_build_and_coalesce_blocks() {
        let mut tape: RunLengthTape<BigInt> = RunLengthTape::define(0, Direction::Right);
        tape.apply_single_move(1, Direction::Right);
        tape.apply_single_move(1, Direction::Right);
        tape.apply_single_move(1, Direction::Right);
        assert!(tape.is_coalesced());
        // Left half now holds a single coalesced (1, 3) block atop the
        // infinite blank block.
        let left = tape.half(Direction::Left);
        assert_eq!(left.len(), 2);
        assert_eq!(left[1].symbol, 1);
        assert_eq!(left[1].count, RunCount::Finite(BigInt::from(3)));
        assert_eq!(tape.displace(), Some(&BigInt::from(3)));
    }

    #[test]
    fn chain_move_consumes_whole_block() {
        let mut tape: RunLengthTape<BigInt> = RunLengthTape::define(0, Direction::Right);
        // Move left twice (writing 1 at positions 0 and -1), then step right
        // once (writing 1 at position -2 and re-entering position -1's
        // block). `decrement_top` must act on the half that was current
        // *before* this move, not the half named by the move's own
        // direction, or the reversal drops the cell written in the middle.
        tape.apply_single_move(1, Direction::Left);
        tape.apply_single_move(1, Direction::Left);
        tape.apply_single_move(1, Direction::Right);
        // The right half's top block holds the two 1s written while heading
        // left (positions -1 and 0); chain over it.
        let right = tape.half(Direction::Right);
        assert_eq!(right.len(), 2);
        assert_eq!(right[1].symbol, 1);
        assert_eq!(right[1].count, RunCount::Finite(BigInt::from(2)));
        let result = tape.apply_chain_move(0);
        assert!(matches!(result, RunCount::Finite(_)));
        assert!(tape.is_coalesced());
    }

    #[test]
    fn direction_reversal_does_not_drop_a_written_cell() {
        let mut tape: RunLengthTape<BigInt> = RunLengthTape::define(0, Direction::Right);
        tape.apply_single_move(1, Direction::Left);
        tape.apply_single_move(1, Direction::Left);
        tape.apply_single_move(1, Direction::Right);
        // 1s were written at positions 0, -1 and -2; the cell currently
        // under the head (position -1, revisited on the final move right)
        // isn't double-counted, so the persisted total is 2, not 3 or 1 —
        // the two failure modes a wrong-half decrement would produce.
        let total_ones = tape.weighted_sum(|s| if s == 1 { 1 } else { 0 });
        assert_eq!(total_ones, BigInt::from(2));
        assert_eq!(tape.dir(), Direction::Right);
    }

    #[test]
    fn apply_chain_move_on_infinite_block_reports_infinite() {
        let mut tape: RunLengthTape<BigInt> = RunLengthTape::define(0, Direction::Right);
        let result = tape.apply_chain_move(0);
        assert_eq!(result, RunCount::Infinite);
        // No mutation on an infinite chain move.
        assert!(tape.is_coalesced());
    }
}
