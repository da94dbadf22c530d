//! Symbolic linear combinations used as run-length counts on a symbolic
//! `RunLengthTape<Expression>` (see `run_length_tape.rs`) while the
//! ProofSystem builds and verifies candidate rules.
//!
//! Grounded on `original_source/FastSim/Expression.h`/`.cpp`. That source
//! keeps a single process-wide `VARIABLE` counter (`g_num_variables`); per
//! SPEC_FULL.md §9's resolution of the "Expression variables as globals"
//! design note, this rewrite scopes the counter to a `VariablePool` owned by
//! one `ProofSystem` (and a fresh nested pool per `compare()` call), so
//! multi-worker runs stay deterministic.

use std::collections::BTreeMap;
use std::fmt::Display;

use num_bigint::BigInt;

/// Identifies one free variable within the `VariablePool` that minted it.
/// Not meaningfully comparable across pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(pub usize);

/// Mints fresh, never-recycled variable identifiers. One pool per
/// `ProofSystem` instance (`proof_system.rs`).
#[derive(Debug, Default)]
pub struct VariablePool {
    next: usize,
}

impl VariablePool {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn fresh(&mut self) -> Variable {
        let v = Variable(self.next);
        self.next += 1;
        v
    }
}

/// `c0 + sum(ci * vi)` with integer coefficients and a big-integer constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    constant: BigInt,
    // Variables with a zero coefficient are never stored.
    coefficients: BTreeMap<Variable, i64>,
}

impl Expression {
    pub fn constant(value: impl Into<BigInt>) -> Self {
        Self {
            constant: value.into(),
            coefficients: BTreeMap::new(),
        }
    }

    pub fn zero() -> Self {
        Self::constant(0)
    }

    pub fn from_variable(var: Variable) -> Self {
        let mut coefficients = BTreeMap::new();
        coefficients.insert(var, 1);
        Self {
            constant: BigInt::from(0),
            coefficients,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn as_constant(&self) -> Option<&BigInt> {
        self.is_constant().then_some(&self.constant)
    }

    pub fn coefficient(&self, var: Variable) -> i64 {
        self.coefficients.get(&var).copied().unwrap_or(0)
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.coefficients.keys().copied()
    }

    /// If this expression is exactly `1 * v` for some single variable `v`
    /// with no constant term, returns `v`. Mirrors the original's
    /// `get_var()`, used when a rule's precondition expects a bare count
    /// variable rather than a general affine combination.
    pub fn as_bare_variable(&self) -> Option<Variable> {
        if self.constant == BigInt::from(0) && self.coefficients.len() == 1 {
            let (&var, &coef) = self.coefficients.iter().next().unwrap();
            if coef == 1 {
                return Some(var);
            }
        }
        None
    }

    pub fn add(&self, other: &Expression) -> Expression {
        let mut coefficients = self.coefficients.clone();
        for (&var, &coef) in &other.coefficients {
            let entry = coefficients.entry(var).or_insert(0);
            *entry += coef;
            if *entry == 0 {
                coefficients.remove(&var);
            }
        }
        Expression {
            constant: &self.constant + &other.constant,
            coefficients,
        }
    }

    pub fn add_int(&self, n: impl Into<BigInt>) -> Expression {
        Expression {
            constant: &self.constant + n.into(),
            coefficients: self.coefficients.clone(),
        }
    }

    pub fn sub(&self, other: &Expression) -> Expression {
        self.add(&other.scale(-1))
    }

    pub fn scale(&self, factor: i64) -> Expression {
        let mut coefficients = BTreeMap::new();
        for (&var, &coef) in &self.coefficients {
            let scaled = coef * factor;
            if scaled != 0 {
                coefficients.insert(var, scaled);
            }
        }
        Expression {
            constant: &self.constant * factor,
            coefficients,
        }
    }

    /// Substitutes concrete big-integer values for each variable.
    pub fn eval(&self, assignment: &BTreeMap<Variable, BigInt>) -> BigInt {
        let mut total = self.constant.clone();
        for (&var, &coef) in &self.coefficients {
            let value = assignment
                .get(&var)
                .expect("assignment must cover every free variable");
            total += value * coef;
        }
        total
    }

    /// Evaluates `factor * self` under `assignment` directly in `BigInt`,
    /// without materializing a scaled `Expression`. Used by
    /// `ProofSystem::applies` (`proof_system.rs`) to compute `m * diff_tape`
    /// and `m * diff_steps` for a possibly huge multiple `m`: coefficients
    /// stay small integers by construction (SPEC_FULL.md §9), only the
    /// final product needs arbitrary precision.
    pub fn eval_scaled(&self, factor: &BigInt, assignment: &BTreeMap<Variable, BigInt>) -> BigInt {
        self.eval(assignment) * factor
    }
}

fn repr_variable(var: Variable) -> char {
    (b'A' + (var.0 % 60) as u8) as char
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut wrote_any = false;
        for (&var, &coef) in &self.coefficients {
            if wrote_any {
                write!(f, " + ")?;
            }
            if coef == 1 {
                write!(f, "{}", repr_variable(var))?;
            } else {
                write!(f, "{}*{}", coef, repr_variable(var))?;
            }
            wrote_any = true;
        }
        if !wrote_any || self.constant != BigInt::from(0) {
            if wrote_any {
                write!(f, " + ")?;
            }
            write!(f, "{}", self.constant)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_eval() {
        let mut pool = VariablePool::new();
        let v0 = pool.fresh();
        let v1 = pool.fresh();
        let e = Expression::from_variable(v0)
            .add(&Expression::from_variable(v1).scale(2))
            .add_int(3);
        let mut assignment = BTreeMap::new();
        assignment.insert(v0, BigInt::from(5));
        assignment.insert(v1, BigInt::from(7));
        assert_eq!(e.eval(&assignment), BigInt::from(5 + 2 * 7 + 3));
    }

    #[test]
    fn bare_variable_detection() {
        let mut pool = VariablePool::new();
        let v0 = pool.fresh();
        assert_eq!(Expression::from_variable(v0).as_bare_variable(), Some(v0));
        assert_eq!(Expression::constant(4).as_bare_variable(), None);
        assert_eq!(
            Expression::from_variable(v0).scale(2).as_bare_variable(),
            None
        );
    }

    #[test]
    fn variables_never_recycled() {
        let mut pool = VariablePool::new();
        let v0 = pool.fresh();
        let v1 = pool.fresh();
        assert_ne!(v0, v1);
        assert_eq!(v0.0, 0);
        assert_eq!(v1.0, 1);
    }
}
