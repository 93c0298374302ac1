//! Linear integer constraint model.
//!
//! A small, backend-neutral model: bounded integer variables (booleans
//! are `[0, 1]`), linear range constraints `lb ≤ Σ cᵢ·xᵢ ≤ ub`, a linear
//! objective to minimize, and optional value hints.
//!
//! Solvers consume a `CpModel` through the
//! [`CpSolver`](super::CpSolver) trait.

/// Lower bound standing in for −∞.
pub const NEG_INF: i64 = i64::MIN / 4;
/// Upper bound standing in for +∞.
pub const POS_INF: i64 = i64::MAX / 4;

/// Handle to a model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

/// A bounded integer variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntVar {
    /// Variable name (diagnostics only).
    pub name: String,
    /// Lower bound (inclusive).
    pub lb: i64,
    /// Upper bound (inclusive).
    pub ub: i64,
}

/// `lb ≤ Σ coef·var ≤ ub`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    /// (variable, coefficient) terms.
    pub terms: Vec<(VarId, i64)>,
    /// Lower bound of the sum.
    pub lb: i64,
    /// Upper bound of the sum.
    pub ub: i64,
}

impl LinearConstraint {
    /// `Σ terms ≤ rhs`.
    pub fn le(terms: Vec<(VarId, i64)>, rhs: i64) -> Self {
        Self {
            terms,
            lb: NEG_INF,
            ub: rhs,
        }
    }

    /// `Σ terms ≥ rhs`.
    pub fn ge(terms: Vec<(VarId, i64)>, rhs: i64) -> Self {
        Self {
            terms,
            lb: rhs,
            ub: POS_INF,
        }
    }

    /// `Σ terms = rhs`.
    pub fn eq(terms: Vec<(VarId, i64)>, rhs: i64) -> Self {
        Self {
            terms,
            lb: rhs,
            ub: rhs,
        }
    }

    /// Whether `values` satisfy the constraint.
    pub fn is_satisfied(&self, values: &[i64]) -> bool {
        let sum: i128 = self
            .terms
            .iter()
            .map(|&(v, c)| c as i128 * values[v.0] as i128)
            .sum();
        sum >= self.lb as i128 && sum <= self.ub as i128
    }
}

/// A linear integer minimization model.
///
/// # Example
/// ```
/// use u_roster::cp::{BranchAndBoundSolver, CpModel, CpSolver, SolveStatus, SolverConfig};
///
/// let mut model = CpModel::new("pick-two");
/// let xs: Vec<_> = (0..3).map(|i| model.new_bool_var(format!("x{i}"))).collect();
/// model.add_ge(xs.iter().map(|&x| (x, 1)).collect(), 2);
/// model.minimize(xs.iter().map(|&x| (x, 1)).collect());
///
/// let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
/// assert_eq!(solution.status, SolveStatus::Optimal);
/// assert_eq!(solution.objective, Some(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CpModel {
    /// Model name.
    pub name: String,
    vars: Vec<IntVar>,
    constraints: Vec<LinearConstraint>,
    objective: Vec<(VarId, i64)>,
    hints: Vec<Option<i64>>,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a `[lb, ub]` integer variable.
    pub fn new_int_var(&mut self, name: impl Into<String>, lb: i64, ub: i64) -> VarId {
        self.vars.push(IntVar {
            name: name.into(),
            lb,
            ub,
        });
        self.hints.push(None);
        VarId(self.vars.len() - 1)
    }

    /// Adds a boolean (`[0, 1]`) variable.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> VarId {
        self.new_int_var(name, 0, 1)
    }

    /// Fixes a variable to `value`.
    pub fn fix(&mut self, var: VarId, value: i64) {
        let v = &mut self.vars[var.0];
        v.lb = value;
        v.ub = value;
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    /// Adds `Σ terms ≤ rhs`.
    pub fn add_le(&mut self, terms: Vec<(VarId, i64)>, rhs: i64) {
        self.add_constraint(LinearConstraint::le(terms, rhs));
    }

    /// Adds `Σ terms ≥ rhs`.
    pub fn add_ge(&mut self, terms: Vec<(VarId, i64)>, rhs: i64) {
        self.add_constraint(LinearConstraint::ge(terms, rhs));
    }

    /// Adds `Σ terms = rhs`.
    pub fn add_eq(&mut self, terms: Vec<(VarId, i64)>, rhs: i64) {
        self.add_constraint(LinearConstraint::eq(terms, rhs));
    }

    /// Sets the objective `minimize Σ terms`. Replaces any previous one.
    pub fn minimize(&mut self, terms: Vec<(VarId, i64)>) {
        self.objective = terms;
    }

    /// Suggests a value to try first for `var`.
    pub fn add_hint(&mut self, var: VarId, value: i64) {
        self.hints[var.0] = Some(value);
    }

    /// Variables.
    pub fn vars(&self) -> &[IntVar] {
        &self.vars
    }

    /// Constraints.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Objective terms.
    pub fn objective(&self) -> &[(VarId, i64)] {
        &self.objective
    }

    /// Hint of a variable.
    pub fn hint(&self, var: VarId) -> Option<i64> {
        self.hints[var.0]
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value of a full assignment.
    pub fn objective_value(&self, values: &[i64]) -> i64 {
        self.objective
            .iter()
            .map(|&(v, c)| c * values[v.0])
            .sum()
    }

    /// Whether a full assignment respects every bound and constraint.
    pub fn is_feasible(&self, values: &[i64]) -> bool {
        values.len() == self.vars.len()
            && self
                .vars
                .iter()
                .zip(values)
                .all(|(v, &x)| x >= v.lb && x <= v.ub)
            && self.constraints.iter().all(|c| c.is_satisfied(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_model() {
        let mut m = CpModel::new("m");
        let a = m.new_bool_var("a");
        let b = m.new_int_var("b", 0, 5);
        m.add_le(vec![(a, 1), (b, 1)], 4);
        m.add_eq(vec![(b, 1)], 3);
        m.minimize(vec![(b, 2)]);
        m.add_hint(a, 1);

        assert_eq!(m.var_count(), 2);
        assert_eq!(m.constraint_count(), 2);
        assert_eq!(m.hint(a), Some(1));
        assert_eq!(m.hint(b), None);
        assert_eq!(m.objective_value(&[1, 3]), 6);
        assert!(m.is_feasible(&[1, 3]));
        assert!(!m.is_feasible(&[1, 4]));
        assert!(!m.is_feasible(&[2, 3]));
    }

    #[test]
    fn test_fix() {
        let mut m = CpModel::new("m");
        let a = m.new_bool_var("a");
        m.fix(a, 0);
        assert_eq!((m.vars()[0].lb, m.vars()[0].ub), (0, 0));
    }

    #[test]
    fn test_constraint_forms() {
        let x = VarId(0);
        assert!(LinearConstraint::ge(vec![(x, 2)], 4).is_satisfied(&[2]));
        assert!(!LinearConstraint::ge(vec![(x, 2)], 5).is_satisfied(&[2]));
        assert!(LinearConstraint::le(vec![(x, -1)], -2).is_satisfied(&[3]));
        assert!(LinearConstraint::eq(vec![(x, 1)], 3).is_satisfied(&[3]));
    }
}
