//! Binary integer programs and the solver seam.

use thiserror::Error;

/// Relation between a constraint's left-hand side and its bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Geq,
    Leq,
}

/// `Σ coefficient × variable  <comparison>  rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub terms: Vec<(usize, f64)>,
    pub comparison: Comparison,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn new(terms: Vec<(usize, f64)>, comparison: Comparison, rhs: f64) -> Self {
        Self {
            terms,
            comparison,
            rhs,
        }
    }

    /// Whether a 0/1 assignment satisfies this constraint.
    pub fn is_satisfied_by(&self, assignment: &[bool]) -> bool {
        let lhs: f64 = self
            .terms
            .iter()
            .filter(|(var, _)| assignment.get(*var).copied().unwrap_or(false))
            .map(|(_, coefficient)| coefficient)
            .sum();
        match self.comparison {
            Comparison::Eq => (lhs - self.rhs).abs() < 1e-9,
            Comparison::Geq => lhs >= self.rhs - 1e-9,
            Comparison::Leq => lhs <= self.rhs + 1e-9,
        }
    }
}

/// A minimisation problem over named binary variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinaryProgram {
    variables: Vec<String>,
    objective: Vec<(usize, f64)>,
    constraints: Vec<LinearConstraint>,
}

impl BinaryProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable, returning its index.
    pub fn add_variable(&mut self, name: impl Into<String>) -> usize {
        self.variables.push(name.into());
        self.variables.len() - 1
    }

    pub fn add_objective_term(&mut self, variable: usize, coefficient: f64) {
        self.objective.push((variable, coefficient));
    }

    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn objective(&self) -> &[(usize, f64)] {
        &self.objective
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Objective value of a 0/1 assignment.
    pub fn evaluate(&self, assignment: &[bool]) -> f64 {
        self.objective
            .iter()
            .filter(|(var, _)| assignment.get(*var).copied().unwrap_or(false))
            .map(|(_, coefficient)| coefficient)
            .sum()
    }
}

/// Solver failures.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("the program has no feasible assignment")]
    Infeasible,

    #[error("solver backend failed: {0}")]
    Backend(String),
}

/// Solves binary programs to optimality.
#[cfg_attr(test, mockall::automock)]
pub trait ConstraintSolver: Send + Sync {
    /// Optimal assignment, one value per variable in declaration order.
    fn solve(&self, program: &BinaryProgram) -> Result<Vec<bool>, SolverError>;
}
