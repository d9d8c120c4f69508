//! Exact solving through `good_lp` with the pure-Rust `microlp` backend.

use super::program::{BinaryProgram, Comparison, ConstraintSolver, SolverError};
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    microlp, variable,
};
use tracing::trace;

/// Branch-and-bound solver for [`BinaryProgram`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicrolpSolver;

impl MicrolpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl ConstraintSolver for MicrolpSolver {
    fn solve(&self, program: &BinaryProgram) -> Result<Vec<bool>, SolverError> {
        if program.variables().is_empty() {
            return Ok(Vec::new());
        }

        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = program
            .variables()
            .iter()
            .map(|name| vars.add(variable().binary().name(name.clone())))
            .collect();

        let linear = |terms: &[(usize, f64)]| -> Expression {
            terms
                .iter()
                .map(|(var, coefficient)| *coefficient * handles[*var])
                .sum()
        };

        let mut model = vars.minimise(linear(program.objective())).using(microlp);
        for c in program.constraints() {
            let lhs = linear(&c.terms);
            model = model.with(match c.comparison {
                Comparison::Eq => constraint::eq(lhs, c.rhs),
                Comparison::Geq => constraint::geq(lhs, c.rhs),
                Comparison::Leq => constraint::leq(lhs, c.rhs),
            });
        }

        trace!(
            variables = handles.len(),
            constraints = program.constraints().len(),
            "Solving binary program"
        );

        let solution = model.solve().map_err(|e| match e {
            ResolutionError::Infeasible => SolverError::Infeasible,
            other => SolverError::Backend(other.to_string()),
        })?;

        Ok(handles.iter().map(|v| solution.value(*v) > 0.5).collect())
    }
}
