//! Consensus rank aggregation.
//!
//! Combines the user ranking and the platform ranking of one candidate set
//! into a single total order minimising weighted pairwise disagreement
//! (weighted Kemeny-Young).
//!
//! The exact strategy states the problem as a binary program over ordered
//! pairs, `x[i][j] = 1` meaning "i precedes j":
//!
//! ```text
//! minimise    Σ margin(i, j) · x[j][i]
//! subject to  x[i][j] + x[j][i]           = 1   for every ordered pair
//!             x[i][j] + x[j][k] + x[k][i] ≥ 1   for every ordered triple
//! ```
//!
//! The triple constraints grow as O(n³), so [`AggregationStrategy::Auto`]
//! switches to a greedy net-margin ordering above the configured limit.

pub mod greedy;
pub mod margins;
pub mod program;
pub mod solver;

pub use greedy::greedy_order;
pub use margins::PreferenceMargins;
pub use program::{BinaryProgram, Comparison, ConstraintSolver, LinearConstraint, SolverError};
pub use solver::MicrolpSolver;

use crate::config::{AggregationStrategy, ConsensusConfig};
use crate::{CourseRankError, Result};
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of one aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusOutcome {
    /// Guids in consensus order
    pub order: Vec<String>,

    /// Strategy that produced the order (never `Auto`)
    pub strategy: AggregationStrategy,

    /// Total margin weight the order reverses
    pub cost: f64,
}

/// Aggregates two rankings of the same guid set.
pub struct ConsensusAggregator {
    solver: Arc<dyn ConstraintSolver>,
    strategy: AggregationStrategy,
    exact_limit: usize,
}

impl ConsensusAggregator {
    pub fn new(solver: Arc<dyn ConstraintSolver>, config: &ConsensusConfig) -> Self {
        Self {
            solver,
            strategy: config.strategy,
            exact_limit: config.exact_limit,
        }
    }

    pub fn strategy(&self) -> AggregationStrategy {
        self.strategy
    }

    /// Aggregate `user` and `platform`, which must be permutations of the
    /// same guid set.
    pub fn aggregate(&self, user: &[String], platform: &[String]) -> Result<ConsensusOutcome> {
        let platform_positions = Self::check_membership(user, platform)?;
        let n = user.len();

        if n <= 1 {
            return Ok(ConsensusOutcome {
                order: user.to_vec(),
                strategy: self.resolve_strategy(n),
                cost: 0.0,
            });
        }

        let user_positions: Vec<usize> = (0..n).collect();
        let margins = PreferenceMargins::from_positions(&user_positions, &platform_positions);

        let strategy = self.resolve_strategy(n);
        let order = match strategy {
            AggregationStrategy::Greedy => greedy_order(&margins),
            _ => self.solve_exact(&margins)?,
        };
        let cost = margins.disagreement(&order);

        debug!(candidates = n, strategy = %strategy, cost, "Consensus order computed");

        Ok(ConsensusOutcome {
            order: order.into_iter().map(|i| user[i].clone()).collect(),
            strategy,
            cost,
        })
    }

    /// Kemeny-Young binary program for `margins`.
    ///
    /// Variables are declared row-major over ordered pairs, so `x[i][j]` is
    /// variable [`pair_variable`]`(n, i, j)`. Constraints are emitted for every
    /// ordered pair and triple, so each antisymmetry constraint appears twice.
    pub fn build_program(margins: &PreferenceMargins) -> BinaryProgram {
        let n = margins.len();
        let mut program = BinaryProgram::new();

        for (i, j) in (0..n).cartesian_product(0..n).filter(|(i, j)| i != j) {
            program.add_variable(format!("x_{}_{}", i, j));
        }

        for (i, j, weight) in margins.iter() {
            program.add_objective_term(pair_variable(n, j, i), weight);
        }

        for pair in (0..n).permutations(2) {
            let (i, j) = (pair[0], pair[1]);
            program.add_constraint(LinearConstraint::new(
                vec![(pair_variable(n, i, j), 1.0), (pair_variable(n, j, i), 1.0)],
                Comparison::Eq,
                1.0,
            ));
        }

        for triple in (0..n).permutations(3) {
            let (i, j, k) = (triple[0], triple[1], triple[2]);
            program.add_constraint(LinearConstraint::new(
                vec![
                    (pair_variable(n, i, j), 1.0),
                    (pair_variable(n, j, k), 1.0),
                    (pair_variable(n, k, i), 1.0),
                ],
                Comparison::Geq,
                1.0,
            ));
        }

        program
    }

    fn solve_exact(&self, margins: &PreferenceMargins) -> Result<Vec<usize>> {
        let n = margins.len();
        let program = Self::build_program(margins);
        let assignment = self.solver.solve(&program)?;

        if assignment.len() != program.variables().len() {
            return Err(CourseRankError::Solver(format!(
                "solver returned {} values for {} variables",
                assignment.len(),
                program.variables().len()
            )));
        }
        if !program.constraints().iter().all(|c| c.is_satisfied_by(&assignment)) {
            return Err(CourseRankError::Solver(
                "solver returned an assignment violating the ordering constraints".to_string(),
            ));
        }

        // Rank by the number of candidates each one precedes
        let wins: Vec<usize> = (0..n)
            .map(|c| {
                (0..n)
                    .filter(|&d| d != c && assignment[pair_variable(n, c, d)])
                    .count()
            })
            .collect();

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|a, b| wins[*b].cmp(&wins[*a]));
        Ok(order)
    }

    fn resolve_strategy(&self, n: usize) -> AggregationStrategy {
        match self.strategy {
            AggregationStrategy::Auto if n > self.exact_limit => {
                warn!(
                    candidates = n,
                    exact_limit = self.exact_limit,
                    "Candidate set exceeds the exact limit; using greedy aggregation"
                );
                AggregationStrategy::Greedy
            }
            AggregationStrategy::Auto => AggregationStrategy::Exact,
            other => other,
        }
    }

    /// Positions of the user's candidates in the platform ranking, or
    /// `MismatchedCandidateSets` when the two are not permutations of one set.
    fn check_membership(user: &[String], platform: &[String]) -> Result<Vec<usize>> {
        if user.len() != platform.len() {
            return Err(CourseRankError::MismatchedCandidateSets(format!(
                "user ranking has {} guids, platform ranking has {}",
                user.len(),
                platform.len()
            )));
        }

        let mut user_index: HashMap<&str, usize> = HashMap::with_capacity(user.len());
        for (i, guid) in user.iter().enumerate() {
            if user_index.insert(guid.as_str(), i).is_some() {
                return Err(CourseRankError::MismatchedCandidateSets(format!(
                    "guid '{}' appears twice in the user ranking",
                    guid
                )));
            }
        }

        let mut positions: Vec<Option<usize>> = vec![None; user.len()];
        for (pos, guid) in platform.iter().enumerate() {
            let Some(&i) = user_index.get(guid.as_str()) else {
                return Err(CourseRankError::MismatchedCandidateSets(format!(
                    "guid '{}' is only in the platform ranking",
                    guid
                )));
            };
            if positions[i].replace(pos).is_some() {
                return Err(CourseRankError::MismatchedCandidateSets(format!(
                    "guid '{}' appears twice in the platform ranking",
                    guid
                )));
            }
        }

        // Equal lengths, no duplicates and no strangers leave every slot filled
        Ok(positions.into_iter().flatten().collect())
    }
}

/// Index of `x[i][j]` among the `n × (n - 1)` pair variables.
pub fn pair_variable(n: usize, i: usize, j: usize) -> usize {
    i * (n - 1) + if j > i { j - 1 } else { j }
}
