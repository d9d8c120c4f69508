//! Command argument structures

use clap::Args;
use courserank::config::{AggregationStrategy, CourseRankConfig};
use courserank::pipeline::MatchRequest;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct MatchArgs {
    /// Free-text search query, in any language
    pub query: String,

    /// Catalog snapshot file (JSON); falls back to catalog.path from the configuration
    #[arg(long, short)]
    pub catalog: Option<PathBuf>,

    /// Target price; courses outside 70%..130% of it are dropped
    #[arg(long, short)]
    pub budget: Option<f64>,

    /// Caller gender (female, male, ...)
    #[arg(long, short)]
    pub gender: String,

    /// Target group label to boost (repeatable, see `target-groups`)
    #[arg(long = "target-group", short = 't')]
    pub target_groups: Vec<String>,

    /// Number of courses kept after relevance ranking
    #[arg(long, short = 'n')]
    pub top_n: Option<usize>,

    /// Aggregation strategy (auto, exact, greedy)
    #[arg(long, short)]
    pub strategy: Option<AggregationStrategy>,
}

impl MatchArgs {
    /// Apply the command-line overrides on top of the loaded configuration.
    pub fn apply_to(&self, config: &mut CourseRankConfig) {
        if let Some(path) = &self.catalog {
            config.catalog.path = Some(path.clone());
        }
        if let Some(top_n) = self.top_n {
            config.ranking.top_n = top_n;
        }
        if let Some(strategy) = self.strategy {
            config.consensus.strategy = strategy;
        }
    }

    pub fn to_request(&self) -> MatchRequest {
        let mut request = MatchRequest::new(self.query.clone())
            .with_gender(self.gender.clone())
            .with_target_groups(self.target_groups.iter().cloned());
        request.budget = self.budget;
        request
    }
}
