//! Top-N selection of scored candidates (the user ranking).

use super::candidate::Candidate;
use tracing::debug;

/// Sorts candidates by final score and keeps the best `top_n`.
#[derive(Debug, Clone, Copy)]
pub struct CandidateRanker {
    top_n: usize,
}

impl CandidateRanker {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Stable descending sort by final score, truncated to `top_n`, with
    /// 1-based ranks assigned. Equal scores keep their catalog order.
    pub fn rank(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
        candidates.truncate(self.top_n);

        for (i, candidate) in candidates.iter_mut().enumerate() {
            candidate.rank = i + 1;
        }

        debug!(top_n = self.top_n, ranked = candidates.len(), "User ranking built");
        candidates
    }
}
