//! Candidate rows flowing through the matching stages.

use crate::catalog::Course;
use std::sync::Arc;

/// A catalog row admitted by the lexical stage, plus the scores later stages
/// attach to it. The underlying [`Course`] is shared, never copied or mutated.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub course: Arc<Course>,

    /// Position of the row in the catalog snapshot
    pub row: usize,

    /// Best fuzzy score that admitted the row (0..=100)
    pub lexical_score: f64,

    /// Semantic similarity in [0, 1]
    pub semantic_score: f64,

    /// Price deviation in [0, 1]; `None` when no budget filter applied
    pub price_penalty: Option<f64>,

    pub final_score: f64,

    /// 1-based position in the user ranking; 0 until ranked
    pub rank: usize,
}

impl Candidate {
    pub fn new(course: Arc<Course>, row: usize, lexical_score: f64) -> Self {
        Self {
            course,
            row,
            lexical_score,
            semantic_score: 0.0,
            price_penalty: None,
            final_score: 0.0,
            rank: 0,
        }
    }

    pub fn guid(&self) -> &str {
        &self.course.guid
    }
}
