//! Price filtering and the composite final score.

use super::candidate::Candidate;
use crate::{CourseRankError, Result};
use tracing::{debug, warn};

/// Accepted deviation from the budget, as a fraction of it.
pub const PRICE_TOLERANCE: f64 = 0.3;

/// Weight of the semantic score when a budget applies.
pub const SEMANTIC_WEIGHT: f64 = 0.65;

/// Weight of the price fit (`1 - penalty`) when a budget applies.
pub const PRICE_WEIGHT: f64 = 0.35;

/// Filters candidates to a price window around the budget and blends the
/// price penalty into the final score.
///
/// Without a positive budget the final score is the semantic score.
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetPenalizer;

impl BudgetPenalizer {
    pub fn new() -> Self {
        Self
    }

    /// Penalty for `price` against `budget`: the absolute deviation over
    /// `0.3 × budget`, clamped to [0, 1].
    pub fn price_penalty(price: f64, budget: f64) -> f64 {
        let scale = PRICE_TOLERANCE * budget;
        let deviation = if price >= budget {
            price - budget
        } else {
            budget - price
        };
        (deviation / scale).clamp(0.0, 1.0)
    }

    /// Inclusive price window `[0.7 × budget, 1.3 × budget]`.
    pub fn price_window(budget: f64) -> (f64, f64) {
        (
            budget * (1.0 - PRICE_TOLERANCE),
            budget * (1.0 + PRICE_TOLERANCE),
        )
    }

    pub fn apply(&self, mut candidates: Vec<Candidate>, budget: Option<f64>) -> Result<Vec<Candidate>> {
        let budget = match budget {
            Some(b) if !b.is_finite() => {
                warn!(budget = b, "Ignoring non-finite budget");
                None
            }
            Some(b) if b > 0.0 => Some(b),
            _ => None,
        };

        let Some(budget) = budget else {
            for candidate in &mut candidates {
                candidate.price_penalty = None;
                candidate.final_score = candidate.semantic_score;
            }
            return Ok(candidates);
        };

        let (low, high) = Self::price_window(budget);
        let before = candidates.len();
        candidates.retain(|c| c.course.price >= low && c.course.price <= high);

        debug!(budget, low, high, before, kept = candidates.len(), "Budget filter applied");

        if candidates.is_empty() {
            return Err(CourseRankError::NoPriceMatches { budget });
        }

        for candidate in &mut candidates {
            let penalty = Self::price_penalty(candidate.course.price, budget);
            candidate.price_penalty = Some(penalty);
            candidate.final_score =
                SEMANTIC_WEIGHT * candidate.semantic_score + PRICE_WEIGHT * (1.0 - penalty);
        }

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Course, CourseRecord};
    use proptest::prelude::*;
    use std::sync::Arc;

    fn candidate(guid: &str, price: f64, semantic: f64) -> Candidate {
        let course = Course::from_record(CourseRecord {
            guid: guid.to_string(),
            course_name_german: guid.to_string(),
            price_amount: price,
            ..Default::default()
        });
        let mut candidate = Candidate::new(Arc::new(course), 0, 100.0);
        candidate.semantic_score = semantic;
        candidate
    }

    #[test]
    fn test_price_penalty_is_symmetric_and_clamped() {
        assert_eq!(BudgetPenalizer::price_penalty(100.0, 100.0), 0.0);
        assert!((BudgetPenalizer::price_penalty(115.0, 100.0) - 0.5).abs() < 1e-9);
        assert!((BudgetPenalizer::price_penalty(85.0, 100.0) - 0.5).abs() < 1e-9);
        assert_eq!(BudgetPenalizer::price_penalty(130.0, 100.0), 1.0);
        assert_eq!(BudgetPenalizer::price_penalty(500.0, 100.0), 1.0);
    }

    #[test]
    fn test_no_budget_keeps_semantic_score() {
        let candidates = vec![candidate("a", 10.0, 0.8), candidate("b", 9000.0, 0.4)];
        for budget in [None, Some(0.0), Some(-5.0), Some(f64::NAN)] {
            let scored = BudgetPenalizer::new().apply(candidates.clone(), budget).unwrap();
            assert_eq!(scored.len(), 2);
            assert_eq!(scored[0].final_score, 0.8);
            assert_eq!(scored[1].final_score, 0.4);
            assert!(scored.iter().all(|c| c.price_penalty.is_none()));
        }
    }

    #[test]
    fn test_budget_filters_and_blends() {
        let candidates = vec![
            candidate("cheap", 50.0, 0.9),
            candidate("edge-low", 70.0, 0.5),
            candidate("exact", 100.0, 0.5),
            candidate("above", 115.0, 1.0),
            candidate("edge-high", 130.0, 0.5),
            candidate("expensive", 131.0, 1.0),
        ];
        let scored = BudgetPenalizer::new().apply(candidates, Some(100.0)).unwrap();

        let guids: Vec<&str> = scored.iter().map(Candidate::guid).collect();
        assert_eq!(guids, vec!["edge-low", "exact", "above", "edge-high"]);

        assert!((scored[1].final_score - (0.65 * 0.5 + 0.35)).abs() < 1e-9);
        assert!((scored[2].final_score - (0.65 + 0.35 * 0.5)).abs() < 1e-9);
        assert!((scored[3].final_score - 0.65 * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_price_window_fails() {
        let err = BudgetPenalizer::new()
            .apply(vec![candidate("a", 10.0, 1.0)], Some(100.0))
            .unwrap_err();
        assert!(matches!(err, CourseRankError::NoPriceMatches { budget } if budget == 100.0));
    }

    proptest! {
        #[test]
        fn prop_budget_keeps_window_and_unit_scores(
            rows in prop::collection::vec((0.0f64..2000.0, 0.0f64..=1.0), 1..20),
            budget in 1.0f64..1000.0,
        ) {
            let candidates: Vec<Candidate> = rows
                .iter()
                .enumerate()
                .map(|(i, (price, semantic))| candidate(&format!("c{i}"), *price, *semantic))
                .collect();
            let (low, high) = BudgetPenalizer::price_window(budget);
            let in_window = rows.iter().filter(|(p, _)| *p >= low && *p <= high).count();

            match BudgetPenalizer::new().apply(candidates, Some(budget)) {
                Ok(scored) => {
                    prop_assert_eq!(scored.len(), in_window);
                    for c in &scored {
                        prop_assert!(c.course.price >= low && c.course.price <= high);
                        prop_assert!((0.0..=1.0).contains(&c.final_score));
                        let penalty = c.price_penalty.unwrap_or(f64::NAN);
                        prop_assert!((0.0..=1.0).contains(&penalty));
                    }
                }
                Err(err) => {
                    prop_assert_eq!(in_window, 0);
                    let is_no_price = matches!(err, CourseRankError::NoPriceMatches { .. });
                    prop_assert!(is_no_price);
                }
            }
        }
    }
}
