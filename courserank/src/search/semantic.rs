//! Semantic scoring of admitted candidates.
//!
//! Two interchangeable ways to fill the semantic score:
//!
//! - **Encoder**: the query and every candidate's search text are encoded in
//!   one batch; the score is cosine similarity clamped to [0, 1], and rows
//!   below the similarity threshold are dropped.
//! - **Fuzzy proxy**: without an encoder, the score is the token-set ratio of
//!   the query against the course's native name, scaled to [0, 1]. Cheaper
//!   and coarser; no threshold filter is applied.

use super::candidate::Candidate;
use super::fuzzy::FuzzyScorer;
use super::lexical::PreparedQuery;
use crate::ml::{EmbeddingValidator, Encoder, cosine_similarity};
use crate::{CourseRankError, Result};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Which implementation produced the semantic scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticMode {
    Encoder,
    FuzzyProxy,
}

impl fmt::Display for SemanticMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticMode::Encoder => write!(f, "encoder"),
            SemanticMode::FuzzyProxy => write!(f, "fuzzy-proxy"),
        }
    }
}

/// Attaches a semantic score in [0, 1] to each candidate.
pub struct SemanticScorer {
    encoder: Option<Arc<dyn Encoder>>,
    fuzzy: Arc<dyn FuzzyScorer>,
    threshold: Option<f64>,
    validator: EmbeddingValidator,
}

impl SemanticScorer {
    pub fn new(
        encoder: Option<Arc<dyn Encoder>>,
        fuzzy: Arc<dyn FuzzyScorer>,
        threshold: Option<f64>,
    ) -> Self {
        Self {
            encoder,
            fuzzy,
            threshold,
            validator: EmbeddingValidator::new(),
        }
    }

    pub fn mode(&self) -> SemanticMode {
        if self.encoder.is_some() {
            SemanticMode::Encoder
        } else {
            SemanticMode::FuzzyProxy
        }
    }

    pub async fn score(
        &self,
        query: &PreparedQuery,
        candidates: Vec<Candidate>,
    ) -> Result<Vec<Candidate>> {
        if candidates.is_empty() {
            return Ok(candidates);
        }

        match &self.encoder {
            Some(encoder) => self.score_with_encoder(encoder.as_ref(), query, candidates).await,
            None => Ok(self.score_with_proxy(query, candidates)),
        }
    }

    async fn score_with_encoder(
        &self,
        encoder: &dyn Encoder,
        query: &PreparedQuery,
        mut candidates: Vec<Candidate>,
    ) -> Result<Vec<Candidate>> {
        let texts: Vec<String> = std::iter::once(query.text.clone())
            .chain(candidates.iter().map(|c| c.course.search_text.clone()))
            .collect();

        let vectors = encoder.encode(&texts).await?;
        self.validator.validate_batch(&vectors, texts.len())?;

        let (query_vector, row_vectors) = vectors
            .split_first()
            .ok_or_else(|| CourseRankError::Encoder("encoder returned no vectors".to_string()))?;

        for (candidate, vector) in candidates.iter_mut().zip(row_vectors) {
            candidate.semantic_score = cosine_similarity(query_vector, vector).clamp(0.0, 1.0);
        }

        let before = candidates.len();
        if let Some(threshold) = self.threshold {
            candidates.retain(|c| c.semantic_score >= threshold);
            if candidates.is_empty() {
                return Err(CourseRankError::SemanticTooDistant {
                    query: query.original.clone(),
                    threshold,
                });
            }
        }

        debug!(
            mode = %SemanticMode::Encoder,
            scored = before,
            kept = candidates.len(),
            "Semantic stage complete"
        );
        Ok(candidates)
    }

    fn score_with_proxy(&self, query: &PreparedQuery, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        let lowered = query.text.to_lowercase();
        for candidate in &mut candidates {
            let name = candidate.course.name_native.to_lowercase();
            candidate.semantic_score =
                (self.fuzzy.token_set_ratio(&lowered, &name) / 100.0).clamp(0.0, 1.0);
        }

        debug!(
            mode = %SemanticMode::FuzzyProxy,
            scored = candidates.len(),
            "Semantic stage complete"
        );
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Course, CourseRecord};
    use crate::ml::{MLError, MockEncoder};
    use crate::search::fuzzy::IndelFuzzyScorer;

    fn candidate(guid: &str, name: &str, row: usize) -> Candidate {
        let course = Course::from_record(CourseRecord {
            guid: guid.to_string(),
            course_name_german: name.to_string(),
            ..Default::default()
        });
        Candidate::new(Arc::new(course), row, 100.0)
    }

    fn query(text: &str) -> PreparedQuery {
        PreparedQuery {
            original: text.to_string(),
            text: text.to_string(),
            language: "de".to_string(),
            translated: false,
        }
    }

    fn scorer(encoder: Option<MockEncoder>, threshold: Option<f64>) -> SemanticScorer {
        SemanticScorer::new(
            encoder.map(|e| Arc::new(e) as Arc<dyn Encoder>),
            Arc::new(IndelFuzzyScorer::new()),
            threshold,
        )
    }

    #[tokio::test]
    async fn test_encoder_scores_and_filters() {
        let mut encoder = MockEncoder::new();
        encoder.expect_encode().times(1).returning(|texts| {
            assert_eq!(texts.len(), 4);
            Ok(vec![
                vec![1.0, 0.0],
                vec![1.0, 0.0],  // identical
                vec![0.6, 0.8],  // cos = 0.6
                vec![-1.0, 0.0], // opposite, clamped to 0
            ])
        });

        let scorer = scorer(Some(encoder), Some(0.45));
        assert_eq!(scorer.mode(), SemanticMode::Encoder);

        let candidates = vec![
            candidate("a", "Yoga", 0),
            candidate("b", "Pilates", 1),
            candidate("c", "Töpfern", 2),
        ];
        let scored = scorer.score(&query("yoga"), candidates).await.unwrap();

        assert_eq!(scored.len(), 2);
        assert!((scored[0].semantic_score - 1.0).abs() < 1e-9);
        assert!((scored[1].semantic_score - 0.6).abs() < 1e-6);
        assert_eq!(scored[1].guid(), "b");
    }

    #[tokio::test]
    async fn test_scores_stay_in_unit_interval_without_threshold() {
        let mut encoder = MockEncoder::new();
        encoder
            .expect_encode()
            .returning(|_| Ok(vec![vec![1.0, 0.0], vec![-1.0, 0.0]]));

        let scored = scorer(Some(encoder), None)
            .score(&query("yoga"), vec![candidate("a", "Yoga", 0)])
            .await
            .unwrap();
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].semantic_score, 0.0);
    }

    #[tokio::test]
    async fn test_everything_below_threshold_is_too_distant() {
        let mut encoder = MockEncoder::new();
        encoder
            .expect_encode()
            .returning(|_| Ok(vec![vec![1.0, 0.0], vec![0.0, 1.0]]));

        let err = scorer(Some(encoder), Some(0.45))
            .score(&query("yoga"), vec![candidate("a", "Yoga", 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, CourseRankError::SemanticTooDistant { threshold, .. } if threshold == 0.45));
    }

    #[tokio::test]
    async fn test_encoder_failures_surface() {
        let mut encoder = MockEncoder::new();
        encoder
            .expect_encode()
            .returning(|_| Err(MLError::request("connection refused")));
        let err = scorer(Some(encoder), None)
            .score(&query("yoga"), vec![candidate("a", "Yoga", 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, CourseRankError::Encoder(_)));

        let mut short = MockEncoder::new();
        short.expect_encode().returning(|_| Ok(vec![vec![1.0, 0.0]]));
        let err = scorer(Some(short), None)
            .score(&query("yoga"), vec![candidate("a", "Yoga", 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, CourseRankError::Encoder(_)));
    }

    #[tokio::test]
    async fn test_fuzzy_proxy_scores_native_name() {
        let scorer = scorer(None, Some(0.45));
        assert_eq!(scorer.mode(), SemanticMode::FuzzyProxy);

        let candidates = vec![
            candidate("a", "Hatha Yoga für Anfänger", 0),
            candidate("b", "Abendkurs", 1),
        ];
        let scored = scorer.score(&query("Yoga"), candidates).await.unwrap();

        // No threshold filter in proxy mode
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].semantic_score, 1.0);
        assert!(scored[1].semantic_score < 0.45);
    }
}
