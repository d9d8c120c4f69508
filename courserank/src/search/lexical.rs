//! Lexical admission: query validation, translation and fuzzy matching.

use super::candidate::Candidate;
use super::fuzzy::FuzzyScorer;
use crate::catalog::Catalog;
use crate::config::CourseRankConfig;
use crate::ml::{LanguageDetector, Translator};
use crate::{CourseRankError, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// A validated query in the catalog's primary language.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    /// The query as the caller typed it, trimmed
    pub original: String,

    /// The text that is matched against the catalog
    pub text: String,

    /// Detected language (the primary language when detection failed)
    pub language: String,

    /// Whether `text` came back from the translator
    pub translated: bool,
}

/// Trimmed query text, or `InvalidQuery` when nothing is left.
pub fn validate_query(raw: &str) -> Result<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CourseRankError::InvalidQuery(
            "query is empty after trimming whitespace".to_string(),
        ));
    }
    Ok(trimmed)
}

/// Admits catalog rows whose searchable fields fuzzily match the query.
///
/// Multi-token queries use `partial_ratio` per token against the higher
/// threshold; single-token queries use the looser `token_set_ratio`. A row is
/// admitted when any field matches any token.
pub struct LexicalMatcher {
    fuzzy: Arc<dyn FuzzyScorer>,
    detector: Arc<dyn LanguageDetector>,
    translator: Option<Arc<dyn Translator>>,
    primary_language: String,
    partial_threshold: f64,
    token_set_threshold: f64,
}

impl LexicalMatcher {
    pub fn new(
        config: &CourseRankConfig,
        fuzzy: Arc<dyn FuzzyScorer>,
        detector: Arc<dyn LanguageDetector>,
        translator: Option<Arc<dyn Translator>>,
    ) -> Self {
        Self {
            fuzzy,
            detector,
            translator,
            primary_language: config.catalog.primary_language.clone(),
            partial_threshold: f64::from(config.matching.partial_threshold),
            token_set_threshold: f64::from(config.matching.token_set_threshold),
        }
    }

    /// Validate the query and bring it into the catalog's primary language.
    ///
    /// Detection failure counts as the primary language. The translator is
    /// called at most once and its failure is not retried.
    pub async fn prepare_query(&self, raw: &str) -> Result<PreparedQuery> {
        let original = validate_query(raw)?;

        let language = match self.detector.detect(original) {
            Some(language) => language,
            None => {
                warn!(
                    primary_language = %self.primary_language,
                    "Language detection failed; assuming the primary language"
                );
                self.primary_language.clone()
            }
        };

        let mut prepared = PreparedQuery {
            original: original.to_string(),
            text: original.to_string(),
            language,
            translated: false,
        };

        if prepared.language == self.primary_language {
            return Ok(prepared);
        }

        let Some(translator) = &self.translator else {
            warn!(
                language = %prepared.language,
                "No translator configured; matching the untranslated query"
            );
            return Ok(prepared);
        };

        let translated = translator
            .translate(original, &prepared.language, &self.primary_language)
            .await
            .map_err(|e| CourseRankError::TranslationFailed {
                source_language: prepared.language.clone(),
                target_language: self.primary_language.clone(),
                reason: e.to_string(),
            })?;

        let translated = translated.trim();
        if translated.is_empty() {
            return Err(CourseRankError::TranslationFailed {
                source_language: prepared.language.clone(),
                target_language: self.primary_language.clone(),
                reason: "translator returned an empty text".to_string(),
            });
        }

        debug!(from = %prepared.language, translated = %translated, "Query translated");
        prepared.text = translated.to_string();
        prepared.translated = true;
        Ok(prepared)
    }

    /// Admit rows of `catalog` matching the prepared query, in catalog order.
    pub fn admit(&self, query: &PreparedQuery, catalog: &Catalog) -> Result<Vec<Candidate>> {
        let lowered = query.text.to_lowercase();
        let tokens: Vec<&str> = lowered.split_whitespace().collect();
        let use_partial = tokens.len() > 1;
        let threshold = if use_partial {
            self.partial_threshold
        } else {
            self.token_set_threshold
        };

        let admitted: Vec<Candidate> = catalog
            .courses()
            .iter()
            .enumerate()
            .filter_map(|(row, course)| {
                let best = course
                    .searchable_fields()
                    .map(str::to_lowercase)
                    .flat_map(|field| {
                        tokens
                            .iter()
                            .map(|token| self.score(token, &field, use_partial))
                            .collect::<Vec<_>>()
                    })
                    .fold(0.0, f64::max);

                (best >= threshold).then(|| Candidate::new(Arc::clone(course), row, best))
            })
            .collect();

        debug!(
            tokens = tokens.len(),
            partial = use_partial,
            admitted = admitted.len(),
            catalog = catalog.len(),
            "Lexical stage complete"
        );

        if admitted.is_empty() {
            return Err(CourseRankError::NoMatches {
                query: query.original.clone(),
            });
        }

        Ok(admitted)
    }

    /// Prepare the query and admit matching rows.
    pub async fn run(&self, raw: &str, catalog: &Catalog) -> Result<(PreparedQuery, Vec<Candidate>)> {
        let query = self.prepare_query(raw).await?;
        let admitted = self.admit(&query, catalog)?;
        Ok((query, admitted))
    }

    fn score(&self, token: &str, field: &str, use_partial: bool) -> f64 {
        if use_partial {
            self.fuzzy.partial_ratio(token, field)
        } else {
            self.fuzzy.token_set_ratio(token, field)
        }
    }
}
