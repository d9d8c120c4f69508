//! The end-to-end matching pipeline.
//!
//! [`CourseMatcher`] wires the stages together:
//!
//! ```text
//! query ─► LexicalMatcher ─► SemanticScorer ─► BudgetPenalizer ─► CandidateRanker ─┐
//!                                                                   user ranking  │
//!                                          PreferenceRanker ◄──────────────────────┤
//!                                          platform ranking                        │
//!                                                 └──────► ConsensusAggregator ◄───┘
//! ```
//!
//! Every stage either narrows the candidate set or fails with a named error;
//! an empty result is never returned in place of an error.

use crate::catalog::{Catalog, CatalogHandle, Course, load_catalog};
use crate::config::{AggregationStrategy, CourseRankConfig};
use crate::consensus::{ConsensusAggregator, ConstraintSolver, MicrolpSolver};
use crate::ml::{
    Encoder, LanguageDetector, RemoteEncoder, RemoteTranslator, Translator, WhatlangDetector,
};
use crate::platform::{PlatformPreferences, PlatformScore, PreferenceRanker};
use crate::search::{
    BudgetPenalizer, Candidate, CandidateRanker, FuzzyScorer, IndelFuzzyScorer, LexicalMatcher,
    SemanticMode, SemanticScorer, validate_query,
};
use crate::{CourseRankError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span};
use tracing_appender::non_blocking::WorkerGuard;

/// One caller request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub query: String,

    /// Target price; absent or non-positive disables the price filter
    #[serde(default)]
    pub budget: Option<f64>,

    #[serde(default)]
    pub gender: Option<String>,

    /// Public-facing target group labels
    #[serde(default)]
    pub target_groups: Option<Vec<String>>,
}

impl MatchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_target_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_groups = Some(groups.into_iter().map(Into::into).collect());
        self
    }
}

/// A course in the final consensus order, with the scores behind it.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCourse {
    pub course: Arc<Course>,

    /// 1-based position in the consensus order
    pub consensus_rank: usize,

    /// 1-based position in the query-relevance ranking
    pub user_rank: usize,

    /// 1-based position in the platform ranking
    pub platform_rank: usize,

    pub lexical_score: f64,
    pub semantic_score: f64,
    pub price_penalty: Option<f64>,
    pub final_score: f64,
    pub platform_score: f64,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub query: String,

    /// Query text actually matched (translated when needed)
    pub matched_text: String,
    pub language: String,
    pub translated: bool,
    pub semantic_mode: String,
    pub strategy: AggregationStrategy,

    /// Pairwise disagreement left in the consensus order
    pub consensus_cost: f64,
    pub courses: Vec<RankedCourse>,
}

/// Matches queries against the current catalog snapshot and ranks the result.
pub struct CourseMatcher {
    catalog: CatalogHandle,
    lexical: LexicalMatcher,
    semantic: SemanticScorer,
    budget: BudgetPenalizer,
    ranker: CandidateRanker,
    platform: PreferenceRanker,
    consensus: ConsensusAggregator,
    _log_guard: Option<Arc<WorkerGuard>>,
}

impl CourseMatcher {
    pub fn builder(config: CourseRankConfig) -> CourseMatcherBuilder {
        CourseMatcherBuilder::new(config)
    }

    /// The reloadable catalog this matcher reads from.
    pub fn catalog(&self) -> &CatalogHandle {
        &self.catalog
    }

    pub fn semantic_mode(&self) -> SemanticMode {
        self.semantic.mode()
    }

    /// Match and rank, returning courses in consensus order.
    pub async fn match_and_rank(&self, request: &MatchRequest) -> Result<Vec<RankedCourse>> {
        Ok(self.run(request).await?.courses)
    }

    /// Match and rank, returning the full report.
    pub async fn run(&self, request: &MatchRequest) -> Result<MatchReport> {
        let span = info_span!(
            "match_and_rank",
            query = %request.query,
            budget = ?request.budget,
        );
        self.run_inner(request).instrument(span).await
    }

    async fn run_inner(&self, request: &MatchRequest) -> Result<MatchReport> {
        // Caller input is checked before any external service is called
        validate_query(&request.query)?;
        let preferences = PlatformPreferences::new(
            request.gender.as_deref(),
            request.target_groups.as_deref(),
        )?;

        let snapshot = self.catalog.snapshot();
        let query = self.lexical.prepare_query(&request.query).await?;

        let admitted = self.lexical.admit(&query, &snapshot)?;
        let scored = self.semantic.score(&query, admitted).await?;
        let budgeted = self.budget.apply(scored, request.budget)?;
        let ranked = self.ranker.rank(budgeted);

        let platform = self.platform.rank(&ranked, &preferences, &snapshot);

        let user_order: Vec<String> = ranked.iter().map(|c| c.guid().to_string()).collect();
        let platform_order: Vec<String> = platform.iter().map(|s| s.guid.clone()).collect();
        let outcome = self.consensus.aggregate(&user_order, &platform_order)?;

        let courses = Self::assemble(&outcome.order, ranked, platform)?;

        info!(
            results = courses.len(),
            strategy = %outcome.strategy,
            cost = outcome.cost,
            "Request ranked"
        );

        Ok(MatchReport {
            query: query.original.clone(),
            matched_text: query.text.clone(),
            language: query.language.clone(),
            translated: query.translated,
            semantic_mode: self.semantic.mode().to_string(),
            strategy: outcome.strategy,
            consensus_cost: outcome.cost,
            courses,
        })
    }

    fn assemble(
        order: &[String],
        ranked: Vec<Candidate>,
        platform: Vec<PlatformScore>,
    ) -> Result<Vec<RankedCourse>> {
        let mut candidates: HashMap<String, Candidate> = ranked
            .into_iter()
            .map(|c| (c.guid().to_string(), c))
            .collect();
        let mut platform: HashMap<String, PlatformScore> =
            platform.into_iter().map(|s| (s.guid.clone(), s)).collect();

        order
            .iter()
            .enumerate()
            .map(|(i, guid)| {
                let (Some(candidate), Some(score)) = (candidates.remove(guid), platform.remove(guid))
                else {
                    return Err(CourseRankError::MismatchedCandidateSets(format!(
                        "consensus order names unknown guid '{}'",
                        guid
                    )));
                };
                Ok(RankedCourse {
                    course: candidate.course,
                    consensus_rank: i + 1,
                    user_rank: candidate.rank,
                    platform_rank: score.platform_rank,
                    lexical_score: candidate.lexical_score,
                    semantic_score: candidate.semantic_score,
                    price_penalty: candidate.price_penalty,
                    final_score: candidate.final_score,
                    platform_score: score.platform_score,
                })
            })
            .collect()
    }
}

/// Builder for [`CourseMatcher`].
///
/// Capabilities left unset fall back to local defaults: `whatlang` language
/// detection, the indel fuzzy scorer, the `microlp` solver and the fuzzy
/// proxy semantic score (no encoder). No translator means queries are matched
/// untranslated.
pub struct CourseMatcherBuilder {
    config: CourseRankConfig,
    catalog: Option<CatalogHandle>,
    encoder: Option<Arc<dyn Encoder>>,
    translator: Option<Arc<dyn Translator>>,
    detector: Option<Arc<dyn LanguageDetector>>,
    fuzzy: Option<Arc<dyn FuzzyScorer>>,
    solver: Option<Arc<dyn ConstraintSolver>>,
    log_guard: Option<Arc<WorkerGuard>>,
}

impl CourseMatcherBuilder {
    pub fn new(config: CourseRankConfig) -> Self {
        Self {
            config,
            catalog: None,
            encoder: None,
            translator: None,
            detector: None,
            fuzzy: None,
            solver: None,
            log_guard: None,
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(CatalogHandle::new(catalog));
        self
    }

    /// Share a handle so snapshots can be swapped from elsewhere.
    pub fn with_catalog_handle(mut self, handle: CatalogHandle) -> Self {
        self.catalog = Some(handle);
        self
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn with_language_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_fuzzy_scorer(mut self, fuzzy: Arc<dyn FuzzyScorer>) -> Self {
        self.fuzzy = Some(fuzzy);
        self
    }

    pub fn with_solver(mut self, solver: Arc<dyn ConstraintSolver>) -> Self {
        self.solver = Some(solver);
        self
    }

    /// Keep a file logging guard alive for as long as the matcher lives.
    pub fn with_log_guard(mut self, guard: WorkerGuard) -> Self {
        self.log_guard = Some(Arc::new(guard));
        self
    }

    /// Create the remote encoder and translator named in the configuration,
    /// unless one was already set explicitly.
    pub fn with_remote_services(mut self) -> Result<Self> {
        if self.encoder.is_none() && self.config.embedding.service_url.is_some() {
            let encoder = RemoteEncoder::new(&self.config.embedding)
                .map_err(|e| CourseRankError::Configuration(e.to_string()))?;
            debug!(model = %self.config.embedding.model_name, "Remote encoder configured");
            self.encoder = Some(Arc::new(encoder));
        }
        if self.translator.is_none() && self.config.translation.service_url.is_some() {
            let translator = RemoteTranslator::new(&self.config.translation)
                .map_err(|e| CourseRankError::Configuration(e.to_string()))?;
            self.translator = Some(Arc::new(translator));
            debug!("Remote translator configured");
        }
        Ok(self)
    }

    pub fn build(self) -> Result<CourseMatcher> {
        crate::config::validation::validate_config(&self.config)?;

        let catalog = match (self.catalog, &self.config.catalog.path) {
            (Some(handle), _) => handle,
            (None, Some(path)) => {
                let catalog = load_catalog(path)?;
                info!(courses = catalog.len(), path = %path.display(), "Catalog snapshot loaded");
                CatalogHandle::new(catalog)
            }
            (None, None) => {
                return Err(CourseRankError::Configuration(
                    "No catalog configured. Set catalog.path or pass a catalog to the builder"
                        .to_string(),
                ));
            }
        };

        let config = &self.config;
        let fuzzy = self
            .fuzzy
            .unwrap_or_else(|| Arc::new(IndelFuzzyScorer::new()) as Arc<dyn FuzzyScorer>);
        let detector: Arc<dyn LanguageDetector> = match self.detector {
            Some(detector) => detector,
            None => Arc::new(
                WhatlangDetector::for_languages(
                    &config.catalog.primary_language,
                    &config.catalog.detection_languages,
                )
                .map_err(|e| {
                    CourseRankError::Configuration(format!("catalog.detection_languages: {e}"))
                })?,
            ),
        };
        let solver = self
            .solver
            .unwrap_or_else(|| Arc::new(MicrolpSolver::new()) as Arc<dyn ConstraintSolver>);

        Ok(CourseMatcher {
            catalog,
            lexical: LexicalMatcher::new(config, Arc::clone(&fuzzy), detector, self.translator),
            semantic: SemanticScorer::new(
                self.encoder,
                fuzzy,
                config.semantic.similarity_threshold,
            ),
            budget: BudgetPenalizer::new(),
            ranker: CandidateRanker::new(config.ranking.top_n),
            platform: PreferenceRanker::new(&config.platform),
            consensus: ConsensusAggregator::new(solver, &config.consensus),
            _log_guard: self.log_guard,
        })
    }
}

impl std::fmt::Debug for CourseMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourseMatcher")
            .field("courses", &self.catalog.snapshot().len())
            .field("semantic_mode", &self.semantic.mode())
            .field("strategy", &self.consensus.strategy())
            .field("top_n", &self.ranker.top_n())
            .finish()
    }
}
