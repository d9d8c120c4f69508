//! # Courserank
//!
//! Course matching for a course catalog: a free-text query is matched
//! fuzzily and semantically, filtered by budget, and the resulting ranking is
//! reconciled with a platform-side preference ranking through weighted
//! Kemeny-Young consensus aggregation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courserank::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ConfigBuilder::new()
//!         .with_catalog_path("catalog.json")
//!         .build()?;
//!
//!     let matcher = courserank::init(config).await?;
//!
//!     let request = MatchRequest::new("Yoga für Anfänger")
//!         .with_budget(120.0)
//!         .with_gender("female")
//!         .with_target_groups(["Older adults / older people"]);
//!
//!     for course in matcher.match_and_rank(&request).await? {
//!         println!("{} {}", course.consensus_rank, course.course.name_native);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **search**: lexical admission, semantic scoring, budget penalty, top-N
//! - **platform**: platform preference ranking
//! - **consensus**: Kemeny-Young aggregation (exact binary program or greedy)
//! - **ml**: encoder, translator and language detector seams with remote
//!   HTTP implementations
//! - **catalog**: immutable, atomically reloadable course snapshots
//!
//! External services sit behind traits so every stage can be driven by
//! deterministic stubs.

pub mod catalog;
pub mod config;
pub mod consensus;
pub mod logging;
pub mod ml;
pub mod pipeline;
pub mod platform;
pub mod search;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::init;

    pub use crate::catalog::{Catalog, CatalogHandle, Course, CourseRecord, load_catalog};
    pub use crate::config::{
        AggregationStrategy, ConfigBuilder, ConfigLoader, CourseRankConfig, LogLevel,
    };
    pub use crate::consensus::{ConsensusAggregator, ConsensusOutcome, MicrolpSolver};
    pub use crate::ml::{Encoder, LanguageDetector, Translator};
    pub use crate::pipeline::{
        CourseMatcher, CourseMatcherBuilder, MatchReport, MatchRequest, RankedCourse,
    };
    pub use crate::platform::{Gender, PlatformPreferences, PreferenceRanker};

    pub use crate::{CourseRankError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for courserank operations with recovery suggestions
#[derive(Debug, thiserror::Error)]
pub enum CourseRankError {
    /// The query is empty after trimming
    #[error("Invalid query: {0}. Please provide a non-empty search query")]
    InvalidQuery(String),

    /// The translator failed; not retried
    #[error(
        "Translation from '{source_language}' to '{target_language}' failed: {reason}. Try again or search in '{target_language}'"
    )]
    TranslationFailed {
        source_language: String,
        target_language: String,
        reason: String,
    },

    /// The lexical stage admitted nothing
    #[error("No courses matched '{query}'. Try a different query")]
    NoMatches { query: String },

    /// The semantic stage filtered out everything
    #[error(
        "No course is semantically close enough to '{query}' (similarity threshold {threshold}). Try a different query"
    )]
    SemanticTooDistant { query: String, threshold: f64 },

    /// The budget window filtered out everything
    #[error(
        "No matches for a budget of {budget}. Please remove the budget filter to see all matches"
    )]
    NoPriceMatches { budget: f64 },

    /// Gender or target group selection missing
    #[error("Missing preferences: {0}")]
    MissingPreferences(String),

    /// User and platform rankings do not cover the same guids
    #[error("Mismatched candidate sets: {0}")]
    MismatchedCandidateSets(String),

    /// The consensus program had no solution
    #[error("Consensus program is infeasible: {0}. This indicates a bug in program construction")]
    SolverInfeasible(String),

    /// Solver backend failure other than infeasibility
    #[error("Solver error: {0}")]
    Solver(String),

    /// Encoder request or embedding validation failure
    #[error("Encoder error: {0}. Check the embedding service or unset embedding.service_url")]
    Encoder(String),

    /// Catalog loading or validation failure
    #[error("Catalog error: {0}")]
    Catalog(#[from] crate::catalog::CatalogError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LogError),
}

impl From<crate::config::ConfigError> for CourseRankError {
    fn from(err: crate::config::ConfigError) -> Self {
        CourseRankError::Configuration(err.to_string())
    }
}

impl From<crate::ml::MLError> for CourseRankError {
    fn from(err: crate::ml::MLError) -> Self {
        CourseRankError::Encoder(err.to_string())
    }
}

impl From<crate::consensus::SolverError> for CourseRankError {
    fn from(err: crate::consensus::SolverError) -> Self {
        match err {
            crate::consensus::SolverError::Infeasible => CourseRankError::SolverInfeasible(
                "the ordering constraints admit no assignment".to_string(),
            ),
            crate::consensus::SolverError::Backend(msg) => CourseRankError::Solver(msg),
        }
    }
}

/// Result type for courserank operations
pub type Result<T> = std::result::Result<T, CourseRankError>;

/// Initialize courserank with the provided configuration
///
/// Installs logging, loads the catalog from `catalog.path`, connects the
/// remote encoder and translator when their URLs are configured, and returns
/// a ready [`CourseMatcher`](pipeline::CourseMatcher).
///
/// # Examples
///
/// ```rust,no_run
/// use courserank::prelude::*;
///
/// async fn example() -> Result<()> {
///     let config = ConfigBuilder::new()
///         .with_catalog_path("catalog.json")
///         .with_remote_translation("http://localhost:5000")
///         .build()?;
///
///     let matcher = init(config).await?;
///     let results = matcher
///         .match_and_rank(&MatchRequest::new("pottery").with_gender("male").with_target_groups(Vec::<String>::new()))
///         .await?;
///     println!("{} courses", results.len());
///     Ok(())
/// }
/// ```
pub async fn init(config: config::CourseRankConfig) -> Result<pipeline::CourseMatcher> {
    // A subscriber installed earlier stays in place
    let guard = logging::init(&config.logging)?;

    let mut builder = pipeline::CourseMatcherBuilder::new(config).with_remote_services()?;
    if let Some(guard) = guard {
        builder = builder.with_log_guard(guard);
    }

    builder.build()
}
