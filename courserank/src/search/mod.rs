//! Query-relevance stages of the matching pipeline.
//!
//! A query moves through four stages, each narrowing or annotating the
//! candidate list produced by the one before:
//!
//! 1. [`LexicalMatcher`] validates and (if needed) translates the query, then
//!    admits catalog rows whose text fuzzily matches it.
//! 2. [`SemanticScorer`] attaches a similarity score in [0, 1], either cosine
//!    similarity of encoder vectors or a fuzzy token-set proxy.
//! 3. [`BudgetPenalizer`] filters on price and blends in a price penalty.
//! 4. [`CandidateRanker`] sorts by final score and keeps the top N.
//!
//! # Example
//!
//! ```no_run
//! use courserank::search::{BudgetPenalizer, CandidateRanker};
//!
//! let penalty = BudgetPenalizer::price_penalty(115.0, 100.0);
//! assert!((penalty - 0.5).abs() < 1e-9);
//!
//! let ranker = CandidateRanker::new(20);
//! assert_eq!(ranker.top_n(), 20);
//! ```

pub mod budget;
pub mod candidate;
pub mod fuzzy;
pub mod lexical;
pub mod ranker;
pub mod semantic;

pub use budget::BudgetPenalizer;
pub use candidate::Candidate;
pub use fuzzy::{FuzzyScorer, IndelFuzzyScorer};
pub use lexical::{LexicalMatcher, PreparedQuery, validate_query};
pub use ranker::CandidateRanker;
pub use semantic::{SemanticMode, SemanticScorer};
