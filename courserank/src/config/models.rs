//! Configuration model definitions.
//!
//! This module contains the configuration structures for all courserank components.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Main configuration structure for courserank.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CourseRankConfig {
    /// Catalog snapshot configuration
    pub catalog: CatalogConfig,

    /// Lexical admission thresholds
    pub matching: MatchingConfig,

    /// Semantic scoring configuration
    pub semantic: SemanticConfig,

    /// Candidate list configuration
    pub ranking: RankingConfig,

    /// Remote embedding service configuration
    pub embedding: EmbeddingConfig,

    /// Remote translation service configuration
    pub translation: TranslationConfig,

    /// Platform preference ranking configuration
    pub platform: PlatformConfig,

    /// Consensus aggregation configuration
    pub consensus: ConsensusConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Catalog snapshot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to a JSON catalog snapshot
    pub path: Option<PathBuf>,

    /// Primary language of the catalog text (ISO 639-1)
    ///
    /// Queries detected in any other language are translated into this one.
    pub primary_language: String,

    /// Languages the query detector may report, besides the primary one
    pub detection_languages: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            primary_language: "de".to_string(),
            detection_languages: crate::ml::DEFAULT_DETECTION_LANGUAGES
                .iter()
                .map(|code| code.to_string())
                .collect(),
        }
    }
}

/// Fuzzy admission thresholds on the 0..=100 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Partial-substring threshold used for multi-token queries
    pub partial_threshold: u8,

    /// Token-set threshold used for single-token queries
    pub token_set_threshold: u8,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            partial_threshold: 75,
            token_set_threshold: 60,
        }
    }
}

/// Semantic scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// Minimum cosine similarity for a candidate to survive.
    /// `None` keeps every admitted row.
    pub similarity_threshold: Option<f64>,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: Some(0.45),
        }
    }
}

/// Candidate list configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Number of candidates kept after composite scoring
    pub top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { top_n: 20 }
    }
}

/// Remote embedding service configuration (OpenAI-compatible `/embeddings`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Base URL of the service, e.g. `https://api.openai.com/v1`.
    /// No URL means no encoder; the fuzzy proxy score is used instead.
    pub service_url: Option<String>,

    /// Model name sent with every request
    pub model_name: String,

    /// Bearer token, if the service needs one
    pub api_key: Option<String>,

    /// Request timeout
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            service_url: None,
            model_name: "paraphrase-multilingual-MiniLM-L12-v2".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

/// Remote translation service configuration (LibreTranslate-compatible `/translate`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Base URL of the service. No URL disables query translation.
    pub service_url: Option<String>,

    /// API key, if the service needs one
    pub api_key: Option<String>,

    /// Request timeout
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            service_url: None,
            api_key: None,
            timeout_secs: 10,
        }
    }
}

/// Platform preference ranking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Public-facing target group label mapped to the catalog's column name
    pub target_groups: BTreeMap<String, String>,

    /// Label added to the selection for female callers, when configured
    pub women_group_label: Option<String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        let target_groups = [
            (
                "People with a migration background",
                "Menschen mit Migrationshintergrund",
            ),
            ("Illiterate people", "Analphabet/inn/en"),
            ("Women", "Frauen"),
            ("People with disabilities", "Menschen mit Behinderung"),
            ("Older adults / older people", "Ältere"),
            ("Other target groups", "Andere Adressaten–gruppen"),
            ("Children", "Kinder"),
            ("Adolescents / young people", "Jugendliche"),
        ]
        .into_iter()
        .map(|(label, column)| (label.to_string(), column.to_string()))
        .collect();

        Self {
            target_groups,
            women_group_label: Some("Women".to_string()),
        }
    }
}

/// Consensus aggregation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Aggregation strategy
    pub strategy: AggregationStrategy,

    /// Largest candidate count solved exactly under `auto`
    pub exact_limit: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            strategy: AggregationStrategy::Auto,
            exact_limit: 30,
        }
    }
}

/// How the consensus order is computed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AggregationStrategy {
    /// Exact Kemeny-Young integer program
    Exact,

    /// Greedy net-margin ordering
    Greedy,

    /// Exact up to `exact_limit` candidates, greedy beyond
    Auto,
}

impl fmt::Display for AggregationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationStrategy::Exact => write!(f, "exact"),
            AggregationStrategy::Greedy => write!(f, "greedy"),
            AggregationStrategy::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for AggregationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(AggregationStrategy::Exact),
            "greedy" => Ok(AggregationStrategy::Greedy),
            "auto" => Ok(AggregationStrategy::Auto),
            _ => Err(format!("Invalid aggregation strategy: {}", s)),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Log format
    pub format: LogFormat,

    /// File to log to (if any)
    pub file: Option<PathBuf>,

    /// Whether to log to stdout
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Default,
            file: None,
            stdout: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level
    Trace,

    /// Debug level
    Debug,

    /// Info level
    Info,

    /// Warn level
    Warn,

    /// Error level
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default format
    Default,

    /// JSON format
    Json,

    /// Compact format
    Compact,

    /// Pretty format
    Pretty,
}
