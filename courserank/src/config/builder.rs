//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use super::{Result, models::*, validation};
use std::path::Path;

/// Builder for creating CourseRankConfig instances.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: CourseRankConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: CourseRankConfig::default(),
        }
    }

    /// Set the catalog snapshot path.
    pub fn with_catalog_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.catalog.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the catalog's primary language (ISO 639-1).
    pub fn with_primary_language(mut self, language: impl Into<String>) -> Self {
        self.config.catalog.primary_language = language.into();
        self
    }

    /// Set the languages the query detector may report besides the primary one.
    pub fn with_detection_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.catalog.detection_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Set the number of candidates kept after composite scoring.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.config.ranking.top_n = top_n;
        self
    }

    /// Set the fuzzy admission thresholds (multi-token partial, single-token token-set).
    pub fn with_fuzzy_thresholds(mut self, partial: u8, token_set: u8) -> Self {
        self.config.matching.partial_threshold = partial;
        self.config.matching.token_set_threshold = token_set;
        self
    }

    /// Set the semantic similarity threshold; `None` disables the filter.
    pub fn with_similarity_threshold(mut self, threshold: Option<f64>) -> Self {
        self.config.semantic.similarity_threshold = threshold;
        self
    }

    /// Configure a remote OpenAI-compatible embedding service.
    pub fn with_remote_embeddings(
        mut self,
        url: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        self.config.embedding.service_url = Some(url.into());
        self.config.embedding.model_name = model_name.into();
        self
    }

    /// Configure a remote LibreTranslate-compatible translation service.
    pub fn with_remote_translation(mut self, url: impl Into<String>) -> Self {
        self.config.translation.service_url = Some(url.into());
        self
    }

    /// Set the consensus aggregation strategy.
    pub fn with_aggregation_strategy(mut self, strategy: AggregationStrategy) -> Self {
        self.config.consensus.strategy = strategy;
        self
    }

    /// Set the largest candidate count solved exactly under the `auto` strategy.
    pub fn with_exact_limit(mut self, limit: usize) -> Self {
        self.config.consensus.exact_limit = limit;
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Configure logging to a file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use default logging configuration (console output at Info level)
    pub fn with_default_logging(mut self) -> Self {
        self.config.logging.level = LogLevel::Info;
        self.config.logging.format = LogFormat::Json;
        self.config.logging.file = None;
        self
    }

    /// Create a configuration for testing: no remote services, debug logging.
    pub fn testing() -> Self {
        Self::new().with_log_level(LogLevel::Debug)
    }

    /// Build the configuration, validating it in the process.
    pub fn build(self) -> Result<CourseRankConfig> {
        validation::validate_config(&self.config)?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<CourseRankConfig> for ConfigBuilder {
    fn from(config: CourseRankConfig) -> Self {
        Self { config }
    }
}
