//! Configuration validation utilities.
//!
//! This module provides validation functions for configuration values.

use super::ConfigError;
use super::models::*;

/// Validate the entire configuration.
pub fn validate_config(config: &CourseRankConfig) -> Result<(), ConfigError> {
    validate_catalog_config(&config.catalog)?;
    validate_matching_config(&config.matching)?;
    validate_semantic_config(&config.semantic)?;

    if config.ranking.top_n == 0 {
        return Err(ConfigError::ValidationError(
            "ranking.top_n must be at least 1".to_string(),
        ));
    }

    validate_service_url("embedding.service_url", config.embedding.service_url.as_deref())?;
    if config.embedding.service_url.is_some() && config.embedding.model_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Embedding model name cannot be empty when an embedding service is configured"
                .to_string(),
        ));
    }
    validate_service_url(
        "translation.service_url",
        config.translation.service_url.as_deref(),
    )?;

    validate_platform_config(&config.platform)?;

    if config.consensus.exact_limit == 0 {
        return Err(ConfigError::ValidationError(
            "consensus.exact_limit must be at least 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    if config.primary_language.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Catalog primary language cannot be empty".to_string(),
        ));
    }

    if config.detection_languages.iter().any(|code| code.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "catalog.detection_languages cannot contain empty codes".to_string(),
        ));
    }

    if let Some(path) = &config.path
        && path.as_os_str().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "Catalog path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_matching_config(config: &MatchingConfig) -> Result<(), ConfigError> {
    if config.partial_threshold > 100 {
        return Err(ConfigError::ValidationError(format!(
            "matching.partial_threshold must be within 0..=100, got {}",
            config.partial_threshold
        )));
    }
    if config.token_set_threshold > 100 {
        return Err(ConfigError::ValidationError(format!(
            "matching.token_set_threshold must be within 0..=100, got {}",
            config.token_set_threshold
        )));
    }
    Ok(())
}

fn validate_semantic_config(config: &SemanticConfig) -> Result<(), ConfigError> {
    if let Some(threshold) = config.similarity_threshold
        && !(0.0..=1.0).contains(&threshold)
    {
        return Err(ConfigError::ValidationError(format!(
            "semantic.similarity_threshold must be within [0, 1], got {}",
            threshold
        )));
    }
    Ok(())
}

fn validate_platform_config(config: &PlatformConfig) -> Result<(), ConfigError> {
    if let Some((label, _)) = config
        .target_groups
        .iter()
        .find(|(_, column)| column.trim().is_empty())
    {
        return Err(ConfigError::ValidationError(format!(
            "Target group '{}' maps to an empty column name",
            label
        )));
    }
    Ok(())
}

fn validate_service_url(field: &str, url: Option<&str>) -> Result<(), ConfigError> {
    match url {
        Some(url) if url.trim().is_empty() => Err(ConfigError::ValidationError(format!(
            "{} cannot be empty when set",
            field
        ))),
        _ => Ok(()),
    }
}
