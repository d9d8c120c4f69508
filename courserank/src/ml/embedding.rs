//! Embedding validation and similarity
//!
//! Vectors come from whatever [`Encoder`](super::Encoder) the caller plugs in,
//! so they are checked before they are compared.

use super::error::{MLError, Result};

/// Validation for encoder output
#[derive(Debug, Clone, Default)]
pub struct EmbeddingValidator {
    /// Expected embedding dimensions (optional validation)
    expected_dimensions: Option<usize>,
}

impl EmbeddingValidator {
    /// Create a new validator that accepts any dimension
    pub fn new() -> Self {
        Self {
            expected_dimensions: None,
        }
    }

    /// Create a validator with expected dimensions
    pub fn with_expected_dimensions(expected_dimensions: usize) -> Self {
        Self {
            expected_dimensions: Some(expected_dimensions),
        }
    }

    /// Validate an embedding vector
    ///
    /// Checks for:
    /// - Non-empty vectors
    /// - Expected dimensions (if configured)
    /// - Finite values (no NaN/infinity)
    pub fn validate_embedding(&self, embedding: &[f32]) -> Result<()> {
        if embedding.is_empty() {
            return Err(MLError::embedding("Embedding cannot be empty"));
        }

        if let Some(expected_dim) = self.expected_dimensions
            && embedding.len() != expected_dim
        {
            return Err(MLError::embedding(format!(
                "Expected embedding dimension {}, got {}",
                expected_dim,
                embedding.len()
            )));
        }

        if let Some((i, value)) = embedding.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(MLError::embedding(format!(
                "Invalid value at index {}: {}",
                i, value
            )));
        }

        Ok(())
    }

    /// Validate a batch: every vector valid and all of one dimension, with
    /// exactly `expected_len` vectors.
    pub fn validate_batch(&self, batch: &[Vec<f32>], expected_len: usize) -> Result<usize> {
        if batch.len() != expected_len {
            return Err(MLError::embedding(format!(
                "Encoder returned {} vectors for {} texts",
                batch.len(),
                expected_len
            )));
        }

        let dimensions = match self.expected_dimensions {
            Some(dim) => dim,
            None => batch.first().map(Vec::len).unwrap_or_default(),
        };
        let validator = Self::with_expected_dimensions(dimensions);
        for embedding in batch {
            validator.validate_embedding(embedding)?;
        }

        Ok(dimensions)
    }

    /// Get expected dimensions (if set)
    pub fn expected_dimensions(&self) -> Option<usize> {
        self.expected_dimensions
    }
}

/// Cosine similarity of two vectors of equal length.
///
/// Returns 0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
