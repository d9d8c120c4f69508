//! External text services behind capability traits.
//!
//! The matching pipeline never talks to a model or a network service
//! directly. It goes through these seams so tests and deployments can plug in
//! whatever fits:
//!
//! - [`Encoder`]: text → fixed-length vectors, batched
//! - [`Translator`]: one-shot query translation
//! - [`LanguageDetector`]: query language guess
//!
//! Remote HTTP implementations live in [`remote`], a `whatlang` detector in
//! [`language`].

pub mod embedding;
pub mod error;
pub mod language;
pub mod remote;

use async_trait::async_trait;

pub use embedding::{EmbeddingValidator, cosine_similarity};
pub use error::{MLError, Result};
pub use language::{DEFAULT_DETECTION_LANGUAGES, WhatlangDetector};
pub use remote::{RemoteEncoder, RemoteTranslator};

// Type aliases for convenience
pub type EmbeddingVector = Vec<f32>;
pub type EmbeddingBatch = Vec<EmbeddingVector>;

/// Turns texts into vectors. Deterministic for identical input.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Encode a batch of texts, one vector per text, in input order.
    async fn encode(&self, texts: &[String]) -> Result<EmbeddingBatch>;
}

/// Translates a query between languages. Called at most once per request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;
}

/// Guesses the language of a text. `None` means detection failed.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Option<String>;
}
