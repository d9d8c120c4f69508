//! HTTP clients for remote encoder and translation services.

use super::error::{MLError, Result};
use super::{Encoder, Translator};
use crate::config::{EmbeddingConfig, TranslationConfig};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| MLError::configuration(format!("Failed to build HTTP client: {}", e)))
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Encoder for OpenAI-compatible `POST {base}/embeddings` endpoints
/// (OpenAI, Ollama's `/v1`, text-embeddings-inference, ...).
#[derive(Debug, Clone)]
pub struct RemoteEncoder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

impl RemoteEncoder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let base = config
            .service_url
            .as_deref()
            .ok_or_else(|| MLError::configuration("No embedding service URL configured"))?;

        Ok(Self {
            client: build_client(config.timeout_secs)?,
            endpoint: format!("{}/embeddings", trim_base(base)),
            model: config.model_name.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Encoder for RemoteEncoder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut request = self.client.post(&self.endpoint).json(&json!({
            "model": self.model,
            "input": texts,
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MLError::request(format!(
                "Embedding service returned {}: {}",
                status, body
            )));
        }

        let mut items = response.json::<EmbeddingResponse>().await?.data;
        if items.iter().all(|item| item.index.is_some()) {
            items.sort_by_key(|item| item.index);
        }
        Ok(items.into_iter().map(|item| item.embedding).collect())
    }
}

/// Translator for LibreTranslate-compatible `POST {base}/translate` endpoints.
#[derive(Debug, Clone)]
pub struct RemoteTranslator {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
    error: Option<String>,
}

impl RemoteTranslator {
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let base = config
            .service_url
            .as_deref()
            .ok_or_else(|| MLError::configuration("No translation service URL configured"))?;

        Ok(Self {
            client: build_client(config.timeout_secs)?,
            endpoint: format!("{}/translate", trim_base(base)),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Translator for RemoteTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let mut body = json!({
            "q": text,
            "source": source,
            "target": target,
            "format": "text",
        });
        if let Some(key) = &self.api_key {
            body["api_key"] = json!(key);
        }

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();
        let parsed = response.json::<TranslateResponse>().await?;

        match (status.is_success(), parsed.translated_text, parsed.error) {
            (true, Some(text), _) if !text.trim().is_empty() => Ok(text),
            (_, _, Some(error)) => Err(MLError::translation(error)),
            (true, _, None) => Err(MLError::response("Translation service returned no text")),
            (false, _, None) => Err(MLError::request(format!(
                "Translation service returned {}",
                status
            ))),
        }
    }
}
