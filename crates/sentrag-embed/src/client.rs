//! Blocking client for OpenAI-compatible embedding endpoints.

use std::time::Duration;

use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sentrag_core::config::EmbeddingSettings;
use sentrag_core::traits::Embedder;
use sentrag_core::types::Embedding;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("embedding service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed embedding response: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("embedding service returned {got} vectors for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },
}

/// Sends every batch as a single `POST {base_url}/embeddings` request.
///
/// No retries: transport failures, non-2xx responses, undecodable bodies and
/// vector counts that differ from the input count are all returned as
/// [`EmbedError`].
#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
}

impl HttpEmbedder {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(base_url: &str, model: impl Into<String>, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let model = model.into();
        anyhow::ensure!(!model.trim().is_empty(), "missing embedding model name");
        anyhow::ensure!(
            base_url.starts_with("http://") || base_url.starts_with("https://"),
            "embedding endpoint must be an http(s) URL"
        );
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build embedding HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model,
        })
    }

    pub fn from_settings(settings: &EmbeddingSettings) -> anyhow::Result<Self> {
        Self::new(&settings.base_url, settings.model.clone(), settings.timeout())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One vector per input, in input order. An empty batch sends nothing.
    pub fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Embedding>, EmbedError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let request = EmbeddingRequest { model: &self.model, input: inputs };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(EmbedError::Transport)?;
        let status = resp.status();
        let body = resp.text().map_err(EmbedError::Transport)?;
        if !status.is_success() {
            return Err(EmbedError::Status { status, body });
        }
        let parsed: EmbeddingResponse = serde_json::from_str(&body).map_err(EmbedError::Malformed)?;
        parsed.into_embeddings(inputs.len())
    }

    pub fn embed_one(&self, text: &str) -> Result<Embedding, EmbedError> {
        let mut vectors = self.embed_batch(&[text.to_string()])?;
        // embed_batch already checked there is exactly one
        vectors.pop().ok_or(EmbedError::CountMismatch { expected: 1, got: 0 })
    }
}

impl Embedder for HttpEmbedder {
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Embedding>> {
        Ok(HttpEmbedder::embed_batch(self, texts)?)
    }

    fn embed_one(&self, text: &str) -> anyhow::Result<Embedding> {
        Ok(HttpEmbedder::embed_one(self, text)?)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

impl EmbeddingResponse {
    fn into_embeddings(self, expected: usize) -> Result<Vec<Embedding>, EmbedError> {
        let mut data = self.data;
        if data.len() != expected {
            return Err(EmbedError::CountMismatch { expected, got: data.len() });
        }
        // Positional order unless every entry carries its input index.
        if data.iter().all(|d| d.index.is_some()) {
            data.sort_by_key(|d| d.index);
        }
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(embedding: Vec<f32>, index: Option<usize>) -> EmbeddingData {
        EmbeddingData { embedding, index }
    }

    #[test]
    fn indexed_entries_are_reordered() {
        let resp = EmbeddingResponse {
            data: vec![entry(vec![2.0], Some(1)), entry(vec![1.0], Some(0))],
        };
        let out = resp.into_embeddings(2).unwrap();
        assert_eq!(out, vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn unindexed_entries_keep_position() {
        let resp = EmbeddingResponse {
            data: vec![entry(vec![2.0], None), entry(vec![1.0], Some(0))],
        };
        let out = resp.into_embeddings(2).unwrap();
        assert_eq!(out, vec![vec![2.0], vec![1.0]]);
    }

    #[test]
    fn short_response_is_rejected() {
        let resp = EmbeddingResponse { data: vec![entry(vec![1.0], None)] };
        let err = resp.into_embeddings(3).unwrap_err();
        assert!(matches!(err, EmbedError::CountMismatch { expected: 3, got: 1 }));
    }

    #[test]
    fn request_shape() {
        let input = vec!["a".to_string(), "b".to_string()];
        let json = serde_json::to_value(EmbeddingRequest { model: "m", input: &input }).unwrap();
        assert_eq!(json, serde_json::json!({ "model": "m", "input": ["a", "b"] }));
    }
}
