//! sentrag-embed
//!
//! Clients that turn text into embedding vectors: [`HttpEmbedder`] talks to an
//! OpenAI-compatible `/embeddings` endpoint, [`HashEmbedder`] is a deterministic
//! stand-in for development and tests.

pub mod client;
pub mod fake;

pub use client::{EmbedError, HttpEmbedder};
pub use fake::HashEmbedder;

use anyhow::Result;
use sentrag_core::config::EmbeddingSettings;
use sentrag_core::traits::Embedder;

/// Pick the embedder for the given settings.
///
/// `APP_USE_FAKE_EMBEDDINGS=1` (or `embedding.fake = true`) switches to the
/// [`HashEmbedder`] so nothing has to be listening on the network.
pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(settings.fake);
    if use_fake {
        tracing::debug!(dim = settings.fake_dim, "using hashing embedder");
        return Ok(Box::new(HashEmbedder::new(settings.fake_dim)));
    }
    Ok(Box::new(HttpEmbedder::from_settings(settings)?))
}
