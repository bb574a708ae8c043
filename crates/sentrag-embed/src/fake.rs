use std::hash::{Hash, Hasher};

use twox_hash::XxHash64;

use sentrag_core::traits::Embedder;
use sentrag_core::types::Embedding;

/// Deterministic token-hashing embedder. Same text, same L2-normalized vector.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn embed_text(&self, text: &str) -> Embedding {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

impl Embedder for HashEmbedder {
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
