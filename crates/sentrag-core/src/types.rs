//! Domain types shared by the embedding client, the store client and the
//! pipelines.

use serde::{Deserialize, Serialize};

/// One vector per embedded string. Dimensionality is fixed per model.
pub type Embedding = Vec<f32>;

/// A persisted chunk: source name, position within the source, text and
/// embedding. Created once per chunk during ingestion and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRow {
    pub name: String,
    pub index: usize,
    pub text: String,
    pub vector: Embedding,
}

/// A row returned by a store search, in the store's ranking order.
///
/// `score` is only present when the store was asked to return its relevance
/// column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub name: String,
    pub index: usize,
    pub text: String,
    pub score: Option<f32>,
}

/// Store-agnostic search input. Which of `vector` and `text` are required
/// depends on the store's configured [`SearchMode`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub vector: Option<Embedding>,
    pub text: Option<String>,
    pub top_n: usize,
    pub with_score: bool,
}

impl SearchQuery {
    pub fn new(top_n: usize) -> Self {
        Self { vector: None, text: None, top_n, with_score: false }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_vector(mut self, vector: Embedding) -> Self {
        self.vector = Some(vector);
        self
    }

    /// Ask the store to return its relevance score with each hit.
    pub fn with_score(mut self, with_score: bool) -> Self {
        self.with_score = with_score;
        self
    }
}

/// How the store matches a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Full-text match over the text column.
    #[default]
    Text,
    /// Vector similarity over the dense column.
    Dense,
    /// Text and dense matches fused by reciprocal rank.
    Hybrid,
}
