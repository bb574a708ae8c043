use anyhow::{Context, Result};

use sentrag_core::config::QuerySettings;
use sentrag_core::traits::{Embedder, VectorStore};
use sentrag_core::types::{SearchHit, SearchQuery};

use crate::prompt::PromptTemplate;

/// How many hits to ask for and which of them count as relevant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalPolicy {
    pub top_n: usize,
    /// Hits scoring below this are dropped. Hits without a score are kept.
    pub min_score: Option<f32>,
}

impl Default for RetrievalPolicy {
    fn default() -> Self {
        Self { top_n: 2, min_score: None }
    }
}

impl RetrievalPolicy {
    pub fn from_settings(settings: &QuerySettings) -> Self {
        Self { top_n: settings.top_n, min_score: settings.min_score }
    }

    fn keeps(&self, hit: &SearchHit) -> bool {
        match (self.min_score, hit.score) {
            (Some(min), Some(score)) => score >= min,
            _ => true,
        }
    }
}

pub struct QueryPipeline<E, S>
where
    E: Embedder,
    S: VectorStore,
{
    embedder: E,
    store: S,
    template: PromptTemplate,
    policy: RetrievalPolicy,
}

impl<E, S> QueryPipeline<E, S>
where
    E: Embedder,
    S: VectorStore,
{
    pub fn new(embedder: E, store: S, template: PromptTemplate) -> Self {
        Self { embedder, store, template, policy: RetrievalPolicy::default() }
    }

    pub fn with_policy(mut self, policy: RetrievalPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetrievalPolicy {
        self.policy
    }

    /// Embed the question and run a combined text and vector search, then
    /// apply the relevance policy. Store order is preserved.
    pub fn retrieve(&self, user_query: &str) -> Result<Vec<SearchHit>> {
        let vector = self.embedder.embed_one(user_query).context("failed to embed query")?;
        let query = SearchQuery::new(self.policy.top_n)
            .with_text(user_query)
            .with_vector(vector)
            .with_score(self.policy.min_score.is_some());
        let hits = self.store.search(&query).context("search failed")?;

        let found = hits.len();
        let kept: Vec<SearchHit> = hits.into_iter().filter(|h| self.policy.keeps(h)).collect();
        tracing::debug!(found, kept = kept.len(), "retrieved context");
        Ok(kept)
    }

    /// Build the prompt for `user_query` from the retrieved context.
    pub fn answer_prompt(&self, user_query: &str) -> Result<String> {
        let hits = self.retrieve(user_query)?;
        let context = assemble_context(&hits);
        Ok(self.template.render(&context, user_query))
    }
}

/// Hit texts in result order, joined with no separator.
pub fn assemble_context(hits: &[SearchHit]) -> String {
    hits.iter().map(|h| h.text.as_str()).collect()
}
