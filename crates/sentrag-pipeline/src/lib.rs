//! Ingestion and query orchestration.
//!
//! Both pipelines are generic over the `Embedder` and `VectorStore` seams from
//! `sentrag-core`; the helpers below wire them to the HTTP clients from
//! configuration.

pub mod ingest;
pub mod prompt;
pub mod query;

use std::path::Path;

use anyhow::Result;

use sentrag_core::config::Settings;
use sentrag_core::traits::Embedder;
use sentrag_embed::get_default_embedder;
use sentrag_store::InfinityStore;

pub use ingest::{FileFailure, IngestPipeline, IngestReport, IngestedFile};
pub use prompt::{PromptTemplate, TemplateError};
pub use query::{assemble_context, QueryPipeline, RetrievalPolicy};

pub type DefaultIngestPipeline = IngestPipeline<Box<dyn Embedder>, InfinityStore>;
pub type DefaultQueryPipeline = QueryPipeline<Box<dyn Embedder>, InfinityStore>;

pub fn ingest_pipeline(settings: &Settings) -> Result<DefaultIngestPipeline> {
    let embedder = get_default_embedder(&settings.embedding)?;
    let store = InfinityStore::from_settings(&settings.store)?;
    Ok(IngestPipeline::new(embedder, store))
}

/// Build the query pipeline. The prompt template is loaded and parsed here, so
/// a bad template fails before any question is asked. `base_dir` anchors a
/// relative `query.template_path`.
pub fn query_pipeline(settings: &Settings, base_dir: &Path) -> Result<DefaultQueryPipeline> {
    let template = PromptTemplate::from_settings(&settings.query, base_dir)?;
    let embedder = get_default_embedder(&settings.embedding)?;
    let store = InfinityStore::from_settings(&settings.store)?;
    Ok(QueryPipeline::new(embedder, store, template).with_policy(RetrievalPolicy::from_settings(&settings.query)))
}
