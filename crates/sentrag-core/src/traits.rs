use crate::types::{Embedding, SearchHit, SearchQuery, VectorRow};

pub trait Embedder: Send + Sync {
    /// Embed every input, returning one vector per input in input order.
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Embedding>>;

    /// Embed a single string.
    fn embed_one(&self, text: &str) -> anyhow::Result<Embedding> {
        self.embed_batch(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector for a single input"))
    }
}

pub trait VectorStore: Send + Sync {
    /// Insert all rows in one request. Either every row is accepted or an
    /// error is returned.
    fn insert(&self, rows: &[VectorRow]) -> anyhow::Result<()>;

    fn search(&self, query: &SearchQuery) -> anyhow::Result<Vec<SearchHit>>;
}

impl<T: Embedder + ?Sized> Embedder for Box<T> {
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Embedding>> {
        (**self).embed_batch(texts)
    }

    fn embed_one(&self, text: &str) -> anyhow::Result<Embedding> {
        (**self).embed_one(text)
    }
}

impl<T: VectorStore + ?Sized> VectorStore for Box<T> {
    fn insert(&self, rows: &[VectorRow]) -> anyhow::Result<()> {
        (**self).insert(rows)
    }

    fn search(&self, query: &SearchQuery) -> anyhow::Result<Vec<SearchHit>> {
        (**self).search(query)
    }
}

impl<T: Embedder + ?Sized> Embedder for &T {
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Embedding>> {
        (**self).embed_batch(texts)
    }

    fn embed_one(&self, text: &str) -> anyhow::Result<Embedding> {
        (**self).embed_one(text)
    }
}

impl<T: VectorStore + ?Sized> VectorStore for &T {
    fn insert(&self, rows: &[VectorRow]) -> anyhow::Result<()> {
        (**self).insert(rows)
    }

    fn search(&self, query: &SearchQuery) -> anyhow::Result<Vec<SearchHit>> {
        (**self).search(query)
    }
}
