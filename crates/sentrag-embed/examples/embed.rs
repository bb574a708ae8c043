use sentrag_core::config::Config;
use sentrag_core::traits::Embedder;
use sentrag_embed::get_default_embedder;

fn main() -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let embedder = get_default_embedder(&settings.embedding)?;
    let texts = vec!["hello world".to_string(), "rust embeddings".to_string()];
    let embs = embedder.embed_batch(&texts)?;
    println!("B={} dim={}", embs.len(), embs.first().map_or(0, Vec::len));
    Ok(())
}
