use sentrag_core::config::Config;
use sentrag_core::types::SearchQuery;
use sentrag_store::InfinityStore;

fn main() -> anyhow::Result<()> {
    let query = std::env::args().nth(1).unwrap_or_else(|| "Saturday".to_string());
    let settings = Config::load()?.settings()?;
    let store = InfinityStore::from_settings(&settings.store)?;
    let hits = store.search(&SearchQuery::new(settings.query.top_n).with_text(query.clone()))?;
    println!("q='{}' -> {} hits", query, hits.len());
    for hit in hits {
        println!("{}#{}: {}", hit.name, hit.index, hit.text);
    }
    Ok(())
}
