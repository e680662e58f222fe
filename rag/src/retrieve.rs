use crate::embed::{embed_query, Embedder};
use crate::error::Result;
use crate::store::{ScoredDocument, VectorStore};

pub async fn retrieve_top(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    question: &str,
    k: usize,
) -> Result<Vec<ScoredDocument>> {
    let query_vec = embed_query(embedder, question).await?;
    let hits = store.query(&query_vec, k).await?;
    tracing::debug!(k, found = hits.len(), "retrieved verses");
    Ok(hits)
}
