//! Vector store abstraction over the verse collection.
//!
//! `SqliteStore` keeps the collection in a local file under
//! `DATABASE_PATH`; `QdrantStore` talks to a Qdrant server when
//! `QDRANT_URL` is configured.

mod qdrant;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::http::HttpClient;

pub use qdrant::QdrantStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseMetadata {
    pub chapter: u32,
    pub verse: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerseDocument {
    pub id: String,
    pub text: String,
    pub metadata: VerseMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredDocument {
    pub document: VerseDocument,
    /// Cosine similarity, higher is nearer.
    pub score: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace documents by id.
    async fn upsert(&self, items: Vec<(VerseDocument, Vec<f32>)>) -> Result<()>;

    /// Nearest documents to `embedding`, best first.
    async fn query(&self, embedding: &[f32], limit: usize) -> Result<Vec<ScoredDocument>>;

    /// Exact id lookup. Unknown ids are skipped.
    async fn get(&self, ids: &[String]) -> Result<Vec<VerseDocument>>;

    /// All documents whose metadata chapter matches, ordered by verse.
    async fn get_by_chapter(&self, chapter: u32) -> Result<Vec<VerseDocument>>;

    async fn count(&self) -> Result<usize>;

    async fn close(&self) {}
}

/// Opens the configured backend.
pub async fn open_store(cfg: &Config, http: &HttpClient) -> Result<Arc<dyn VectorStore>> {
    match &cfg.qdrant_url {
        Some(url) => {
            tracing::info!(url = %url, collection = %cfg.collection, "using Qdrant vector store");
            Ok(Arc::new(QdrantStore::new(http.clone(), url, &cfg.collection)))
        }
        None => {
            let path = cfg.sqlite_file();
            tracing::info!(path = %path.display(), "using local SQLite vector store");
            Ok(Arc::new(SqliteStore::open(&path).await?))
        }
    }
}
