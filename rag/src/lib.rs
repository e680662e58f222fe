mod build_prompt;
mod config;
mod corpus;
mod embed;
mod error;
mod generate;
mod http;
mod ingest;
mod retrieve;
mod scan_files;
mod store;

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

pub use build_prompt::{build_prompt, format_context, references, Message};
pub use config::{Config, EMBEDDING_MODEL, LLM_MODEL, PROJECT_NAME, SYSTEM_PROMPT, VERSION};
pub use corpus::{compose_document, verse_id, VerseFile};
pub use embed::{embed_query, Embedder, HfEmbedder};
pub use error::{Error, Result};
pub use generate::{Generator, HfChatGenerator};
pub use http::HttpClient;
pub use ingest::{index_corpus, IngestReport};
pub use retrieve::retrieve_top;
pub use store::{
    open_store, QdrantStore, ScoredDocument, SqliteStore, VectorStore, VerseDocument, VerseMetadata,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    pub references: Vec<String>,
}

/// Store, embedder and generator wired together once at startup and
/// shared by every request.
#[derive(Clone)]
pub struct Rag {
    pub config: Config,
    pub store: Arc<dyn VectorStore>,
    pub embedder: Arc<dyn Embedder>,
    pub generator: Arc<dyn Generator>,
}

impl Rag {
    pub fn new(
        config: Config,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            config,
            store,
            embedder,
            generator,
        }
    }

    /// Opens the configured store and builds the Hugging Face clients.
    pub async fn connect(config: Config) -> Result<Self> {
        if config.hf_token.is_none() {
            tracing::warn!("HUGGINGFACEHUB_API_TOKEN is not set; search and chat will fail");
        }
        let http = HttpClient::new(&config)?;
        let store = open_store(&config, &http).await?;
        let embedder = Arc::new(HfEmbedder::new(&config, &http));
        let generator = Arc::new(HfChatGenerator::new(&config, &http));
        Ok(Self::new(config, store, embedder, generator))
    }

    pub async fn search(&self, question: &str, k: usize) -> Result<Vec<ScoredDocument>> {
        retrieve_top(self.store.as_ref(), self.embedder.as_ref(), question, k).await
    }

    pub async fn answer_query(&self, question: &str) -> Result<Answer> {
        let hits = self.search(question, self.config.chat_top_k).await?;
        let context = format_context(&hits);
        let answer = self.ask(question, &context).await?;
        Ok(Answer {
            question: question.to_string(),
            answer,
            references: references(&hits),
        })
    }

    /// Sends the persona prompt with an already assembled context.
    pub async fn ask(&self, question: &str, context: &str) -> Result<String> {
        let messages = build_prompt(question, context);
        self.generator.generate(&messages).await
    }

    pub async fn verse(&self, chapter: u32, verse: u32) -> Result<Option<VerseDocument>> {
        let docs = self.store.get(&[verse_id(chapter, verse)]).await?;
        Ok(docs.into_iter().next())
    }

    pub async fn chapter(&self, chapter: u32) -> Result<Vec<VerseDocument>> {
        self.store.get_by_chapter(chapter).await
    }

    pub async fn ingest(&self, data_dir: &Path) -> Result<IngestReport> {
        index_corpus(self.store.as_ref(), self.embedder.as_ref(), data_dir).await
    }

    pub async fn close(&self) {
        self.store.close().await;
    }
}
