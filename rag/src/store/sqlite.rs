//! SQLite-backed collection.
//!
//! Documents and their embeddings live in one table; search is a
//! brute-force cosine scan, which is plenty for a corpus of ~700 verses.

use std::cmp::Ordering;
use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::{ScoredDocument, VectorStore, VerseDocument, VerseMetadata};
use crate::error::Result;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open(db_file: &Path) -> Result<Self> {
        if let Some(parent) = db_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_file)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS verses (
                id TEXT PRIMARY KEY,
                chapter INTEGER NOT NULL,
                verse INTEGER NOT NULL,
                text TEXT NOT NULL,
                embedding BLOB NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_verses_chapter ON verses(chapter, verse)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn row_to_document(row: &SqliteRow) -> VerseDocument {
        let chapter: i64 = row.get("chapter");
        let verse: i64 = row.get("verse");
        VerseDocument {
            id: row.get("id"),
            text: row.get("text"),
            metadata: VerseMetadata {
                chapter: chapter as u32,
                verse: verse as u32,
            },
        }
    }
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn upsert(&self, items: Vec<(VerseDocument, Vec<f32>)>) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for (doc, embedding) in &items {
            sqlx::query(
                "INSERT OR REPLACE INTO verses (id, chapter, verse, text, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&doc.id)
            .bind(doc.metadata.chapter as i64)
            .bind(doc.metadata.verse as i64)
            .bind(&doc.text)
            .bind(Self::serialize_embedding(embedding))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn query(&self, embedding: &[f32], limit: usize) -> Result<Vec<ScoredDocument>> {
        if embedding.is_empty() || limit == 0 {
            return Ok(vec![]);
        }

        let rows = sqlx::query("SELECT id, chapter, verse, text, embedding FROM verses")
            .fetch_all(&self.pool)
            .await?;

        let mut scored: Vec<ScoredDocument> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let score = cosine_similarity(embedding, &Self::deserialize_embedding(&blob));
                ScoredDocument {
                    document: Self::row_to_document(row),
                    score,
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn get(&self, ids: &[String]) -> Result<Vec<VerseDocument>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, chapter, verse, text FROM verses WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let rows = builder.build().fetch_all(&self.pool).await?;
        let mut docs: Vec<VerseDocument> = rows.iter().map(Self::row_to_document).collect();
        // Keep the caller's id order.
        docs.sort_by_key(|d| ids.iter().position(|id| *id == d.id));
        Ok(docs)
    }

    async fn get_by_chapter(&self, chapter: u32) -> Result<Vec<VerseDocument>> {
        let rows = sqlx::query(
            "SELECT id, chapter, verse, text FROM verses WHERE chapter = ?1 ORDER BY verse",
        )
        .bind(chapter as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(Self::row_to_document).collect())
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM verses")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
