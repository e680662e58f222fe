use std::path::Path;

use crate::corpus::{compose_document, load_chapter_summaries, read_verse, verse_id};
use crate::embed::Embedder;
use crate::error::{Error, Result};
use crate::scan_files::scan_json_files;
use crate::store::{VectorStore, VerseDocument, VerseMetadata};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IngestReport {
    /// Verse files written during this run.
    pub indexed: usize,
    /// Documents in the collection afterwards.
    pub total_in_store: usize,
}

/// Loads `<data_dir>/chapters` and `<data_dir>/sloks` into the store.
///
/// Verses are written one at a time and the first failure aborts the run;
/// whatever was written before it stays in the store. Ids are derived from
/// chapter and verse, so re-running replaces documents instead of adding.
pub async fn index_corpus(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    data_dir: &Path,
) -> Result<IngestReport> {
    let summaries = load_chapter_summaries(&data_dir.join("chapters"))?;
    let files = scan_json_files(&data_dir.join("sloks"))?;
    tracing::info!(
        chapters = summaries.len(),
        verses = files.len(),
        dir = %data_dir.display(),
        "starting ingestion"
    );

    let mut indexed = 0usize;
    for path in files {
        let verse = read_verse(&path)?;
        let summary = summaries.get(&verse.chapter).map(String::as_str).unwrap_or("");
        let text = compose_document(&verse, summary);

        let vector = embedder
            .embed(std::slice::from_ref(&text))
            .await?
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::corpus(&path, "embedding came back empty"))?;

        let doc = VerseDocument {
            id: verse_id(verse.chapter, verse.verse),
            text,
            metadata: VerseMetadata {
                chapter: verse.chapter,
                verse: verse.verse,
            },
        };
        tracing::debug!(id = %doc.id, "indexing verse");
        store.upsert(vec![(doc, vector)]).await?;
        indexed += 1;
    }

    let total_in_store = store.count().await?;
    tracing::info!(indexed, total_in_store, "ingestion finished");
    Ok(IngestReport {
        indexed,
        total_in_store,
    })
}
