mod common;

use std::fs;
use std::sync::Arc;

use common::{sample_corpus, sqlite_rag, write_verse, RecordingGenerator};
use rag::{Error, VectorStore, VerseMetadata};

#[tokio::test]
async fn ingested_verse_is_returned_verbatim_by_id() {
    let data = tempfile::tempdir().unwrap();
    let db = tempfile::tempdir().unwrap();
    sample_corpus(data.path());
    let rag = sqlite_rag(db.path(), Arc::new(RecordingGenerator::default())).await;

    let report = rag.ingest(data.path()).await.unwrap();
    assert_eq!(report.indexed, 4);
    assert_eq!(report.total_in_store, 4);

    let doc = rag.verse(2, 47).await.unwrap().expect("2.47 should be stored");
    assert_eq!(doc.id, "BG_2_47");
    assert_eq!(doc.metadata, VerseMetadata { chapter: 2, verse: 47 });
    assert_eq!(
        doc.text,
        "Chapter 2 Context: Sankhya Yoga, the yoga of knowledge.\n\
         Verse 2.47: karmany evadhikaras te ma phalesu kadacana\n\
         English Meaning: Thy right is to work only, but never with its fruits.\n\
         Deep Explanation: Perform your duty without attachment to the fruits of work."
    );

    assert!(rag.verse(2, 48).await.unwrap().is_none());
    assert!(rag.verse(19, 1).await.unwrap().is_none());
}

#[tokio::test]
async fn chapter_listing_counts_only_that_chapter() {
    let data = tempfile::tempdir().unwrap();
    let db = tempfile::tempdir().unwrap();
    sample_corpus(data.path());
    let rag = sqlite_rag(db.path(), Arc::new(RecordingGenerator::default())).await;
    rag.ingest(data.path()).await.unwrap();

    let chapter_two = rag.chapter(2).await.unwrap();
    let verses: Vec<u32> = chapter_two.iter().map(|d| d.metadata.verse).collect();
    assert_eq!(verses, vec![14, 20, 47]);
    assert_eq!(rag.chapter(3).await.unwrap().len(), 1);
    assert!(rag.chapter(12).await.unwrap().is_empty());
}

#[tokio::test]
async fn verse_without_chapter_summary_still_ingests() {
    let data = tempfile::tempdir().unwrap();
    let db = tempfile::tempdir().unwrap();
    fs::create_dir_all(data.path().join("chapters")).unwrap();
    write_verse(data.path(), 5, 1, "sannyasam karmanam", "Renunciation of actions.", "Both lead to liberation.");
    let rag = sqlite_rag(db.path(), Arc::new(RecordingGenerator::default())).await;

    rag.ingest(data.path()).await.unwrap();
    let doc = rag.verse(5, 1).await.unwrap().unwrap();
    assert!(doc.text.starts_with("Chapter 5 Context: \nVerse 5.1: sannyasam karmanam"));
}

// Re-running ingestion replaces documents by id: the count stays the same
// and edited source text wins.
#[tokio::test]
async fn reingesting_the_same_corpus_overwrites_instead_of_duplicating() {
    let data = tempfile::tempdir().unwrap();
    let db = tempfile::tempdir().unwrap();
    sample_corpus(data.path());
    let rag = sqlite_rag(db.path(), Arc::new(RecordingGenerator::default())).await;

    rag.ingest(data.path()).await.unwrap();
    write_verse(data.path(), 2, 47, "revised slok", "Revised translation.", "Revised commentary.");
    let second = rag.ingest(data.path()).await.unwrap();

    assert_eq!(second.indexed, 4);
    assert_eq!(second.total_in_store, 4);
    let doc = rag.verse(2, 47).await.unwrap().unwrap();
    assert!(doc.text.contains("Verse 2.47: revised slok"));
}

#[tokio::test]
async fn malformed_file_aborts_but_keeps_earlier_verses() {
    let data = tempfile::tempdir().unwrap();
    let db = tempfile::tempdir().unwrap();
    sample_corpus(data.path());
    // Sorts after every "bhagavadgita_*" file.
    fs::write(data.path().join("sloks").join("zz_broken.json"), "{ not json").unwrap();
    let rag = sqlite_rag(db.path(), Arc::new(RecordingGenerator::default())).await;

    let err = rag.ingest(data.path()).await.unwrap_err();
    match err {
        Error::Corpus { path, .. } => assert!(path.ends_with("zz_broken.json")),
        other => panic!("expected corpus error, got {other:?}"),
    }
    assert_eq!(rag.store.count().await.unwrap(), 4);
}

#[tokio::test]
async fn missing_sloks_directory_is_reported() {
    let data = tempfile::tempdir().unwrap();
    let db = tempfile::tempdir().unwrap();
    fs::create_dir_all(data.path().join("chapters")).unwrap();
    let rag = sqlite_rag(db.path(), Arc::new(RecordingGenerator::default())).await;

    assert!(matches!(rag.ingest(data.path()).await, Err(Error::Corpus { .. })));
}
