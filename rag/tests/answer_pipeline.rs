mod common;

use std::sync::Arc;

use common::{sample_corpus, sqlite_rag, FailingGenerator, RecordingGenerator};
use rag::Error;

#[tokio::test]
async fn chat_answer_cites_two_retrieved_verses() {
    let data = tempfile::tempdir().unwrap();
    let db = tempfile::tempdir().unwrap();
    sample_corpus(data.path());
    let generator = Arc::new(RecordingGenerator::default());
    let rag = sqlite_rag(db.path(), generator.clone()).await;
    rag.ingest(data.path()).await.unwrap();

    let question = "Thy right is to work only, but never with its fruits.";
    let answer = rag.answer_query(question).await.unwrap();

    assert_eq!(answer.question, question);
    assert_eq!(answer.answer, "Act without attachment to results.");
    assert_eq!(answer.references.len(), 2);
    assert_eq!(answer.references[0], "BG 2.47");
    assert!(answer.references.iter().all(|r| r.starts_with("BG ")));

    let seen = generator.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let user = &seen[0][1].content;
    assert!(user.starts_with("Shastras Context:\n--- SOURCE: Bhagavad Gita Verse 2.47 ---"));
    assert!(user.ends_with(&format!("User Question: {}", question)));
    assert_eq!(user.matches("--- END OF SOURCE ---").count(), 2);
}

#[tokio::test]
async fn search_honours_requested_k() {
    let data = tempfile::tempdir().unwrap();
    let db = tempfile::tempdir().unwrap();
    sample_corpus(data.path());
    let rag = sqlite_rag(db.path(), Arc::new(RecordingGenerator::default())).await;
    rag.ingest(data.path()).await.unwrap();

    let hits = rag.search("soul never born", 3).await.unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].document.id, "BG_2_20");
}

#[tokio::test]
async fn generation_failure_is_an_error_not_an_answer() {
    let data = tempfile::tempdir().unwrap();
    let db = tempfile::tempdir().unwrap();
    sample_corpus(data.path());
    let rag = sqlite_rag(db.path(), Arc::new(FailingGenerator)).await;
    rag.ingest(data.path()).await.unwrap();

    let err = rag.answer_query("What is my duty?").await.unwrap_err();
    assert!(matches!(err, Error::Upstream { status: 503, .. }));
}

#[tokio::test]
async fn empty_store_yields_empty_context() {
    let db = tempfile::tempdir().unwrap();
    let generator = Arc::new(RecordingGenerator::default());
    let rag = sqlite_rag(db.path(), generator.clone()).await;

    let answer = rag.answer_query("Anything?").await.unwrap();
    assert!(answer.references.is_empty());
    let seen = generator.seen.lock().unwrap();
    assert_eq!(seen[0][1].content, "Shastras Context:\n\n\nUser Question: Anything?");
}
