use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ScoredDocument, VectorStore, VerseDocument, VerseMetadata};
use crate::error::{Error, Result};
use crate::http::HttpClient;

const SCROLL_PAGE: usize = 256;

#[derive(Serialize)]
struct CreateCollection {
    vectors: VectorParams,
}

#[derive(Serialize)]
struct VectorParams {
    size: usize,
    distance: &'static str,
}

#[derive(Serialize, Deserialize)]
struct PointPayload {
    doc_id: String,
    chapter: u32,
    verse: u32,
    text: String,
}

#[derive(Serialize)]
struct Point<'a> {
    id: u64,
    vector: &'a [f32],
    payload: PointPayload,
}

#[derive(Serialize)]
struct UpsertPoints<'a> {
    points: Vec<Point<'a>>,
}

#[derive(Deserialize)]
struct Hit {
    #[serde(default)]
    score: f32,
    payload: Option<PointPayload>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    result: Option<T>,
}

#[derive(Default, Deserialize)]
struct QueryResult {
    points: Vec<Hit>,
}

#[derive(Default, Deserialize)]
struct ScrollResult {
    points: Vec<Hit>,
    next_page_offset: Option<Value>,
}

#[derive(Default, Deserialize)]
struct CountResult {
    count: usize,
}

/// Collection on a Qdrant server, addressed over its REST API.
pub struct QdrantStore {
    http: HttpClient,
    base: String,
    ready: AtomicBool,
}

impl QdrantStore {
    pub fn new(http: HttpClient, url: &str, collection: &str) -> Self {
        Self {
            http,
            base: format!("{}/collections/{}", url, collection),
            ready: AtomicBool::new(false),
        }
    }

    /// Qdrant only accepts integer or UUID point ids.
    fn point_id(meta: VerseMetadata) -> u64 {
        meta.chapter as u64 * 1000 + meta.verse as u64
    }

    /// Creates the collection only when Qdrant says it does not exist.
    async fn ensure_collection(&self, vector_size: usize) -> Result<()> {
        if self.ready.load(Ordering::Acquire) {
            return Ok(());
        }
        match self.http.get_json::<Value>(&self.base).await {
            Ok(_) => {}
            Err(err) if is_not_found(&err) => {
                tracing::info!(url = %self.base, size = vector_size, "creating Qdrant collection");
                let body = CreateCollection {
                    vectors: VectorParams {
                        size: vector_size,
                        distance: "Cosine",
                    },
                };
                let _ = self.http.put_json::<Value, _>(&self.base, &body).await?;
            }
            Err(err) => return Err(err),
        }
        self.ready.store(true, Ordering::Release);
        Ok(())
    }
}

impl From<PointPayload> for VerseDocument {
    fn from(p: PointPayload) -> Self {
        VerseDocument {
            id: p.doc_id,
            text: p.text,
            metadata: VerseMetadata {
                chapter: p.chapter,
                verse: p.verse,
            },
        }
    }
}

fn documents(hits: Vec<Hit>) -> Vec<VerseDocument> {
    hits.into_iter()
        .filter_map(|h| h.payload)
        .map(VerseDocument::from)
        .collect()
}

fn is_not_found(err: &Error) -> bool {
    matches!(err, Error::Upstream { status: 404, .. })
}

/// A collection that was never created reads as empty, like a fresh SQLite file.
fn or_empty<T: Default>(res: Result<Envelope<T>>) -> Result<Option<T>> {
    match res {
        Ok(envelope) => Ok(envelope.result),
        Err(err) if is_not_found(&err) => Ok(Some(T::default())),
        Err(err) => Err(store_err(err)),
    }
}

fn store_err(err: Error) -> Error {
    match err {
        err @ Error::Store(_) => err,
        other => Error::Store(other.to_string()),
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn upsert(&self, items: Vec<(VerseDocument, Vec<f32>)>) -> Result<()> {
        let Some((_, first)) = items.first() else {
            return Ok(());
        };
        self.ensure_collection(first.len()).await.map_err(store_err)?;

        let points = items
            .iter()
            .map(|(doc, vector)| Point {
                id: Self::point_id(doc.metadata),
                vector: vector.as_slice(),
                payload: PointPayload {
                    doc_id: doc.id.clone(),
                    chapter: doc.metadata.chapter,
                    verse: doc.metadata.verse,
                    text: doc.text.clone(),
                },
            })
            .collect();
        let url = format!("{}/points?wait=true", self.base);
        let _ = self
            .http
            .put_json::<Value, _>(&url, &UpsertPoints { points })
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn query(&self, embedding: &[f32], limit: usize) -> Result<Vec<ScoredDocument>> {
        if embedding.is_empty() || limit == 0 {
            return Ok(vec![]);
        }
        let url = format!("{}/points/query", self.base);
        let req = json!({ "query": embedding, "limit": limit, "with_payload": true });
        let res = or_empty(self.http.post_json::<Envelope<QueryResult>, _>(&url, &req).await)?;
        Ok(res
            .map(|r| r.points)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|hit| {
                let score = hit.score;
                hit.payload.map(|p| ScoredDocument {
                    document: p.into(),
                    score,
                })
            })
            .collect())
    }

    async fn get(&self, ids: &[String]) -> Result<Vec<VerseDocument>> {
        let point_ids: Vec<u64> = ids
            .iter()
            .filter_map(|id| parse_verse_id(id))
            .map(Self::point_id)
            .collect();
        if point_ids.is_empty() {
            return Ok(vec![]);
        }
        let url = format!("{}/points", self.base);
        let req = json!({ "ids": point_ids, "with_payload": true });
        let res = or_empty(self.http.post_json::<Envelope<Vec<Hit>>, _>(&url, &req).await)?;
        Ok(documents(res.unwrap_or_default()))
    }

    async fn get_by_chapter(&self, chapter: u32) -> Result<Vec<VerseDocument>> {
        let url = format!("{}/points/scroll", self.base);
        let mut offset: Option<Value> = None;
        let mut out = Vec::new();

        loop {
            let mut req = json!({
                "filter": { "must": [{ "key": "chapter", "match": { "value": chapter } }] },
                "limit": SCROLL_PAGE,
                "with_payload": true,
                "with_vector": false,
            });
            if let Some(next) = offset.take() {
                req["offset"] = next;
            }
            let res = or_empty(self.http.post_json::<Envelope<ScrollResult>, _>(&url, &req).await)?;
            let Some(page) = res else { break };
            out.extend(documents(page.points));
            match page.next_page_offset {
                Some(next) if !next.is_null() => offset = Some(next),
                _ => break,
            }
        }

        out.sort_by_key(|d| d.metadata.verse);
        Ok(out)
    }

    async fn count(&self) -> Result<usize> {
        let url = format!("{}/points/count", self.base);
        let body = json!({ "exact": true });
        let res = or_empty(self.http.post_json::<Envelope<CountResult>, _>(&url, &body).await)?;
        Ok(res.map(|r| r.count).unwrap_or(0))
    }
}

/// Inverse of `corpus::verse_id`.
fn parse_verse_id(id: &str) -> Option<VerseMetadata> {
    let rest = id.strip_prefix("BG_")?;
    let (chapter, verse) = rest.split_once('_')?;
    Some(VerseMetadata {
        chapter: chapter.parse().ok()?,
        verse: verse.parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verse_ids_round_trip_to_point_ids() {
        let meta = parse_verse_id("BG_2_47").unwrap();
        assert_eq!(meta, VerseMetadata { chapter: 2, verse: 47 });
        assert_eq!(QdrantStore::point_id(meta), 2047);
        assert!(parse_verse_id("BG_two_1").is_none());
        assert!(parse_verse_id("SB_1_1").is_none());
    }

    #[test]
    fn scroll_page_without_offset_ends() {
        let page: Envelope<ScrollResult> = serde_json::from_value(json!({
            "result": {
                "points": [{"id": 2047, "payload": {"doc_id": "BG_2_47", "chapter": 2, "verse": 47, "text": "t"}}],
                "next_page_offset": null
            },
            "status": "ok"
        }))
        .unwrap();
        let page = page.result.unwrap();
        assert!(page.next_page_offset.is_none());
        assert_eq!(documents(page.points)[0].id, "BG_2_47");
    }
}
