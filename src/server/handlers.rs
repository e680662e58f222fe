use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Path, State};
use axum::response::IntoResponse;
use axum::Json;
use rag::{Answer, VerseMetadata};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;

/// `Json` whose rejections come back as `{"detail": ...}`.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Path` whose rejections come back as `{"detail": ...}`.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerseResponse {
    pub chapter: u32,
    pub verse: u32,
    pub data: String,
    pub metadata: VerseMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChapterResponse {
    pub chapter: u32,
    pub total_verses: usize,
    pub verses: Vec<VerseMetadata>,
}

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to the Chariot of Wisdom. Use /api/chat for guidance or /api/verse for study."
    }))
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ChatRequest>,
) -> Result<Json<Answer>, ApiError> {
    if req.query.trim().is_empty() {
        return Err(ApiError::BadRequest("Query must not be empty.".to_string()));
    }
    let answer = state.rag.answer_query(&req.query).await?;
    tracing::info!(references = ?answer.references, "answered question");
    Ok(Json(answer))
}

/// Raw verse text as stored, without any model in the loop.
pub async fn verse(
    State(state): State<Arc<AppState>>,
    ApiPath((chapter, verse)): ApiPath<(i64, i64)>,
) -> Result<Json<VerseResponse>, ApiError> {
    let not_found =
        || ApiError::NotFound(format!("Verse {}.{} not found in the sacred texts.", chapter, verse));
    // Negative or oversized numbers cannot be stored, so they are simply absent.
    let (Ok(chapter), Ok(verse)) = (u32::try_from(chapter), u32::try_from(verse)) else {
        return Err(not_found());
    };
    let doc = state.rag.verse(chapter, verse).await?.ok_or_else(not_found)?;

    Ok(Json(VerseResponse {
        chapter,
        verse,
        data: doc.text,
        metadata: doc.metadata,
    }))
}

pub async fn chapter(
    State(state): State<Arc<AppState>>,
    ApiPath(chapter_num): ApiPath<i64>,
) -> Result<Json<ChapterResponse>, ApiError> {
    let not_found = || ApiError::NotFound("Chapter not found.".to_string());
    let Ok(chapter_num) = u32::try_from(chapter_num) else {
        return Err(not_found());
    };
    let docs = state.rag.chapter(chapter_num).await?;
    if docs.is_empty() {
        return Err(not_found());
    }

    Ok(Json(ChapterResponse {
        chapter: chapter_num,
        total_verses: docs.len(),
        verses: docs.into_iter().map(|d| d.metadata).collect(),
    }))
}
