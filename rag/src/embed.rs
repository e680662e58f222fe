use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::config::{Config, EMBEDDING_MODEL};
use crate::error::{Error, Result};
use crate::http::HttpClient;

/// Turns text into vectors. Ingestion and retrieval must use the same one.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

pub async fn embed_query(embedder: &dyn Embedder, text: &str) -> Result<Vec<f32>> {
    let vecs = embedder.embed(&[text.to_string()]).await?;
    vecs.into_iter()
        .next()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Embedding("empty query embedding".to_string()))
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
}

/// Hugging Face Inference feature-extraction client.
pub struct HfEmbedder {
    http: Option<HttpClient>,
    url: String,
}

impl HfEmbedder {
    pub fn new(cfg: &Config, http: &HttpClient) -> Self {
        Self {
            http: cfg.hf_token.as_deref().map(|token| http.with_bearer(token)),
            url: format!(
                "{}/hf-inference/models/{}/pipeline/feature-extraction",
                cfg.hf_api_url, EMBEDDING_MODEL
            ),
        }
    }
}

#[async_trait]
impl Embedder for HfEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let http = self.http.as_ref().ok_or(Error::MissingToken)?;
        let req = FeatureExtractionRequest { inputs: texts };
        let res = http.post_json::<Value, _>(&self.url, &req).await?;
        let vectors = parse_embeddings(&res)?;
        if vectors.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                vectors.len()
            )));
        }
        Ok(vectors)
    }
}

pub(crate) fn parse_embeddings(value: &Value) -> Result<Vec<Vec<f32>>> {
    if let Some(arr) = value.as_array() {
        if arr.is_empty() {
            return Ok(vec![]);
        }
        if arr[0].is_array() {
            let mut out = Vec::with_capacity(arr.len());
            for row in arr {
                out.push(parse_vec(row)?);
            }
            return Ok(out);
        }
        return Ok(vec![parse_vec(value)?]);
    }
    if let Some(err) = value.get("error") {
        return Err(Error::Embedding(err.to_string()));
    }
    Err(Error::Embedding("invalid embeddings format".to_string()))
}

fn parse_vec(value: &Value) -> Result<Vec<f32>> {
    let arr = value
        .as_array()
        .ok_or_else(|| Error::Embedding("embedding is not an array".to_string()))?;
    let mut out = Vec::with_capacity(arr.len());
    for v in arr {
        let n = v
            .as_f64()
            .ok_or_else(|| Error::Embedding("embedding value is not a number".to_string()))?;
        out.push(n as f32);
    }
    Ok(out)
}
