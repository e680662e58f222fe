use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::build_prompt::Message;
use crate::config::{Config, LLM_MODEL};
use crate::error::{Error, Result};
use crate::http::HttpClient;

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, messages: &[Message]) -> Result<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Chat completions against the Hugging Face router.
pub struct HfChatGenerator {
    http: Option<HttpClient>,
    url: String,
    max_tokens: u32,
    temperature: f32,
}

impl HfChatGenerator {
    pub fn new(cfg: &Config, http: &HttpClient) -> Self {
        Self {
            http: cfg.hf_token.as_deref().map(|token| http.with_bearer(token)),
            url: format!("{}/v1/chat/completions", cfg.hf_api_url),
            max_tokens: cfg.max_new_tokens,
            temperature: cfg.temperature,
        }
    }
}

#[async_trait]
impl Generator for HfChatGenerator {
    async fn generate(&self, messages: &[Message]) -> Result<String> {
        let http = self.http.as_ref().ok_or(Error::MissingToken)?;
        let req = ChatRequest {
            model: LLM_MODEL,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        };
        let res = http.post_json::<ChatResponse, _>(&self.url, &req).await?;
        first_content(res)
    }
}

fn first_content(res: ChatResponse) -> Result<String> {
    res.choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| Error::Generation("model returned no content".to_string()))
}
