use serde::{Deserialize, Serialize};

use crate::config::SYSTEM_PROMPT;
use crate::store::ScoredDocument;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

pub fn build_prompt(question: &str, context: &str) -> Vec<Message> {
    let user_content = format!("Shastras Context:\n{}\n\nUser Question: {}", context, question);
    vec![Message::system(SYSTEM_PROMPT), Message::user(user_content)]
}

/// Labels every hit with its citation so the model can quote it.
pub fn format_context(hits: &[ScoredDocument]) -> String {
    hits.iter()
        .map(|hit| {
            let meta = hit.document.metadata;
            format!(
                "--- SOURCE: Bhagavad Gita Verse {}.{} ---\nTEXT & COMMENTARY: {}\n--- END OF SOURCE ---",
                meta.chapter, meta.verse, hit.document.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn references(hits: &[ScoredDocument]) -> Vec<String> {
    hits.iter()
        .map(|hit| format!("BG {}.{}", hit.document.metadata.chapter, hit.document.metadata.verse))
        .collect()
}
