use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const PROJECT_NAME: &str = "Gita GPT";
pub const VERSION: &str = "1.1.0";

/// Hosted chat model used for answer generation.
pub const LLM_MODEL: &str = "Qwen/Qwen2.5-1.5B-Instruct";
/// Sentence embedding model; ingestion and queries must agree on it.
pub const EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

pub const SYSTEM_PROMPT: &str = "You are 'Gita GPT', a digital embodiment of Lord Krishna's wisdom. \
Your goal is to provide practical life advice rooted deeply in the Bhagavad Gita.\n\n\
RESPONSE STRUCTURE:\n\
1. GROUNDING: Start with a compassionate acknowledgement of the user's struggle.\n\
2. THE VERSE: Quote the most relevant Verse Number (e.g., 2.47) and its Sanskrit or English meaning.\n\
3. THE LESSON: Explain the philosophy behind this verse simply.\n\
4. DHARMA ACTION: Give one practical, modern step the user can take right now.\n\n\
If you are unsure, do not make up verses. Stay silent on things not in the Gita.";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_path: PathBuf,
    pub hf_token: Option<String>,
    pub hf_api_url: String,
    pub qdrant_url: Option<String>,
    pub collection: String,
    pub data_dir: PathBuf,
    pub chat_top_k: usize,
    pub search_top_k: usize,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        // Pick up .env so the token works without a manual `source .env`.
        let _ = dotenvy::dotenv();
        Self {
            database_path: env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./app/db/gita_db")),
            hf_token: non_empty(env::var("HUGGINGFACEHUB_API_TOKEN").ok()),
            hf_api_url: env::var("HF_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://router.huggingface.co".to_string()),
            qdrant_url: non_empty(env::var("QDRANT_URL").ok())
                .map(|url| url.trim_end_matches('/').to_string()),
            collection: env::var("GITA_COLLECTION").unwrap_or_else(|_| "gita_knowledge".to_string()),
            data_dir: env::var("GITA_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/Bhagwat-Gita-Infinity")),
            request_timeout: Duration::from_secs(
                env::var("GITA_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(120),
            ),
            ..Self::default()
        }
    }

    /// Location of the SQLite file backing the local collection.
    pub fn sqlite_file(&self) -> PathBuf {
        self.database_path.join(format!("{}.sqlite3", self.collection))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./app/db/gita_db"),
            hf_token: None,
            hf_api_url: "https://router.huggingface.co".to_string(),
            qdrant_url: None,
            collection: "gita_knowledge".to_string(),
            data_dir: PathBuf::from("data/Bhagwat-Gita-Infinity"),
            chat_top_k: 2,
            search_top_k: 3,
            max_new_tokens: 600,
            temperature: 0.3,
            request_timeout: Duration::from_secs(120),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
