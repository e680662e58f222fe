#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rag::{Config, Embedder, Error, Generator, Message, Rag, Result, SqliteStore};

const DIMS: usize = 64;

/// Bag-of-words hashing embedder: texts sharing words land close together.
pub struct WordHashEmbedder;

#[async_trait]
impl Embedder for WordHashEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| word_hash(t)).collect())
    }
}

fn word_hash(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIMS];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let mut h: u32 = 2166136261;
        for b in word.to_lowercase().bytes() {
            h ^= b as u32;
            h = h.wrapping_mul(16777619);
        }
        v[h as usize % DIMS] += 1.0;
    }
    v
}

#[derive(Default)]
pub struct RecordingGenerator {
    pub seen: Mutex<Vec<Vec<Message>>>,
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn generate(&self, messages: &[Message]) -> Result<String> {
        self.seen.lock().unwrap().push(messages.to_vec());
        Ok("Act without attachment to results.".to_string())
    }
}

pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _messages: &[Message]) -> Result<String> {
        Err(Error::Upstream {
            url: "https://router.huggingface.co/v1/chat/completions".to_string(),
            status: 503,
            body: "model overloaded".to_string(),
        })
    }
}

pub fn write_chapter(data_dir: &Path, chapter: u32, summary: &str) {
    let dir = data_dir.join("chapters");
    fs::create_dir_all(&dir).unwrap();
    let body = serde_json::json!({
        "chapter_number": chapter,
        "name": format!("chapter {}", chapter),
        "summary": { "en": summary, "hi": "" }
    });
    fs::write(dir.join(format!("bhagavadgita_chapter_{}.json", chapter)), body.to_string()).unwrap();
}

pub fn write_verse(data_dir: &Path, chapter: u32, verse: u32, slok: &str, translation: &str, commentary: &str) {
    let dir = data_dir.join("sloks");
    fs::create_dir_all(&dir).unwrap();
    let body = serde_json::json!({
        "_id": format!("BG{}.{}", chapter, verse),
        "chapter": chapter,
        "verse": verse,
        "slok": slok,
        "siva": { "author": "Swami Sivananda", "et": translation },
        "prabhu": { "author": "A.C. Bhaktivedanta Swami Prabhupada", "ec": commentary }
    });
    fs::write(dir.join(format!("bhagavadgita_chapter_{}_slok_{}.json", chapter, verse)), body.to_string()).unwrap();
}

/// A small corpus: three verses of chapter 2 and one of chapter 3.
pub fn sample_corpus(data_dir: &Path) {
    write_chapter(data_dir, 2, "Sankhya Yoga, the yoga of knowledge.");
    write_chapter(data_dir, 3, "Karma Yoga, the yoga of action.");
    write_verse(
        data_dir,
        2,
        47,
        "karmany evadhikaras te ma phalesu kadacana",
        "Thy right is to work only, but never with its fruits.",
        "Perform your duty without attachment to the fruits of work.",
    );
    write_verse(
        data_dir,
        2,
        20,
        "na jayate mriyate va kadacin",
        "The soul is never born nor does it die.",
        "The self is eternal and unborn.",
    );
    write_verse(
        data_dir,
        2,
        14,
        "matra-sparsas tu kaunteya",
        "Heat and cold, pleasure and pain come and go.",
        "Tolerate the senses and their impermanent sensations.",
    );
    write_verse(
        data_dir,
        3,
        8,
        "niyatam kuru karma tvam",
        "Do thou perform thy bounden duty, for action is superior to inaction.",
        "Work is better than idleness.",
    );
}

pub async fn sqlite_rag(db_dir: &Path, generator: Arc<dyn Generator>) -> Rag {
    let config = Config {
        database_path: db_dir.to_path_buf(),
        ..Config::default()
    };
    let store = SqliteStore::open(&config.sqlite_file()).await.unwrap();
    Rag::new(config, Arc::new(store), Arc::new(WordHashEmbedder), generator)
}
