//! On-disk layout of the Bhagavad Gita dataset.
//!
//! `<data_dir>/chapters/*.json` carry one chapter summary each and
//! `<data_dir>/sloks/*.json` carry one verse each, with the translations
//! and commentaries keyed by author.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::scan_files::scan_json_files;

pub const NO_TRANSLATION: &str = "No translation";
pub const NO_COMMENTARY: &str = "No commentary";

#[derive(Debug, Deserialize)]
pub struct ChapterFile {
    pub chapter_number: u32,
    pub summary: Summary,
}

#[derive(Debug, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub en: String,
}

#[derive(Debug, Deserialize)]
pub struct VerseFile {
    pub chapter: u32,
    pub verse: u32,
    #[serde(default)]
    pub slok: Option<String>,
    /// Swami Sivananda's English translation.
    #[serde(default)]
    pub siva: Option<Translation>,
    /// A.C. Bhaktivedanta Swami Prabhupada's English commentary.
    #[serde(default)]
    pub prabhu: Option<Commentary>,
}

#[derive(Debug, Deserialize)]
pub struct Translation {
    #[serde(default)]
    pub et: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Commentary {
    #[serde(default)]
    pub ec: Option<String>,
}

impl VerseFile {
    pub fn translation(&self) -> &str {
        self.siva
            .as_ref()
            .and_then(|s| s.et.as_deref())
            .unwrap_or(NO_TRANSLATION)
    }

    pub fn commentary(&self) -> &str {
        self.prabhu
            .as_ref()
            .and_then(|p| p.ec.as_deref())
            .unwrap_or(NO_COMMENTARY)
    }
}

pub fn verse_id(chapter: u32, verse: u32) -> String {
    format!("BG_{}_{}", chapter, verse)
}

/// Builds the text block that gets embedded and returned by verse lookups.
pub fn compose_document(verse: &VerseFile, chapter_summary: &str) -> String {
    let (ch, vr) = (verse.chapter, verse.verse);
    format!(
        "Chapter {ch} Context: {}\nVerse {ch}.{vr}: {}\nEnglish Meaning: {}\nDeep Explanation: {}",
        chapter_summary,
        verse.slok.as_deref().unwrap_or(""),
        verse.translation(),
        verse.commentary(),
    )
}

pub fn load_chapter_summaries(dir: &Path) -> Result<BTreeMap<u32, String>> {
    let mut summaries = BTreeMap::new();
    for path in scan_json_files(dir)? {
        let chapter: ChapterFile = read_json(&path)?;
        summaries.insert(chapter.chapter_number, chapter.summary.en);
    }
    Ok(summaries)
}

pub fn read_verse(path: &Path) -> Result<VerseFile> {
    read_json(path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).map_err(|e| Error::corpus(path, e))?;
    serde_json::from_str(&raw).map_err(|e| Error::corpus(path, e))
}
