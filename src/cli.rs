use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rag::{Config, Rag};

use crate::server::{self, ServerConfig};
use crate::state::AppState;

const PREVIEW_CHARS: usize = 300;
const DEFAULT_ASK_CONTEXT: &str = "Chapter 2.47: You have a right to perform your prescribed duties, \
but you are not entitled to the fruits of your actions.";

/// Gita GPT: Bhagavad Gita guidance over a local verse index
#[derive(Parser, Debug)]
#[command(name = "gita-gpt")]
#[command(version = rag::VERSION)]
#[command(about = "Ingest the Bhagavad Gita corpus and serve the Gita GPT API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve,

    /// Load the verse and chapter JSON files into the vector store
    Ingest {
        /// Dataset root containing `chapters/` and `sloks/`
        #[arg(long, env = "GITA_DATA_DIR")]
        data_dir: Option<PathBuf>,
    },

    /// Print the verses nearest to a question
    Search {
        question: String,
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Send a question with a hand-written context straight to the model
    Ask {
        question: String,
        #[arg(long)]
        context: Option<String>,
    },
}

pub async fn execute(cli: Cli) -> Result<()> {
    let config = Config::from_env();
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let state = AppState::initialize(config)
                .await
                .context("Failed to initialize application state")?;
            server::serve(state, ServerConfig::from_env()).await
        }
        Commands::Ingest { data_dir } => {
            let data_dir = data_dir.unwrap_or_else(|| config.data_dir.clone());
            let rag = Rag::connect(config).await?;
            let result = rag.ingest(&data_dir).await;
            rag.close().await;
            let report = result.with_context(|| format!("Ingestion from {} failed", data_dir.display()))?;
            println!(
                "Indexed {} verses; the collection now holds {}.",
                report.indexed, report.total_in_store
            );
            Ok(())
        }
        Commands::Search { question, top_k } => {
            let k = top_k.unwrap_or(config.search_top_k);
            let rag = Rag::connect(config).await?;
            let hits = rag.search(&question, k).await.context("Search failed")?;
            println!("User question: {}", question);
            for hit in &hits {
                let meta = hit.document.metadata;
                println!("\n--- Verse {}.{} (score {:.3}) ---", meta.chapter, meta.verse, hit.score);
                println!("{}...", preview(&hit.document.text, PREVIEW_CHARS));
            }
            rag.close().await;
            Ok(())
        }
        Commands::Ask { question, context } => {
            let rag = Rag::connect(config).await?;
            let context = context.unwrap_or_else(|| DEFAULT_ASK_CONTEXT.to_string());
            let answer = rag.ask(&question, &context).await.context("Generation failed")?;
            println!("{}", answer);
            rag.close().await;
            Ok(())
        }
    }
}

fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
