use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(String),
    #[error("{url} returned {status}: {body}")]
    Upstream {
        url: String,
        status: u16,
        body: String,
    },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("vector store: {0}")]
    Store(String),
    #[error("embedding: {0}")]
    Embedding(String),
    #[error("generation: {0}")]
    Generation(String),
    #[error("{}: {message}", .path.display())]
    Corpus { path: PathBuf, message: String },
    #[error("HUGGINGFACEHUB_API_TOKEN is not set")]
    MissingToken,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        Error::Store(err.to_string())
    }

    pub(crate) fn corpus<E: std::fmt::Display>(path: impl Into<PathBuf>, err: E) -> Self {
        Error::Corpus {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::store(err)
    }
}
