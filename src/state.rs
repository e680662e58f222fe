use std::sync::Arc;

use rag::{Config, Rag};

/// Shared by every route. Built once in `main`, torn down after the
/// server stops.
pub struct AppState {
    pub rag: Rag,
}

impl AppState {
    pub fn new(rag: Rag) -> Arc<Self> {
        Arc::new(Self { rag })
    }

    pub async fn initialize(config: Config) -> rag::Result<Arc<Self>> {
        let rag = Rag::connect(config).await?;
        Ok(Self::new(rag))
    }

    pub async fn shutdown(&self) {
        self.rag.close().await;
    }
}
