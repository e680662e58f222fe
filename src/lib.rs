pub mod cli;
pub mod error;
pub mod logging;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{build_router, ServerConfig};
pub use state::AppState;
