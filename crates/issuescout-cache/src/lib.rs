// Caching layer
// Keeps API calls down: a short-TTL in-memory cache for request results
// and a SQLite store for per-repository language lists that barely change

pub mod memory;
pub mod store;

pub use memory::RequestCache;
pub use store::LanguageStore;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;
