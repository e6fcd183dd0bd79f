//! Dashboard error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Cache error: {0}")]
    Cache(#[from] fireproof_cache::CacheError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
