//! Fireproof Storage Layer
//!
//! SQLite-based persistence for state that must outlive a data-store wipe:
//! user settings and the cookies stashed across a cache clear.
//! All multi-row writes are transactional.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
