//! Fireproof Web Cache Manager
//!
//! Clears all website data while keeping:
//! - cookies of the browser's own first-party domain
//! - cookies the user marked as protected
//!
//! Engines cannot delete cookies selectively, so a clear runs as
//! snapshot -> stash survivors -> wipe everything -> replay survivors.
//! Replay happens right away when the engine allows it, otherwise on the
//! next launch via [`WebCacheManager::consume_cookies`].

mod error;
mod manager;
mod stash;
mod strategy;

pub use error::{CacheError, ClearFailure, ClearPhase};
pub use manager::WebCacheManager;
pub use stash::{CookieStash, MemoryCookieStash, SqliteCookieStash};
pub use strategy::{ClearReport, ClearStrategy};

pub type Result<T> = std::result::Result<T, CacheError>;
