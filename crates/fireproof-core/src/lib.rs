//! Fireproof Core
//!
//! Wires the privacy services together at startup: configuration, the
//! settings database, the cookie stash and the web cache manager.

mod config;
mod error;
mod services;

pub use config::Config;
pub use error::CoreError;
pub use services::PrivacyServices;

// Re-export components
pub use fireproof_cache::{
    CacheError, ClearFailure, ClearPhase, ClearReport, ClearStrategy, CookieStash,
    MemoryCookieStash, SqliteCookieStash, WebCacheManager,
};
pub use fireproof_dashboard::{
    CookieDetail, CookieRow, CookiesDashboard, DashboardError, ProtectionState,
};
pub use fireproof_privacy::{CookieCategory, ProtectedCookieKey, ProtectedCookies};
pub use fireproof_storage::{Database, StorageError};
pub use fireproof_webdata::{
    CookieRecord, InMemoryDataStore, StoreCapabilities, WebDataError, WebsiteDataStore,
    WebsiteDataType,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
