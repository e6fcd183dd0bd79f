//! Website data store trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::cookie::CookieRecord;
use crate::Result;

/// Kinds of website data a store can hold and remove
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebsiteDataType {
    Cookies,
    DiskCache,
    MemoryCache,
    FetchCache,
    OfflineWebApplicationCache,
    LocalStorage,
    SessionStorage,
    IndexedDb,
    WebSql,
    ServiceWorkerRegistrations,
}

impl WebsiteDataType {
    pub const ALL: [WebsiteDataType; 10] = [
        WebsiteDataType::Cookies,
        WebsiteDataType::DiskCache,
        WebsiteDataType::MemoryCache,
        WebsiteDataType::FetchCache,
        WebsiteDataType::OfflineWebApplicationCache,
        WebsiteDataType::LocalStorage,
        WebsiteDataType::SessionStorage,
        WebsiteDataType::IndexedDb,
        WebsiteDataType::WebSql,
        WebsiteDataType::ServiceWorkerRegistrations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WebsiteDataType::Cookies => "cookies",
            WebsiteDataType::DiskCache => "disk_cache",
            WebsiteDataType::MemoryCache => "memory_cache",
            WebsiteDataType::FetchCache => "fetch_cache",
            WebsiteDataType::OfflineWebApplicationCache => "offline_web_application_cache",
            WebsiteDataType::LocalStorage => "local_storage",
            WebsiteDataType::SessionStorage => "session_storage",
            WebsiteDataType::IndexedDb => "indexed_db",
            WebsiteDataType::WebSql => "web_sql",
            WebsiteDataType::ServiceWorkerRegistrations => "service_worker_registrations",
        }
    }
}

/// What the underlying engine lets us do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCapabilities {
    /// Individual cookies can be enumerated and inserted
    pub selective_cookie_access: bool,
    /// Inserted cookies take effect right after a wipe instead of on next launch
    pub immediate_replay: bool,
}

impl StoreCapabilities {
    pub fn full() -> Self {
        Self {
            selective_cookie_access: true,
            immediate_replay: true,
        }
    }

    /// Cookies are accessible but must be replayed on the next launch
    pub fn deferred_replay() -> Self {
        Self {
            selective_cookie_access: true,
            immediate_replay: false,
        }
    }

    /// Older engines that can only delete everything
    pub fn wipe_only() -> Self {
        Self {
            selective_cookie_access: false,
            immediate_replay: false,
        }
    }
}

impl Default for StoreCapabilities {
    fn default() -> Self {
        Self::full()
    }
}

/// The earliest instant a store will accept as a removal bound
pub fn distant_past() -> DateTime<Utc> {
    DateTime::<Utc>::MIN_UTC
}

/// The web engine's website data store.
///
/// Calls suspend until the engine responds. No ordering is guaranteed
/// between calls that are outstanding at the same time.
#[async_trait]
pub trait WebsiteDataStore: Send + Sync {
    fn capabilities(&self) -> StoreCapabilities;

    /// All cookies currently held by the store
    async fn all_cookies(&self) -> Result<Vec<CookieRecord>>;

    /// Every data type the store knows how to remove
    async fn data_types(&self) -> Result<HashSet<WebsiteDataType>>;

    /// Remove all data of `types` modified at or after `modified_since`
    async fn remove_data(
        &self,
        types: &HashSet<WebsiteDataType>,
        modified_since: DateTime<Utc>,
    ) -> Result<()>;

    /// Insert or replace a cookie
    async fn set_cookie(&self, cookie: CookieRecord) -> Result<()>;
}
