//! In-memory website data store
//!
//! Used for headless profiles and as the engine stand-in in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::cookie::CookieRecord;
use crate::error::WebDataError;
use crate::store::{StoreCapabilities, WebsiteDataStore, WebsiteDataType};
use crate::Result;

type CookieSlot = (String, String, String);

#[derive(Debug, Clone)]
struct StoredCookie {
    cookie: CookieRecord,
    modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct DataEntry {
    data_type: WebsiteDataType,
    origin: String,
    modified_at: DateTime<Utc>,
}

pub struct InMemoryDataStore {
    capabilities: StoreCapabilities,
    cookies: Arc<RwLock<HashMap<CookieSlot, StoredCookie>>>,
    /// Non-cookie data (caches, storage) tracked only by type and origin
    entries: Arc<RwLock<Vec<DataEntry>>>,
}

impl InMemoryDataStore {
    pub fn new(capabilities: StoreCapabilities) -> Self {
        Self {
            capabilities,
            cookies: Arc::new(RwLock::new(HashMap::new())),
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Seed a cookie directly, bypassing capability checks
    pub fn insert_cookie(&self, cookie: CookieRecord) {
        let slot = slot_for(&cookie);
        self.cookies.write().insert(
            slot,
            StoredCookie {
                cookie,
                modified_at: Utc::now(),
            },
        );
    }

    /// Record non-cookie data for an origin
    pub fn insert_data(&self, data_type: WebsiteDataType, origin: &str) {
        if data_type == WebsiteDataType::Cookies {
            return;
        }

        self.entries.write().push(DataEntry {
            data_type,
            origin: origin.to_string(),
            modified_at: Utc::now(),
        });
    }

    /// Cookies currently held, sorted by domain then name
    pub fn cookies(&self) -> Vec<CookieRecord> {
        let mut cookies: Vec<CookieRecord> = self
            .cookies
            .read()
            .values()
            .map(|stored| stored.cookie.clone())
            .collect();
        cookies.sort_by(|a, b| (&a.domain, &a.name).cmp(&(&b.domain, &b.name)));
        cookies
    }

    pub fn data_entry_count(&self) -> usize {
        self.entries.read().len()
    }
}

impl Default for InMemoryDataStore {
    fn default() -> Self {
        Self::new(StoreCapabilities::default())
    }
}

impl Clone for InMemoryDataStore {
    fn clone(&self) -> Self {
        Self {
            capabilities: self.capabilities,
            cookies: Arc::clone(&self.cookies),
            entries: Arc::clone(&self.entries),
        }
    }
}

#[async_trait]
impl WebsiteDataStore for InMemoryDataStore {
    fn capabilities(&self) -> StoreCapabilities {
        self.capabilities
    }

    async fn all_cookies(&self) -> Result<Vec<CookieRecord>> {
        if !self.capabilities.selective_cookie_access {
            return Err(WebDataError::Unsupported("cookie enumeration"));
        }

        Ok(self.cookies())
    }

    async fn data_types(&self) -> Result<HashSet<WebsiteDataType>> {
        Ok(WebsiteDataType::ALL.into_iter().collect())
    }

    async fn remove_data(
        &self,
        types: &HashSet<WebsiteDataType>,
        modified_since: DateTime<Utc>,
    ) -> Result<()> {
        if types.contains(&WebsiteDataType::Cookies) {
            self.cookies
                .write()
                .retain(|_, stored| stored.modified_at < modified_since);
        }

        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|entry| {
            let remove = types.contains(&entry.data_type) && entry.modified_at >= modified_since;
            if remove {
                tracing::trace!(
                    origin = %entry.origin,
                    data_type = entry.data_type.as_str(),
                    "Removing website data entry"
                );
            }
            !remove
        });

        tracing::debug!(
            removed_entries = before - entries.len(),
            type_count = types.len(),
            "Removed website data"
        );

        Ok(())
    }

    async fn set_cookie(&self, cookie: CookieRecord) -> Result<()> {
        if !self.capabilities.selective_cookie_access {
            return Err(WebDataError::Unsupported("cookie insertion"));
        }

        if cookie.name.is_empty() {
            return Err(WebDataError::InvalidCookie("empty name".to_string()));
        }
        if cookie.domain.trim_start_matches('.').is_empty() {
            return Err(WebDataError::InvalidCookie(format!(
                "empty domain for cookie {}",
                cookie.name
            )));
        }

        self.insert_cookie(cookie);
        Ok(())
    }
}

fn slot_for(cookie: &CookieRecord) -> CookieSlot {
    (
        cookie.domain.clone(),
        cookie.name.clone(),
        cookie.path.clone(),
    )
}
