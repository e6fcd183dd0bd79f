//! Privacy services container
//!
//! Owns the settings database and the web cache manager. The website data
//! store belongs to the embedding browser and is handed in at startup.

use std::sync::Arc;

use fireproof_cache::{
    ClearReport, CookieStash, MemoryCookieStash, SqliteCookieStash, WebCacheManager,
};
use fireproof_dashboard::CookiesDashboard;
use fireproof_privacy::ProtectedCookies;
use fireproof_storage::Database;
use fireproof_webdata::WebsiteDataStore;

use crate::config::Config;
use crate::Result;

const FIRST_PARTY_DOMAIN_SETTING: &str = "first_party_domain";

pub struct PrivacyServices {
    db: Database,
    cache: WebCacheManager,
}

impl PrivacyServices {
    pub fn new(config: Config, store: Arc<dyn WebsiteDataStore>) -> Result<Self> {
        config.validate()?;

        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        Self::with_database(config, db, store)
    }

    /// Services backed by an in-memory database; nothing survives the process
    pub fn in_memory(config: Config, store: Arc<dyn WebsiteDataStore>) -> Result<Self> {
        config.validate()?;
        let db = Database::open_in_memory()?;
        Self::with_database(config, db, store)
    }

    fn with_database(config: Config, db: Database, store: Arc<dyn WebsiteDataStore>) -> Result<Self> {
        // A valid stored domain overrides the configured default
        let first_party_domain = match db.get_setting(FIRST_PARTY_DOMAIN_SETTING)? {
            Some(stored) if Config::validate_domain(&stored).is_ok() => stored,
            Some(stored) => {
                tracing::warn!(
                    stored = %stored,
                    fallback = %config.first_party_domain,
                    "Ignoring invalid stored first party domain"
                );
                config.first_party_domain.clone()
            }
            None => config.first_party_domain.clone(),
        };

        let stash: Arc<dyn CookieStash> = if config.ephemeral_stash {
            Arc::new(MemoryCookieStash::new())
        } else {
            Arc::new(SqliteCookieStash::new(db.clone()))
        };

        let mut cache =
            WebCacheManager::new(store, stash, ProtectedCookies::new(), &first_party_domain);
        if let Some(timeout) = config.store_timeout() {
            cache = cache.with_store_timeout(timeout);
        }

        tracing::info!(
            first_party_domain = %first_party_domain,
            strategy = cache.strategy().as_str(),
            ephemeral_stash = config.ephemeral_stash,
            "Privacy services created"
        );

        Ok(Self { db, cache })
    }

    /// Finish any clear whose replay was deferred to this launch.
    /// Returns the number of cookies restored.
    pub async fn initialize(&self) -> Result<usize> {
        Ok(self.cache.consume_cookies().await?)
    }

    pub async fn clear(&self) -> Result<ClearReport> {
        Ok(self.cache.clear().await?)
    }

    /// Persist a new first-party domain; applies from the next launch
    pub fn set_first_party_domain(&self, domain: &str) -> Result<()> {
        let domain = domain.trim();
        Config::validate_domain(domain)?;

        self.db.set_setting(FIRST_PARTY_DOMAIN_SETTING, domain)?;
        tracing::info!(first_party_domain = %domain, "Saved first party domain");
        Ok(())
    }

    pub fn dashboard(&self) -> CookiesDashboard {
        CookiesDashboard::new(self.cache.clone())
    }

    pub fn cache_manager(&self) -> &WebCacheManager {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fireproof_webdata::{CookieRecord, InMemoryDataStore, StoreCapabilities};

    fn seeded(capabilities: StoreCapabilities) -> InMemoryDataStore {
        let store = InMemoryDataStore::new(capabilities);
        store.insert_cookie(CookieRecord::new("duckduckgo.com", "x", "1"));
        store.insert_cookie(CookieRecord::new("example.com", "sid", "2"));
        store.insert_cookie(CookieRecord::new("example.com", "other", "3"));
        store.insert_cookie(CookieRecord::new("tracker.com", "y", "4"));
        store
    }

    #[tokio::test]
    async fn test_dashboard_protection_survives_clear() {
        let store = seeded(StoreCapabilities::full());
        let services = PrivacyServices::in_memory(
            Config::new(std::path::PathBuf::from("/unused")),
            Arc::new(store.clone()),
        )
        .unwrap();

        let mut dashboard = services.dashboard();
        dashboard.load_str("https://www.example.com/").await.unwrap();
        // Other section is sorted: "other" then "sid"
        dashboard.select(1, 1).unwrap();

        services.clear().await.unwrap();

        let names: Vec<String> = store
            .cookies()
            .into_iter()
            .map(|c| format!("{}/{}", c.domain, c.name))
            .collect();
        assert_eq!(names, vec!["duckduckgo.com/x", "example.com/sid"]);
    }

    #[tokio::test]
    async fn test_deferred_replay_on_next_launch() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().join("profile"));
        let store = seeded(StoreCapabilities::deferred_replay());

        {
            let services = PrivacyServices::new(config.clone(), Arc::new(store.clone())).unwrap();
            assert_eq!(services.initialize().await.unwrap(), 0);
            let report = services.clear().await.unwrap();
            assert!(report.replay_deferred);
            assert!(store.cookies().is_empty());
        }

        let services = PrivacyServices::new(config, Arc::new(store.clone())).unwrap();
        assert_eq!(services.initialize().await.unwrap(), 1);
        assert_eq!(store.cookies().len(), 1);
    }

    #[tokio::test]
    async fn test_stored_first_party_domain_applies_next_launch() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf());

        {
            let services =
                PrivacyServices::new(config.clone(), Arc::new(InMemoryDataStore::default()))
                    .unwrap();
            services.set_first_party_domain("example.com").unwrap();
            assert!(services.set_first_party_domain("").is_err());
            assert_eq!(services.cache_manager().first_party_domain(), "duckduckgo.com");
        }

        let store = seeded(StoreCapabilities::full());
        let services = PrivacyServices::new(config, Arc::new(store.clone())).unwrap();
        assert_eq!(services.cache_manager().first_party_domain(), "example.com");

        services.clear().await.unwrap();
        assert_eq!(store.cookies().len(), 2);
    }

    #[tokio::test]
    async fn test_first_party_domain_is_saved_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf());

        {
            let services =
                PrivacyServices::new(config.clone(), Arc::new(InMemoryDataStore::default()))
                    .unwrap();
            services.set_first_party_domain("  example.com\n").unwrap();
            assert!(services.set_first_party_domain("exa mple.com").is_err());
        }

        let store = seeded(StoreCapabilities::full());
        let services = PrivacyServices::new(config, Arc::new(store.clone())).unwrap();
        assert_eq!(services.cache_manager().first_party_domain(), "example.com");

        services.clear().await.unwrap();
        assert_eq!(store.cookies().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_stored_domain_falls_back_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf());

        let db = Database::open(&config.database_path).unwrap();
        db.set_setting(FIRST_PARTY_DOMAIN_SETTING, " example.com").unwrap();
        drop(db);

        let store = seeded(StoreCapabilities::full());
        let services = PrivacyServices::new(config, Arc::new(store.clone())).unwrap();
        assert_eq!(services.cache_manager().first_party_domain(), "duckduckgo.com");

        services.clear().await.unwrap();
        assert_eq!(store.cookies().len(), 1);
    }

    #[tokio::test]
    async fn test_ephemeral_stash_and_wipe_only_store() {
        let mut config = Config::new(std::path::PathBuf::from("/unused"));
        config.ephemeral_stash = true;
        config.store_timeout_ms = Some(500);
        let store = seeded(StoreCapabilities::wipe_only());

        let services = PrivacyServices::in_memory(config, Arc::new(store.clone())).unwrap();
        assert_eq!(
            services.cache_manager().strategy(),
            fireproof_cache::ClearStrategy::FullWipe
        );

        services.clear().await.unwrap();
        assert!(store.cookies().is_empty());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = Config::new(std::path::PathBuf::from("/unused"));
        config.first_party_domain = String::new();
        assert!(PrivacyServices::in_memory(config, Arc::new(InMemoryDataStore::default())).is_err());
    }
}
