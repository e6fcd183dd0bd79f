//! Cookie inspection screen

use serde::Serialize;
use url::Url;

use fireproof_cache::WebCacheManager;
use fireproof_privacy::CookieCategory;
use fireproof_webdata::CookieRecord;

use crate::error::DashboardError;
use crate::Result;

const SECTIONS: [CookieCategory; 2] = [CookieCategory::Login, CookieCategory::Other];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectionState {
    /// Kept across clears
    Protected,
    /// Goes with the next clear
    Burnable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookieDetail {
    /// "name: value"
    pub name_value: String,
    /// "Expires: ..." for persistent cookies
    pub expires: Option<String>,
    pub state: ProtectionState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CookieRow {
    /// Placeholder shown when a section has no cookies
    Empty,
    Cookie(CookieDetail),
}

pub struct CookiesDashboard {
    cache: WebCacheManager,
    site: Option<Url>,
    login_cookies: Vec<CookieRecord>,
    other_cookies: Vec<CookieRecord>,
}

impl CookiesDashboard {
    pub fn new(cache: WebCacheManager) -> Self {
        Self {
            cache,
            site: None,
            login_cookies: Vec::new(),
            other_cookies: Vec::new(),
        }
    }

    /// Show the cookies of `site`
    pub async fn load(&mut self, site: Url) -> Result<()> {
        self.site = Some(site);
        self.refresh().await
    }

    pub async fn load_str(&mut self, site: &str) -> Result<()> {
        let parsed = Url::parse(site).map_err(|e| DashboardError::InvalidUrl(e.to_string()))?;
        self.load(parsed).await
    }

    /// Re-query the cookies of the current site
    pub async fn refresh(&mut self) -> Result<()> {
        let cookies = match &self.site {
            Some(site) => self.cache.cookies_for_url(site).await?,
            None => Vec::new(),
        };

        let (login, other): (Vec<_>, Vec<_>) = cookies
            .into_iter()
            .partition(|cookie| CookieCategory::of(cookie) == CookieCategory::Login);
        self.login_cookies = login;
        self.other_cookies = other;

        tracing::debug!(
            site = ?self.site.as_ref().map(Url::as_str),
            login = self.login_cookies.len(),
            other = self.other_cookies.len(),
            "Loaded dashboard cookies"
        );

        Ok(())
    }

    pub fn domain_label(&self) -> Option<&str> {
        self.site.as_ref().and_then(|site| site.host_str())
    }

    pub fn cookie_count(&self) -> usize {
        self.login_cookies.len() + self.other_cookies.len()
    }

    pub fn subtitle(&self) -> String {
        format!("{} COOKIES", self.cookie_count())
    }

    pub fn section_count(&self) -> usize {
        SECTIONS.len()
    }

    pub fn section_title(&self, section: usize) -> Option<&'static str> {
        SECTIONS.get(section).map(CookieCategory::title)
    }

    pub fn cookies(&self, category: CookieCategory) -> &[CookieRecord] {
        match category {
            CookieCategory::Login => &self.login_cookies,
            CookieCategory::Other => &self.other_cookies,
        }
    }

    /// Rows in a section; an empty section still shows its placeholder
    pub fn row_count(&self, section: usize) -> usize {
        match SECTIONS.get(section) {
            Some(category) => self.cookies(*category).len().max(1),
            None => 0,
        }
    }

    pub fn row(&self, section: usize, row: usize) -> Option<CookieRow> {
        let cookies = self.cookies(*SECTIONS.get(section)?);
        if cookies.is_empty() {
            return (row == 0).then_some(CookieRow::Empty);
        }

        cookies
            .get(row)
            .map(|cookie| CookieRow::Cookie(self.detail(cookie)))
    }

    /// Toggle protection of the selected cookie and return its new state.
    ///
    /// Selecting a placeholder or an out-of-range row does nothing.
    pub fn select(&self, section: usize, row: usize) -> Option<ProtectionState> {
        let cookie = self.cookies(*SECTIONS.get(section)?).get(row)?;
        let protected = self.cache.toggle_protected(cookie);

        tracing::info!(
            domain = %cookie.domain,
            name = %cookie.name,
            protected,
            "Cookie protection changed from dashboard"
        );

        Some(state_for(protected))
    }

    fn detail(&self, cookie: &CookieRecord) -> CookieDetail {
        CookieDetail {
            name_value: format!("{}: {}", cookie.name, cookie.value),
            expires: cookie
                .expires_at
                .map(|at| format!("Expires: {}", at.format("%Y-%m-%d %H:%M:%S %z"))),
            state: state_for(self.cache.is_protected(cookie)),
        }
    }
}

fn state_for(protected: bool) -> ProtectionState {
    if protected {
        ProtectionState::Protected
    } else {
        ProtectionState::Burnable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    use fireproof_cache::MemoryCookieStash;
    use fireproof_privacy::ProtectedCookies;
    use fireproof_webdata::{InMemoryDataStore, StoreCapabilities};

    fn dashboard_with(store: InMemoryDataStore) -> CookiesDashboard {
        let cache = WebCacheManager::new(
            Arc::new(store),
            Arc::new(MemoryCookieStash::new()),
            ProtectedCookies::new(),
            "duckduckgo.com",
        );
        CookiesDashboard::new(cache)
    }

    fn seeded() -> InMemoryDataStore {
        let store = InMemoryDataStore::default();
        store.insert_cookie(CookieRecord::new("example.com", "session_id", "s1"));
        store.insert_cookie(
            CookieRecord::new("example.com", "_ga", "GA1")
                .with_expiry(Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap()),
        );
        store.insert_cookie(CookieRecord::new("shop.example.com", "user_login", "u"));
        store.insert_cookie(CookieRecord::new("tracker.com", "id", "t"));
        store
    }

    #[tokio::test]
    async fn test_sections() {
        let mut dashboard = dashboard_with(seeded());
        dashboard.load_str("https://shop.example.com/cart").await.unwrap();

        assert_eq!(dashboard.domain_label(), Some("shop.example.com"));
        assert_eq!(dashboard.subtitle(), "3 COOKIES");
        assert_eq!(dashboard.section_count(), 2);
        assert_eq!(dashboard.section_title(0), Some("Login Cookies"));
        assert_eq!(dashboard.section_title(1), Some("Other Cookies"));
        assert_eq!(dashboard.section_title(2), None);
        assert_eq!(dashboard.row_count(0), 2);
        assert_eq!(dashboard.row_count(1), 1);
        assert_eq!(dashboard.row_count(5), 0);
    }

    #[tokio::test]
    async fn test_row_detail() {
        let mut dashboard = dashboard_with(seeded());
        dashboard.load_str("https://example.com").await.unwrap();

        let row = dashboard.row(1, 0).unwrap();
        assert_eq!(
            row,
            CookieRow::Cookie(CookieDetail {
                name_value: "_ga: GA1".to_string(),
                expires: Some("Expires: 2030-01-02 03:04:05 +0000".to_string()),
                state: ProtectionState::Burnable,
            })
        );

        match dashboard.row(0, 0).unwrap() {
            CookieRow::Cookie(detail) => assert!(detail.expires.is_none()),
            CookieRow::Empty => panic!("expected a cookie row"),
        }
        assert_eq!(dashboard.row(1, 1), None);
    }

    #[tokio::test]
    async fn test_empty_sections_show_placeholder() {
        let mut dashboard = dashboard_with(seeded());
        dashboard.load_str("https://nothing-here.org").await.unwrap();

        assert_eq!(dashboard.subtitle(), "0 COOKIES");
        assert_eq!(dashboard.row_count(0), 1);
        assert_eq!(dashboard.row(0, 0), Some(CookieRow::Empty));
        assert_eq!(dashboard.row(0, 1), None);
        assert_eq!(dashboard.select(0, 0), None);
    }

    #[tokio::test]
    async fn test_select_toggles_protection() {
        let mut dashboard = dashboard_with(seeded());
        dashboard.load_str("https://example.com").await.unwrap();

        assert_eq!(dashboard.select(0, 0), Some(ProtectionState::Protected));
        match dashboard.row(0, 0).unwrap() {
            CookieRow::Cookie(detail) => assert_eq!(detail.state, ProtectionState::Protected),
            CookieRow::Empty => panic!("expected a cookie row"),
        }

        assert_eq!(dashboard.select(0, 0), Some(ProtectionState::Burnable));
        assert_eq!(dashboard.select(0, 7), None);
    }

    #[tokio::test]
    async fn test_select_from_two_screens_never_loses_a_toggle() {
        let store = seeded();
        let cache = WebCacheManager::new(
            Arc::new(store),
            Arc::new(MemoryCookieStash::new()),
            ProtectedCookies::new(),
            "duckduckgo.com",
        );
        let mut first = CookiesDashboard::new(cache.clone());
        let mut second = CookiesDashboard::new(cache.clone());
        first.load_str("https://example.com").await.unwrap();
        second.load_str("https://example.com").await.unwrap();

        let handles: Vec<_> = [first, second]
            .into_iter()
            .map(|dashboard| {
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        dashboard.select(0, 0);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // 1000 flips in total land back on the starting state
        let cookie = CookieRecord::new("example.com", "session_id", "s1");
        assert!(!cache.is_protected(&cookie));
    }

    #[tokio::test]
    async fn test_protected_cookie_survives_clear() {
        let store = seeded();
        let mut dashboard = dashboard_with(store.clone());
        dashboard.load_str("https://example.com").await.unwrap();
        dashboard.select(0, 0);

        dashboard.cache.clear().await.unwrap();
        dashboard.refresh().await.unwrap();

        assert_eq!(dashboard.cookie_count(), 1);
        assert_eq!(dashboard.cookies(CookieCategory::Login)[0].name, "session_id");
    }

    #[tokio::test]
    async fn test_wipe_only_store_shows_nothing() {
        let store = InMemoryDataStore::new(StoreCapabilities::wipe_only());
        store.insert_cookie(CookieRecord::new("example.com", "sid", "1"));
        let mut dashboard = dashboard_with(store);
        dashboard.load_str("https://example.com").await.unwrap();

        assert_eq!(dashboard.cookie_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let mut dashboard = dashboard_with(seeded());
        assert!(matches!(
            dashboard.load_str("::not a url::").await,
            Err(DashboardError::InvalidUrl(_))
        ));
    }
}
