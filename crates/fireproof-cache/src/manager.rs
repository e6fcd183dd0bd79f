//! Web cache manager

use chrono::Utc;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use fireproof_privacy::ProtectedCookies;
use fireproof_webdata::{distant_past, CookieRecord, WebsiteDataStore};

use crate::error::{CacheError, ClearFailure, ClearPhase};
use crate::stash::CookieStash;
use crate::strategy::{ClearReport, ClearStrategy};
use crate::Result;

type ClearOutcome = std::result::Result<ClearReport, ClearFailure>;
type ClearFlight = Shared<BoxFuture<'static, ClearOutcome>>;

pub struct WebCacheManager {
    /// Website data store of the web engine
    store: Arc<dyn WebsiteDataStore>,
    /// Side-channel holding cookies across a wipe
    stash: Arc<dyn CookieStash>,
    protected: ProtectedCookies,
    strategy: ClearStrategy,
    /// The browser's own domain, always kept
    first_party_domain: Arc<str>,
    store_timeout: Option<Duration>,
    /// Clear currently running, joined by concurrent callers
    in_flight: Arc<Mutex<Option<ClearFlight>>>,
    /// Held for the whole of a clear or a replay
    exclusive: Arc<tokio::sync::Mutex<()>>,
}

impl WebCacheManager {
    pub fn new(
        store: Arc<dyn WebsiteDataStore>,
        stash: Arc<dyn CookieStash>,
        protected: ProtectedCookies,
        first_party_domain: &str,
    ) -> Self {
        let strategy = ClearStrategy::for_capabilities(store.capabilities());
        if strategy == ClearStrategy::FullWipe {
            tracing::warn!(
                "Data store cannot enumerate cookies; clearing will not preserve \
                 first-party or protected cookies"
            );
        }

        Self {
            store,
            stash,
            protected,
            strategy,
            first_party_domain: Arc::from(first_party_domain),
            store_timeout: None,
            in_flight: Arc::new(Mutex::new(None)),
            exclusive: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Bound every data store call; an expired call fails the operation
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    pub fn with_strategy(mut self, strategy: ClearStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> ClearStrategy {
        self.strategy
    }

    pub fn first_party_domain(&self) -> &str {
        &self.first_party_domain
    }

    pub fn protected_cookies(&self) -> &ProtectedCookies {
        &self.protected
    }

    pub fn is_protected(&self, cookie: &CookieRecord) -> bool {
        self.protected.is_protected(cookie)
    }

    pub fn set_protected(&self, cookie: &CookieRecord, protected: bool) {
        self.protected.set_protected(cookie, protected);
    }

    /// Flip protection under one lock and return the new state
    pub fn toggle_protected(&self, cookie: &CookieRecord) -> bool {
        self.protected.toggle(cookie)
    }

    /// Cookies the store would send to the URL's host.
    ///
    /// A URL without a host, or a store that cannot enumerate cookies,
    /// yields an empty list.
    pub async fn cookies_for_url(&self, url: &Url) -> Result<Vec<CookieRecord>> {
        let Some(host) = url.host_str() else {
            return Ok(Vec::new());
        };

        if !self.store.capabilities().selective_cookie_access {
            return Ok(Vec::new());
        }

        let cookies = self.with_timeout(self.store.all_cookies()).await?;
        Ok(cookies
            .into_iter()
            .filter(|cookie| cookie.matches_host(host))
            .collect())
    }

    pub async fn cookies_for_str(&self, url: &str) -> Result<Vec<CookieRecord>> {
        match Url::parse(url) {
            Ok(parsed) => self.cookies_for_url(&parsed).await,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Ignoring cookie query for invalid URL");
                Ok(Vec::new())
            }
        }
    }

    /// Clear all website data except first-party and protected cookies.
    ///
    /// Calls made while a clear is running join it and get its result.
    /// The clear runs on its own task, so it finishes even if every caller
    /// stops waiting. Must be called from within a tokio runtime.
    pub async fn clear(&self) -> Result<ClearReport> {
        let flight = {
            let mut slot = self.in_flight.lock();
            if let Some(flight) = slot.as_ref() {
                tracing::debug!("Joining clear already in flight");
                flight.clone()
            } else {
                let flight = self.start_clear();
                *slot = Some(flight.clone());
                flight
            }
        };

        Ok(flight.await?)
    }

    fn start_clear(&self) -> ClearFlight {
        let this = self.clone();
        let task = tokio::spawn(async move {
            let _guard = this.exclusive.lock().await;
            let outcome = this.run_clear().await;
            // Released while still exclusive, so the next caller starts afresh
            this.in_flight.lock().take();
            outcome
        });

        async move {
            task.await
                .unwrap_or_else(|e| Err(ClearFailure::interrupted(e.to_string())))
        }
        .boxed()
        .shared()
    }

    /// Write stashed cookies back into the store and empty the stash.
    ///
    /// Run once at startup to finish a clear whose replay was deferred.
    pub async fn consume_cookies(&self) -> Result<usize> {
        if !self.store.capabilities().selective_cookie_access {
            return Ok(0);
        }

        let _guard = self.exclusive.lock().await;
        let restored = self.replay().await?;
        if restored > 0 {
            tracing::info!(restored, "Restored preserved cookies");
        }
        Ok(restored)
    }

    async fn run_clear(&self) -> std::result::Result<ClearReport, ClearFailure> {
        tracing::info!(strategy = self.strategy.as_str(), "Clearing website data");

        let report = match self.strategy {
            ClearStrategy::FullWipe => {
                self.wipe().await?;
                ClearReport {
                    strategy: self.strategy,
                    snapshotted: 0,
                    preserved: 0,
                    discarded: 0,
                    restored: 0,
                    replay_deferred: false,
                    cleared_at: Utc::now(),
                }
            }
            ClearStrategy::PreserveExceptions => self.preserve_and_clear().await?,
        };

        tracing::info!(
            strategy = report.strategy.as_str(),
            preserved = report.preserved,
            discarded = report.discarded,
            restored = report.restored,
            replay_deferred = report.replay_deferred,
            "Cleared website data"
        );

        Ok(report)
    }

    async fn preserve_and_clear(&self) -> std::result::Result<ClearReport, ClearFailure> {
        let cookies = self
            .with_timeout(self.store.all_cookies())
            .await
            .map_err(|e| ClearFailure::new(ClearPhase::Snapshot, e))?;
        let snapshotted = cookies.len();

        let (keep, discard) = self
            .protected
            .partition(cookies, &self.first_party_domain);

        let previous = self
            .stash
            .stashed()
            .map_err(|e| ClearFailure::new(ClearPhase::Stash, e))?;
        self.stash
            .stash(&keep)
            .map_err(|e| ClearFailure::new(ClearPhase::Stash, e))?;

        if let Err(failure) = self.wipe().await {
            if failure.timed_out {
                // The engine may still finish the wipe; keep survivors for replay
                tracing::warn!("Wipe timed out; keeping stashed cookies for replay");
            } else if let Err(e) = self.stash.replace(&previous) {
                tracing::error!(error = %e, "Failed to roll back cookie stash");
            }
            return Err(failure);
        }

        let immediate = self.store.capabilities().immediate_replay;
        let restored = if immediate {
            self.replay()
                .await
                .map_err(|e| ClearFailure::new(ClearPhase::Replay, e))?
        } else {
            0
        };

        Ok(ClearReport {
            strategy: self.strategy,
            snapshotted,
            preserved: keep.len(),
            discarded: discard.len(),
            restored,
            replay_deferred: !immediate,
            cleared_at: Utc::now(),
        })
    }

    async fn wipe(&self) -> std::result::Result<(), ClearFailure> {
        let types = self
            .with_timeout(self.store.data_types())
            .await
            .map_err(|e| ClearFailure::new(ClearPhase::Wipe, e))?;

        self.with_timeout(self.store.remove_data(&types, distant_past()))
            .await
            .map_err(|e| ClearFailure::new(ClearPhase::Wipe, e))
    }

    /// Insert every stashed cookie, then empty the stash.
    /// On failure the stash is kept for the next attempt.
    async fn replay(&self) -> Result<usize> {
        let cookies = self.stash.stashed()?;
        for cookie in &cookies {
            self.with_timeout(self.store.set_cookie(cookie.clone()))
                .await?;
        }
        self.stash.clear()?;
        Ok(cookies.len())
    }

    async fn with_timeout<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = fireproof_webdata::Result<T>>,
    {
        match self.store_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => Ok(result?),
                Err(_) => Err(CacheError::Timeout(limit)),
            },
            None => Ok(call.await?),
        }
    }
}

impl Clone for WebCacheManager {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            stash: Arc::clone(&self.stash),
            protected: self.protected.clone(),
            strategy: self.strategy,
            first_party_domain: Arc::clone(&self.first_party_domain),
            store_timeout: self.store_timeout,
            in_flight: Arc::clone(&self.in_flight),
            exclusive: Arc::clone(&self.exclusive),
        }
    }
}
