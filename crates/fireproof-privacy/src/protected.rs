//! Protected cookie set

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use fireproof_webdata::CookieRecord;

/// Identifies a cookie across value and expiry changes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtectedCookieKey {
    pub domain: String,
    pub name: String,
}

impl ProtectedCookieKey {
    pub fn new(domain: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
        }
    }

    pub fn for_cookie(cookie: &CookieRecord) -> Self {
        Self::new(cookie.domain.clone(), cookie.name.clone())
    }
}

impl fmt::Display for ProtectedCookieKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.domain, self.name)
    }
}

/// Process-lifetime set of cookies the user marked as protected.
///
/// Clones share the same set. Reads and writes go through one lock, so
/// toggling from the UI and filtering during a clear never race.
pub struct ProtectedCookies {
    keys: Arc<RwLock<HashSet<ProtectedCookieKey>>>,
}

impl ProtectedCookies {
    pub fn new() -> Self {
        Self {
            keys: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    pub fn is_protected(&self, cookie: &CookieRecord) -> bool {
        self.contains(&ProtectedCookieKey::for_cookie(cookie))
    }

    pub fn contains(&self, key: &ProtectedCookieKey) -> bool {
        self.keys.read().contains(key)
    }

    /// Protect or unprotect a cookie. Repeating the same call changes nothing.
    pub fn set_protected(&self, cookie: &CookieRecord, protected: bool) {
        let key = ProtectedCookieKey::for_cookie(cookie);
        let changed = if protected {
            self.keys.write().insert(key.clone())
        } else {
            self.keys.write().remove(&key)
        };

        if changed {
            tracing::debug!(cookie = %key, protected, "Updated cookie protection");
        }
    }

    /// Flip protection and return the new state
    pub fn toggle(&self, cookie: &CookieRecord) -> bool {
        let key = ProtectedCookieKey::for_cookie(cookie);
        let mut keys = self.keys.write();
        let protected = if keys.remove(&key) {
            false
        } else {
            keys.insert(key.clone());
            true
        };

        tracing::debug!(cookie = %key, protected, "Toggled cookie protection");
        protected
    }

    /// Split cookies into (keep, discard) under one read of the set.
    ///
    /// Cookies whose domain equals `first_party_domain` are always kept.
    pub fn partition(
        &self,
        cookies: Vec<CookieRecord>,
        first_party_domain: &str,
    ) -> (Vec<CookieRecord>, Vec<CookieRecord>) {
        let keys = self.keys.read();
        cookies.into_iter().partition(|cookie| {
            cookie.domain == first_party_domain
                || keys.contains(&ProtectedCookieKey::for_cookie(cookie))
        })
    }

    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }
}

impl Default for ProtectedCookies {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ProtectedCookies {
    fn clone(&self) -> Self {
        Self {
            keys: Arc::clone(&self.keys),
        }
    }
}
