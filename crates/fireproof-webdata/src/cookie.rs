//! Cookie records as reported by the data store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub domain: String,
    pub name: String,
    pub value: String,
    pub path: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub secure: bool,
    pub http_only: bool,
}

impl CookieRecord {
    pub fn new(
        domain: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            value: value.into(),
            path: "/".to_string(),
            expires_at: None,
            secure: false,
            http_only: false,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn with_flags(mut self, secure: bool, http_only: bool) -> Self {
        self.secure = secure;
        self.http_only = http_only;
        self
    }

    /// Session cookies have no expiry and die with the browsing session
    pub fn is_session(&self) -> bool {
        self.expires_at.is_none()
    }

    /// Whether this cookie would be sent to `host`
    pub fn matches_host(&self, host: &str) -> bool {
        domain_matches(host, &self.domain)
    }
}

/// Check whether `cookie_domain` is `host` itself or one of its parent domains.
///
/// A leading dot on the cookie domain is ignored and the comparison is ASCII
/// case-insensitive. The match must end on a label boundary, so `ample.com`
/// never matches `example.com`.
pub fn domain_matches(host: &str, cookie_domain: &str) -> bool {
    let domain = cookie_domain.trim_start_matches('.').as_bytes();
    let host = host.trim_end_matches('.').as_bytes();

    if domain.is_empty() || host.len() < domain.len() {
        return false;
    }

    let start = host.len() - domain.len();
    if !host[start..].eq_ignore_ascii_case(domain) {
        return false;
    }

    start == 0 || host[start - 1] == b'.'
}
