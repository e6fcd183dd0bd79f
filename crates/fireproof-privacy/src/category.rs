//! Cookie classification for the dashboard

use serde::{Deserialize, Serialize};

use fireproof_webdata::CookieRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CookieCategory {
    /// Cookies that most likely keep the user signed in
    Login,
    Other,
}

impl CookieCategory {
    /// Case-sensitive substring match on the cookie name
    pub fn of(cookie: &CookieRecord) -> Self {
        if cookie.name.contains("login") || cookie.name.contains("session") {
            CookieCategory::Login
        } else {
            CookieCategory::Other
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CookieCategory::Login => "Login Cookies",
            CookieCategory::Other => "Other Cookies",
        }
    }
}
