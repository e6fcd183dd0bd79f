//! Fireproof Cookie Dashboard
//!
//! State behind the privacy dashboard's cookie screen: the cookies of the
//! current site split into login and other cookies, one row per cookie, and
//! a tap on a row toggling whether the cookie survives the next clear.
//! Rendering is left to the platform UI.

mod error;
mod screen;

pub use error::DashboardError;
pub use screen::{CookieDetail, CookieRow, CookiesDashboard, ProtectionState};

pub type Result<T> = std::result::Result<T, DashboardError>;
