//! Fireproof Privacy
//!
//! Cookies the user chose to keep when the browser burns its website data,
//! and the login/other split the cookie dashboard shows.
//!
//! A cookie is protected iff its (domain, name) key is in the protected set.
//! Nothing else decides it.

mod category;
mod protected;

pub use category::CookieCategory;
pub use protected::{ProtectedCookieKey, ProtectedCookies};
