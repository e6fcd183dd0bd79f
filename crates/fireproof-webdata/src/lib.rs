//! Fireproof Website Data
//!
//! The boundary to the web engine's website data store. The engine owns
//! cookies, caches and storage; this crate describes what Fireproof needs
//! from it and ships an in-memory store for headless profiles and tests.

mod cookie;
mod error;
mod memory;
mod store;

pub use cookie::{domain_matches, CookieRecord};
pub use error::WebDataError;
pub use memory::InMemoryDataStore;
pub use store::{distant_past, StoreCapabilities, WebsiteDataStore, WebsiteDataType};

pub type Result<T> = std::result::Result<T, WebDataError>;
