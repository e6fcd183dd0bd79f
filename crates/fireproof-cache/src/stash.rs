//! Durable side-channel for cookies that must survive a wipe

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rusqlite::types::Type;
use std::collections::BTreeMap;
use std::sync::Arc;

use fireproof_storage::Database;
use fireproof_webdata::CookieRecord;

use crate::Result;

/// Scratch storage outside the website data store.
///
/// Entries are keyed by (domain, name, path); stashing a cookie that is
/// already present replaces it. Every write is all-or-nothing.
pub trait CookieStash: Send + Sync {
    /// Upsert cookies
    fn stash(&self, cookies: &[CookieRecord]) -> Result<()>;

    fn stashed(&self) -> Result<Vec<CookieRecord>>;

    /// Replace the whole stash with `cookies`
    fn replace(&self, cookies: &[CookieRecord]) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Stash backed by the `preserved_cookies` table
pub struct SqliteCookieStash {
    db: Database,
}

impl SqliteCookieStash {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl CookieStash for SqliteCookieStash {
    fn stash(&self, cookies: &[CookieRecord]) -> Result<()> {
        let stashed_at = Utc::now().to_rfc3339();
        Ok(self.db.transaction(|conn| {
            for cookie in cookies {
                insert_cookie(conn, cookie, &stashed_at)?;
            }
            Ok(())
        })?)
    }

    fn stashed(&self) -> Result<Vec<CookieRecord>> {
        Ok(self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT domain, name, path, value, expires_at, secure, http_only
                 FROM preserved_cookies
                 ORDER BY domain, name, path",
            )?;

            // Every row must decode: the stash is emptied right after a replay
            let cookies = stmt
                .query_map([], |row| {
                    let expires_str: Option<String> = row.get(4)?;
                    let expires_at = expires_str
                        .map(|s| {
                            DateTime::parse_from_rfc3339(&s)
                                .map(|dt| dt.with_timezone(&Utc))
                                .map_err(|e| {
                                    rusqlite::Error::FromSqlConversionFailure(
                                        4,
                                        Type::Text,
                                        Box::new(e),
                                    )
                                })
                        })
                        .transpose()?;

                    Ok(CookieRecord {
                        domain: row.get(0)?,
                        name: row.get(1)?,
                        path: row.get(2)?,
                        value: row.get(3)?,
                        expires_at,
                        secure: row.get::<_, i32>(5)? != 0,
                        http_only: row.get::<_, i32>(6)? != 0,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(cookies)
        })?)
    }

    fn replace(&self, cookies: &[CookieRecord]) -> Result<()> {
        let stashed_at = Utc::now().to_rfc3339();
        Ok(self.db.transaction(|conn| {
            conn.execute("DELETE FROM preserved_cookies", [])?;
            for cookie in cookies {
                insert_cookie(conn, cookie, &stashed_at)?;
            }
            Ok(())
        })?)
    }

    fn clear(&self) -> Result<()> {
        Ok(self.db.with_connection(|conn| {
            conn.execute("DELETE FROM preserved_cookies", [])?;
            Ok(())
        })?)
    }
}

impl Clone for SqliteCookieStash {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

fn insert_cookie(
    conn: &rusqlite::Connection,
    cookie: &CookieRecord,
    stashed_at: &str,
) -> fireproof_storage::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO preserved_cookies
         (domain, name, path, value, expires_at, secure, http_only, stashed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            cookie.domain,
            cookie.name,
            cookie.path,
            cookie.value,
            cookie.expires_at.map(|dt| dt.to_rfc3339()),
            cookie.secure as i32,
            cookie.http_only as i32,
            stashed_at,
        ],
    )?;
    Ok(())
}

/// Stash that lives only as long as the process, for ephemeral profiles
pub struct MemoryCookieStash {
    cookies: Arc<RwLock<BTreeMap<(String, String, String), CookieRecord>>>,
}

impl MemoryCookieStash {
    pub fn new() -> Self {
        Self {
            cookies: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl Default for MemoryCookieStash {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryCookieStash {
    fn clone(&self) -> Self {
        Self {
            cookies: Arc::clone(&self.cookies),
        }
    }
}

impl CookieStash for MemoryCookieStash {
    fn stash(&self, cookies: &[CookieRecord]) -> Result<()> {
        let mut stash = self.cookies.write();
        for cookie in cookies {
            stash.insert(slot_for(cookie), cookie.clone());
        }
        Ok(())
    }

    fn stashed(&self) -> Result<Vec<CookieRecord>> {
        Ok(self.cookies.read().values().cloned().collect())
    }

    fn replace(&self, cookies: &[CookieRecord]) -> Result<()> {
        *self.cookies.write() = cookies
            .iter()
            .map(|cookie| (slot_for(cookie), cookie.clone()))
            .collect();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.cookies.write().clear();
        Ok(())
    }
}

fn slot_for(cookie: &CookieRecord) -> (String, String, String) {
    (
        cookie.domain.clone(),
        cookie.name.clone(),
        cookie.path.clone(),
    )
}
