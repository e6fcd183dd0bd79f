//! Clear strategies

use chrono::{DateTime, Utc};
use serde::Serialize;

use fireproof_webdata::StoreCapabilities;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearStrategy {
    /// Snapshot, stash first-party and protected cookies, wipe, replay
    PreserveExceptions,
    /// Wipe everything, first-party and protected cookies included.
    ///
    /// Engines without cookie enumeration leave no other option. This loses
    /// the user's own site cookies; it is a known limitation, not a fix target.
    FullWipe,
}

impl ClearStrategy {
    pub fn for_capabilities(capabilities: StoreCapabilities) -> Self {
        if capabilities.selective_cookie_access {
            ClearStrategy::PreserveExceptions
        } else {
            ClearStrategy::FullWipe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClearStrategy::PreserveExceptions => "preserve_exceptions",
            ClearStrategy::FullWipe => "full_wipe",
        }
    }
}

/// What a finished clear did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearReport {
    pub strategy: ClearStrategy,
    /// Cookies in the store before the wipe
    pub snapshotted: usize,
    pub preserved: usize,
    pub discarded: usize,
    /// Cookies written back to the store during this clear
    pub restored: usize,
    /// Preserved cookies wait in the stash for the next launch
    pub replay_deferred: bool,
    pub cleared_at: DateTime<Utc>,
}
