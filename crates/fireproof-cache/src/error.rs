//! Cache manager error types

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache clear failed: {0}")]
    ClearFailed(#[from] ClearFailure),

    #[error("Data store error: {0}")]
    DataStore(#[from] fireproof_webdata::WebDataError),

    #[error("Storage error: {0}")]
    Storage(#[from] fireproof_storage::StorageError),

    #[error("Data store did not respond within {0:?}")]
    Timeout(Duration),
}

/// Step of a clear that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearPhase {
    Snapshot,
    Stash,
    Wipe,
    Replay,
    /// The clear task ended without reporting (panic or runtime shutdown)
    Interrupted,
}

impl fmt::Display for ClearPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClearPhase::Snapshot => "snapshot",
            ClearPhase::Stash => "stash",
            ClearPhase::Wipe => "wipe",
            ClearPhase::Replay => "replay",
            ClearPhase::Interrupted => "interrupted",
        };
        f.write_str(name)
    }
}

/// Outcome of a failed clear, shared by every caller coalesced onto it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{phase} phase failed: {reason}")]
pub struct ClearFailure {
    pub phase: ClearPhase,
    pub reason: String,
    pub timed_out: bool,
}

impl ClearFailure {
    pub(crate) fn new(phase: ClearPhase, error: CacheError) -> Self {
        Self {
            phase,
            timed_out: matches!(error, CacheError::Timeout(_)),
            reason: error.to_string(),
        }
    }

    pub(crate) fn interrupted(reason: String) -> Self {
        Self {
            phase: ClearPhase::Interrupted,
            reason,
            timed_out: false,
        }
    }
}
