//! Engine error type.

use thiserror::Error;

/// Errors surfaced by the sync engine.
///
/// A missing weather API key is deliberately not represented here: it means
/// "weather sampling disabled for this world" and is handled as a silent
/// no-op, not a failure.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The configured timezone string does not name a recognized IANA zone.
    /// Surfaced as a configuration warning; running worlds fall back to the
    /// host's local zone.
    #[error("unrecognized timezone: {0}")]
    InvalidZone(String),

    /// An environment is registered in the catalogue but has no forecast
    /// table — the weather data and the environment registry have diverged.
    /// Fatal for the resample that hit it; the previous snapshot is kept.
    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),

    /// Config file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config or catalogue JSON failed to parse.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Shorthand result type for engine operations.
pub type SyncResult<T> = Result<T, SyncError>;
