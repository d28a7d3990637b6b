use std::path::PathBuf;

use thiserror::Error;

use outage_core::{SessionConfigError, StalledPagination};

use crate::fetch::FetchError;
use crate::persist::PersistError;
use crate::progress::Phase;

/// Everything that can end a harvest run.
///
/// The engine never retries on its own; every variant except `Cancelled`
/// is fatal for the run and carries enough context (phase, id, offset) for
/// the recovery planner to resume precisely.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// A fetch failed. Wraps the transport/server condition with the phase
    /// and the id or offset it happened at.
    #[error("{phase} fetch failed at {at}: {source}")]
    Fetch {
        phase: Phase,
        at: String,
        source: FetchError,
    },
    /// The server stopped returning rows before its declared total.
    #[error(transparent)]
    Stalled(#[from] StalledPagination),
    /// A payload did not match the expected shape, even after the documented
    /// compensations.
    #[error("malformed payload for {id}: {message}")]
    ParseShape { id: String, message: String },
    /// Resume was requested but there is nothing to resume from.
    #[error("resume requested but checkpoint {} does not exist", .0.display())]
    MissingCheckpoint(PathBuf),
    /// The user interrupted the run. Reported as "terminated by user", never
    /// as a failure exit.
    #[error("terminated by user")]
    Cancelled,
    #[error(transparent)]
    Config(#[from] SessionConfigError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
