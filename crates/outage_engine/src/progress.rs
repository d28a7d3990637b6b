use std::fmt;

/// Harvest phases, in the order the orchestrator visits them. Transitions
/// are strictly forward; no phase is revisited within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Table,
    Detail,
    Checkpoint,
    Series,
    Recover,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Table => "summary table",
            Phase::Detail => "details",
            Phase::Checkpoint => "checkpoint",
            Phase::Series => "time series",
            Phase::Recover => "recovery",
        };
        f.write_str(name)
    }
}

/// Observability events the harvesters emit after each page or item.
///
/// Keeps console/file progress reporting out of the fetch loops; frontends
/// install a sink and render these however they like.
#[derive(Debug, Clone, PartialEq)]
pub enum HarvestEvent {
    PhaseStarted {
        phase: Phase,
    },
    /// One page of a paginated query landed.
    PageFetched {
        phase: Phase,
        have: u64,
        total: u64,
        progress: f64,
    },
    /// One per-id unit (a detail record, or a whole series) completed.
    ItemCompleted {
        phase: Phase,
        detail_id: String,
        have: u64,
        total: u64,
    },
    PhaseCompleted {
        phase: Phase,
    },
}

/// Sink for progress events.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: HarvestEvent);
}

/// A no-op sink for tests and quiet runs.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: HarvestEvent) {}
}
