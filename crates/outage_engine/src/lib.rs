//! Outage engine: backend fetch, harvest phases and recovery.
mod cancel;
mod checkpoint;
mod detail;
mod error;
mod fetch;
mod filename;
mod parse;
mod persist;
mod progress;
mod recover;
mod series;
mod session;
mod table;

pub use cancel::CancelFlag;
pub use checkpoint::{CheckpointRow, CheckpointStore};
pub use detail::DetailHarvester;
pub use error::HarvestError;
pub use fetch::{
    Backend, FetchError, FetchSettings, PortalBackend, SeriesPage, TablePage, TableQuery,
};
pub use filename::{checkpoint_filename, series_filename};
pub use parse::{parse_detail_document, parse_summary_rows, strip_markup};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use progress::{HarvestEvent, NullSink, Phase, ProgressSink};
pub use recover::{plan, RecoveryPlan};
pub use series::{write_series_artifact, SeriesHarvester};
pub use session::{SessionOrchestrator, SessionOutcome};
pub use table::TableHarvester;
