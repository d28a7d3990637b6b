//! Outage core: pure pagination, decoding and session logic.
//!
//! Everything in this crate is deterministic and IO-free; the engine crate
//! supplies the network and filesystem around it.
mod codes;
mod cursor;
mod interval;
mod session;
mod types;
mod window;

pub use codes::{AssetType, OutageNature, OutageStatus};
pub use cursor::{ItemsPerPage, PageCursor, PageSizeError, StalledPagination, Step};
pub use interval::{parse_interval, IntervalParseError};
pub use session::{session_name, AreaType, SessionConfig, SessionConfigError, COUNTRIES};
pub use types::{DetailRecord, SeriesPoint, SeriesRequest, SummaryRow};
pub use window::{offset_from_now, SeriesWindow};
