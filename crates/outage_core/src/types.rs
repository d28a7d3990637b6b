use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codes::{AssetType, OutageNature, OutageStatus};

/// One row of the unavailability summary table. Keyed by `detail_id`;
/// immutable once it has been checkpointed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub status: OutageStatus,
    pub nature: OutageNature,
    pub interval_start: DateTime<Utc>,
    pub interval_end: DateTime<Utc>,
    pub in_area: String,
    pub out_area: String,
    /// New net transfer capacity, kept as the backend renders it.
    pub capacity_value: String,
    pub detail_id: String,
}

/// The six detail fields for one summary row, plus the owning id.
///
/// Exactly one exists per id whose detail fetch succeeded; absence means the
/// fetch failed or the detail phase was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub detail_id: String,
    pub comments: String,
    pub reason: String,
    pub code: String,
    pub asset_type: AssetType,
    pub name: String,
    pub location: String,
}

/// One time-series sample: the backend's `"dd.mm.yyyy hh:mm - dd.mm.yyyy
/// hh:mm"` label and its value, both verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: String,
    pub value: String,
}

/// Work item for the series phase. The interval is carried along because
/// skip-to-present offsets are computed from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub detail_id: String,
    pub interval_start: DateTime<Utc>,
    pub interval_end: DateTime<Utc>,
}

impl SeriesRequest {
    pub fn from_summary(row: &SummaryRow) -> Self {
        Self {
            detail_id: row.detail_id.clone(),
            interval_start: row.interval_start,
            interval_end: row.interval_end,
        }
    }
}
