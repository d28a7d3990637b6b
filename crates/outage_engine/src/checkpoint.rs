use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use outage_core::{
    AssetType, DetailRecord, OutageNature, OutageStatus, SeriesRequest, SummaryRow,
};

use crate::error::HarvestError;
use crate::filename::checkpoint_filename;
use crate::persist::AtomicFileWriter;

/// One checkpoint line: a summary row merged with its detail fields.
///
/// The detail columns are empty when the detail phase was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRow {
    pub status: OutageStatus,
    pub nature: OutageNature,
    pub interval_start: DateTime<Utc>,
    pub interval_end: DateTime<Utc>,
    pub in_area: String,
    pub out_area: String,
    pub capacity_value: String,
    pub detail_id: String,
    pub comments: Option<String>,
    pub reason: Option<String>,
    pub code: Option<String>,
    pub asset_type: Option<AssetType>,
    pub name: Option<String>,
    pub location: Option<String>,
}

impl CheckpointRow {
    pub fn merge(summary: SummaryRow, detail: Option<DetailRecord>) -> Self {
        let (comments, reason, code, asset_type, name, location) = match detail {
            Some(detail) => (
                Some(detail.comments),
                Some(detail.reason),
                Some(detail.code),
                Some(detail.asset_type),
                Some(detail.name),
                Some(detail.location),
            ),
            None => (None, None, None, None, None, None),
        };
        Self {
            status: summary.status,
            nature: summary.nature,
            interval_start: summary.interval_start,
            interval_end: summary.interval_end,
            in_area: summary.in_area,
            out_area: summary.out_area,
            capacity_value: summary.capacity_value,
            detail_id: summary.detail_id,
            comments,
            reason,
            code,
            asset_type,
            name,
            location,
        }
    }

    /// The series work item this row implies.
    pub fn series_request(&self) -> SeriesRequest {
        SeriesRequest {
            detail_id: self.detail_id.clone(),
            interval_start: self.interval_start,
            interval_end: self.interval_end,
        }
    }
}

/// Durable table of harvested rows, one per detail id.
///
/// Doubles as the final output and the recovery ledger: it is written before
/// the slow series phase begins, so a crash mid-series still leaves a valid
/// resume point. Written once; the planner only ever reads it.
pub struct CheckpointStore;

impl CheckpointStore {
    pub fn write(
        rows: &[CheckpointRow],
        output_dir: &Path,
        session: &str,
    ) -> Result<PathBuf, HarvestError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in rows {
            writer.serialize(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| HarvestError::Io(std::io::Error::other(err)))?;

        let path = AtomicFileWriter::new(output_dir.to_path_buf())
            .write(&checkpoint_filename(session), &bytes)?;
        Ok(path)
    }

    pub fn read(path: &Path) -> Result<Vec<CheckpointRow>, HarvestError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }
}
