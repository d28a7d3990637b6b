use std::collections::HashSet;
use std::fs;
use std::path::Path;

use engine_logging::harvest_info;
use rand::seq::SliceRandom;

use outage_core::SeriesRequest;

use crate::checkpoint::CheckpointStore;
use crate::error::HarvestError;
use crate::filename::series_filename;

/// The series work still outstanding after a crash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryPlan {
    pub pending: Vec<SeriesRequest>,
    /// Checkpointed ids whose artifact already exists on disk.
    pub completed: usize,
}

impl RecoveryPlan {
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Diffs the checkpoint against the series artifacts already on disk and
/// returns the ids still pending, in randomized order.
///
/// Randomizing matters in repeated crash loops: a deterministic order would
/// retry the same "stuck" id first every time.
pub fn plan(
    checkpoint_path: &Path,
    output_dir: &Path,
    session: &str,
) -> Result<RecoveryPlan, HarvestError> {
    if !checkpoint_path.is_file() {
        return Err(HarvestError::MissingCheckpoint(
            checkpoint_path.to_path_buf(),
        ));
    }

    let rows = CheckpointStore::read(checkpoint_path)?;
    let existing = existing_filenames(output_dir)?;

    let mut pending = Vec::new();
    let mut completed = 0usize;
    for row in &rows {
        if existing.contains(&series_filename(session, &row.detail_id)) {
            completed += 1;
        } else {
            pending.push(row.series_request());
        }
    }
    pending.shuffle(&mut rand::rng());

    harvest_info!(
        "recovery plan: {} of {} series artifacts still pending",
        pending.len(),
        rows.len()
    );
    Ok(RecoveryPlan { pending, completed })
}

fn existing_filenames(output_dir: &Path) -> Result<HashSet<String>, HarvestError> {
    if !output_dir.is_dir() {
        return Ok(HashSet::new());
    }
    let mut names = HashSet::new();
    for entry in fs::read_dir(output_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}
