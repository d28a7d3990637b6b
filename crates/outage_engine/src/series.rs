use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use engine_logging::harvest_info;
use outage_core::{ItemsPerPage, PageCursor, SeriesPoint, SeriesRequest, SeriesWindow, Step};

use crate::cancel::CancelFlag;
use crate::error::HarvestError;
use crate::fetch::Backend;
use crate::filename::series_filename;
use crate::persist::AtomicFileWriter;
use crate::progress::{HarvestEvent, Phase, ProgressSink};

/// Fetches per-id time series, one bounded page loop per id.
///
/// The window knobs shrink the work: skip-to-present moves the starting
/// offset past already-elapsed hourly points, max-points caps the total even
/// if the server holds more. Batch policy matches the detail harvester:
/// fail-fast on the first failing id.
pub struct SeriesHarvester<'a> {
    backend: &'a dyn Backend,
    sink: &'a dyn ProgressSink,
    delay: Duration,
    items_per_page: ItemsPerPage,
}

impl<'a> SeriesHarvester<'a> {
    pub fn new(
        backend: &'a dyn Backend,
        sink: &'a dyn ProgressSink,
        delay: Duration,
        items_per_page: ItemsPerPage,
    ) -> Self {
        Self {
            backend,
            sink,
            delay,
            items_per_page,
        }
    }

    /// Fetches one id's series within the window, `now` being the instant
    /// skip-to-present is evaluated at.
    pub async fn harvest(
        &self,
        request: &SeriesRequest,
        window: SeriesWindow,
        now: DateTime<Utc>,
    ) -> Result<Vec<SeriesPoint>, HarvestError> {
        let start = window.start_offset(request.interval_start, now);
        let mut cursor = PageCursor::new(self.items_per_page).starting_at(start);
        if let Some(stop) = window.stop_offset(start) {
            cursor = cursor.with_stop_offset(stop);
        }

        let mut points: Vec<SeriesPoint> = Vec::new();
        loop {
            let offset = cursor.offset();
            let page = self
                .backend
                .series_page(&request.detail_id, offset, self.items_per_page.get())
                .await
                .map_err(|source| HarvestError::Fetch {
                    phase: Phase::Series,
                    at: format!("{} offset {offset}", request.detail_id),
                    source,
                })?;

            let returned = page.rows.len() as u64;
            points.extend(
                page.rows
                    .into_iter()
                    .map(|(date, value)| SeriesPoint { date, value }),
            );

            let step = cursor.advance(returned, page.total)?;
            self.sink.emit(HarvestEvent::PageFetched {
                phase: Phase::Series,
                have: cursor.offset(),
                total: page.total,
                progress: cursor.progress(),
            });
            harvest_info!(
                "fetched timeseries {} | progress {} / {}",
                request.detail_id,
                cursor.offset(),
                page.total
            );

            if let Step::Done = step {
                break;
            }
        }

        // The final page may overshoot the cap; trim to the window.
        if let Some(max) = window.max_points {
            points.truncate(max as usize);
        }
        Ok(points)
    }

    /// Fetches a batch of ids sequentially, handing each completed series to
    /// `on_item` before moving on, so a crash loses at most the id in
    /// flight.
    pub async fn harvest_batch(
        &self,
        requests: &[SeriesRequest],
        window: SeriesWindow,
        now: DateTime<Utc>,
        cancel: &CancelFlag,
        mut on_item: impl FnMut(&SeriesRequest, Vec<SeriesPoint>) -> Result<(), HarvestError>,
    ) -> Result<(), HarvestError> {
        let total = requests.len() as u64;
        for (index, request) in requests.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(HarvestError::Cancelled);
            }
            if index > 0 {
                tokio::time::sleep(self.delay).await;
            }

            let points = self.harvest(request, window, now).await?;
            on_item(request, points)?;

            self.sink.emit(HarvestEvent::ItemCompleted {
                phase: Phase::Series,
                detail_id: request.detail_id.clone(),
                have: index as u64 + 1,
                total,
            });
        }
        harvest_info!("time series download completed");
        Ok(())
    }
}

/// Writes one id's series artifact: `<session>_<detailId>.csv` with
/// `date,value` columns. Written atomically so the recovery planner never
/// mistakes a torn file for completed work.
pub fn write_series_artifact(
    output_dir: &Path,
    session: &str,
    detail_id: &str,
    points: &[SeriesPoint],
) -> Result<PathBuf, HarvestError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for point in points {
        writer.serialize(point)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| HarvestError::Io(std::io::Error::other(err)))?;

    let path = AtomicFileWriter::new(output_dir.to_path_buf())
        .write(&series_filename(session, detail_id), &bytes)?;
    Ok(path)
}
