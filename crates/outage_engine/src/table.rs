use engine_logging::harvest_info;
use outage_core::{PageCursor, Step, SummaryRow};

use crate::error::HarvestError;
use crate::fetch::{Backend, TableQuery};
use crate::parse::parse_summary_rows;
use crate::progress::{HarvestEvent, Phase, ProgressSink};

/// Drives the page cursor against the summary-table endpoint until the
/// server-declared total is satisfied.
///
/// Partial pages are not resumable mid-phase; on a transport failure the
/// caller retries the whole harvest from offset zero.
pub struct TableHarvester<'a> {
    backend: &'a dyn Backend,
    sink: &'a dyn ProgressSink,
}

impl<'a> TableHarvester<'a> {
    pub fn new(backend: &'a dyn Backend, sink: &'a dyn ProgressSink) -> Self {
        Self { backend, sink }
    }

    pub async fn harvest(&self, query: &TableQuery) -> Result<Vec<SummaryRow>, HarvestError> {
        let mut cursor = PageCursor::new(query.items_per_page);
        let mut rows: Vec<SummaryRow> = Vec::new();

        loop {
            let offset = cursor.offset();
            let page = self
                .backend
                .table_page(query, offset)
                .await
                .map_err(|source| HarvestError::Fetch {
                    phase: Phase::Table,
                    at: format!("offset {offset}"),
                    source,
                })?;

            let mut parsed = parse_summary_rows(&page)?;
            let returned = parsed.len() as u64;
            rows.append(&mut parsed);

            let step = cursor.advance(returned, page.total)?;
            self.sink.emit(HarvestEvent::PageFetched {
                phase: Phase::Table,
                have: cursor.offset(),
                total: page.total,
                progress: cursor.progress(),
            });
            harvest_info!(
                "fetched summary rows | progress {} / {}",
                cursor.offset(),
                page.total
            );

            if let Step::Done = step {
                harvest_info!("summary table download completed");
                return Ok(rows);
            }
        }
    }
}
