use std::time::Duration;

use engine_logging::harvest_info;
use outage_core::DetailRecord;

use crate::cancel::CancelFlag;
use crate::error::HarvestError;
use crate::fetch::Backend;
use crate::parse::parse_detail_document;
use crate::progress::{HarvestEvent, Phase, ProgressSink};

/// Fetches one detail record per summary row id, strictly in input order.
///
/// Policy: fail-fast. The first hard parse or transport error aborts the
/// whole batch; later ids are never attempted. The inter-request delay is a
/// politeness control and must not be removed or parallelized.
pub struct DetailHarvester<'a> {
    backend: &'a dyn Backend,
    sink: &'a dyn ProgressSink,
    delay: Duration,
}

impl<'a> DetailHarvester<'a> {
    pub fn new(backend: &'a dyn Backend, sink: &'a dyn ProgressSink, delay: Duration) -> Self {
        Self {
            backend,
            sink,
            delay,
        }
    }

    pub async fn harvest_batch(
        &self,
        ids: &[String],
        cancel: &CancelFlag,
    ) -> Result<Vec<DetailRecord>, HarvestError> {
        let total = ids.len() as u64;
        let mut records = Vec::with_capacity(ids.len());

        for (index, detail_id) in ids.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(HarvestError::Cancelled);
            }
            if index > 0 {
                tokio::time::sleep(self.delay).await;
            }

            let document = self
                .backend
                .detail_document(detail_id)
                .await
                .map_err(|source| HarvestError::Fetch {
                    phase: Phase::Detail,
                    at: detail_id.clone(),
                    source,
                })?;
            records.push(parse_detail_document(&document, detail_id)?);

            let have = index as u64 + 1;
            self.sink.emit(HarvestEvent::ItemCompleted {
                phase: Phase::Detail,
                detail_id: detail_id.clone(),
                have,
                total,
            });
            harvest_info!("fetched details for {detail_id} | progress {have} / {total}");
        }

        harvest_info!("details download completed");
        Ok(records)
    }
}
