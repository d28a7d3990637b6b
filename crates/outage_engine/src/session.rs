use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use engine_logging::harvest_info;
use outage_core::{session_name, SeriesRequest, SessionConfig};

use crate::cancel::CancelFlag;
use crate::checkpoint::{CheckpointRow, CheckpointStore};
use crate::detail::DetailHarvester;
use crate::error::HarvestError;
use crate::fetch::{Backend, TableQuery};
use crate::filename::checkpoint_filename;
use crate::persist::ensure_output_dir;
use crate::progress::{HarvestEvent, Phase, ProgressSink};
use crate::recover;
use crate::series::{write_series_artifact, SeriesHarvester};
use crate::table::TableHarvester;

/// How a session ended. Cancellation is an outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed {
        summary_rows: usize,
        series_written: usize,
    },
    /// Resume found every checkpointed id already has its artifact.
    AlreadyComplete,
    /// The user interrupted the run; it stopped at a phase boundary.
    Terminated { phase: Phase },
}

/// Sequences the harvest phases and threads ids and intervals between them.
///
/// Fresh run: Table → Detail (optional) → Checkpoint → Series (optional).
/// Resume: Recover → Series. Transitions are strictly forward; the
/// checkpoint is always durable before the slow series phase starts.
pub struct SessionOrchestrator<'a> {
    backend: &'a dyn Backend,
    sink: &'a dyn ProgressSink,
    config: SessionConfig,
    output_dir: PathBuf,
    cancel: CancelFlag,
}

impl<'a> SessionOrchestrator<'a> {
    pub fn new(
        backend: &'a dyn Backend,
        sink: &'a dyn ProgressSink,
        config: SessionConfig,
        output_dir: PathBuf,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            backend,
            sink,
            config,
            output_dir,
            cancel,
        }
    }

    pub async fn run(&self) -> Result<SessionOutcome, HarvestError> {
        self.config.validate()?;
        ensure_output_dir(&self.output_dir)?;

        let session = session_name(&self.config);
        let checkpoint_path = self.output_dir.join(checkpoint_filename(&session));
        let delay = Duration::from_secs_f64(self.config.request_delay_seconds.max(0.0));

        if self.config.resume {
            return self.resume(&session, &checkpoint_path, delay).await;
        }

        harvest_info!("starting session {session}");

        // Phase 1: summary table.
        self.sink.emit(HarvestEvent::PhaseStarted { phase: Phase::Table });
        let borders = match &self.config.country {
            Some(country) => Some(self.backend.border_values(country).await.map_err(
                |source| HarvestError::Fetch {
                    phase: Phase::Table,
                    at: format!("borders for {country}"),
                    source,
                },
            )?),
            None => None,
        };
        let query = TableQuery::build(&self.config, borders.as_deref());
        let rows = TableHarvester::new(self.backend, self.sink)
            .harvest(&query)
            .await?;
        self.sink
            .emit(HarvestEvent::PhaseCompleted { phase: Phase::Table });
        if self.cancel.is_cancelled() {
            return Ok(SessionOutcome::Terminated { phase: Phase::Table });
        }

        // Phase 2: per-id details, unless skipped.
        let details = if self.config.skip_details {
            None
        } else {
            self.sink.emit(HarvestEvent::PhaseStarted {
                phase: Phase::Detail,
            });
            let ids: Vec<String> = rows.iter().map(|row| row.detail_id.clone()).collect();
            let harvester = DetailHarvester::new(self.backend, self.sink, delay);
            match harvester.harvest_batch(&ids, &self.cancel).await {
                Ok(records) => {
                    self.sink.emit(HarvestEvent::PhaseCompleted {
                        phase: Phase::Detail,
                    });
                    Some(records)
                }
                Err(err) if err.is_cancellation() => {
                    return Ok(SessionOutcome::Terminated {
                        phase: Phase::Detail,
                    })
                }
                Err(err) => return Err(err),
            }
        };

        // Phase 3: checkpoint. Must be durable before the series phase.
        self.sink.emit(HarvestEvent::PhaseStarted {
            phase: Phase::Checkpoint,
        });
        let merged: Vec<CheckpointRow> = match details {
            Some(records) => rows
                .into_iter()
                .zip(records)
                .map(|(summary, detail)| CheckpointRow::merge(summary, Some(detail)))
                .collect(),
            None => rows
                .into_iter()
                .map(|summary| CheckpointRow::merge(summary, None))
                .collect(),
        };
        let checkpoint = CheckpointStore::write(&merged, &self.output_dir, &session)?;
        harvest_info!("checkpoint written to {}", checkpoint.display());
        self.sink.emit(HarvestEvent::PhaseCompleted {
            phase: Phase::Checkpoint,
        });

        if self.config.skip_timeseries {
            return Ok(SessionOutcome::Completed {
                summary_rows: merged.len(),
                series_written: 0,
            });
        }
        if self.cancel.is_cancelled() {
            return Ok(SessionOutcome::Terminated {
                phase: Phase::Checkpoint,
            });
        }

        // Phase 4: time series, persisted id by id.
        let requests: Vec<SeriesRequest> =
            merged.iter().map(CheckpointRow::series_request).collect();
        match self.series_phase(&session, &requests, delay).await {
            Ok(series_written) => Ok(SessionOutcome::Completed {
                summary_rows: merged.len(),
                series_written,
            }),
            Err(err) if err.is_cancellation() => Ok(SessionOutcome::Terminated {
                phase: Phase::Series,
            }),
            Err(err) => Err(err),
        }
    }

    async fn resume(
        &self,
        session: &str,
        checkpoint_path: &Path,
        delay: Duration,
    ) -> Result<SessionOutcome, HarvestError> {
        harvest_info!("resuming session {session}");
        self.sink.emit(HarvestEvent::PhaseStarted {
            phase: Phase::Recover,
        });
        let plan = recover::plan(checkpoint_path, &self.output_dir, session)?;
        self.sink.emit(HarvestEvent::PhaseCompleted {
            phase: Phase::Recover,
        });

        if plan.is_complete() {
            harvest_info!("nothing to resume, all series artifacts are present");
            return Ok(SessionOutcome::AlreadyComplete);
        }

        match self.series_phase(session, &plan.pending, delay).await {
            Ok(series_written) => Ok(SessionOutcome::Completed {
                summary_rows: plan.completed + plan.pending.len(),
                series_written,
            }),
            Err(err) if err.is_cancellation() => Ok(SessionOutcome::Terminated {
                phase: Phase::Series,
            }),
            Err(err) => Err(err),
        }
    }

    async fn series_phase(
        &self,
        session: &str,
        requests: &[SeriesRequest],
        delay: Duration,
    ) -> Result<usize, HarvestError> {
        self.sink.emit(HarvestEvent::PhaseStarted {
            phase: Phase::Series,
        });
        let harvester =
            SeriesHarvester::new(self.backend, self.sink, delay, self.config.items_per_page);
        let window = self.config.series_window();
        let now = Utc::now();

        let mut written = 0usize;
        harvester
            .harvest_batch(requests, window, now, &self.cancel, |request, points| {
                write_series_artifact(&self.output_dir, session, &request.detail_id, &points)?;
                written += 1;
                Ok(())
            })
            .await?;

        self.sink.emit(HarvestEvent::PhaseCompleted {
            phase: Phase::Series,
        });
        Ok(written)
    }
}
