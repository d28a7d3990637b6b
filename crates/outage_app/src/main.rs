//! `outage_harvest`: config-driven harvest of transmission grid outages.
//!
//! Reads `config.json` (or the path given on the command line), runs one
//! harvest session against the portal, and writes the checkpoint and series
//! artifacts into the configured data directory.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use engine_logging::{harvest_error, harvest_info, LogDestination};
use log::LevelFilter;
use outage_engine::{
    CancelFlag, FetchSettings, HarvestEvent, PortalBackend, ProgressSink, SessionOrchestrator,
    SessionOutcome,
};

use config::AppConfig;

const DEFAULT_CONFIG_FILE: &str = "config.json";

struct CliArgs {
    verbose: bool,
    config_path: PathBuf,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut verbose = false;
    let mut config_path = None;

    for arg in args {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            "-h" | "--help" => return Err(String::new()),
            flag if flag.starts_with('-') => {
                return Err(format!("unknown flag: {flag}"));
            }
            path => {
                if config_path.is_some() {
                    return Err(format!("unexpected argument: {path}"));
                }
                config_path = Some(PathBuf::from(path));
            }
        }
    }

    Ok(CliArgs {
        verbose,
        config_path: config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
    })
}

fn print_usage() {
    eprintln!("usage: outage_harvest [-v|--verbose] [config-file]");
    eprintln!("  config-file defaults to ./{DEFAULT_CONFIG_FILE}");
}

/// Renders harvest progress as plain console lines, one per page or item.
struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn emit(&self, event: HarvestEvent) {
        match event {
            HarvestEvent::PhaseStarted { phase } => println!("{phase} phase started"),
            HarvestEvent::PageFetched {
                phase,
                have,
                total,
                progress,
            } => println!(
                "  {phase}: {have}/{total} rows ({:.0}%)",
                progress * 100.0
            ),
            HarvestEvent::ItemCompleted {
                phase,
                detail_id,
                have,
                total,
            } => println!("  {phase}: [{have}/{total}] {detail_id}"),
            HarvestEvent::PhaseCompleted { phase } => println!("{phase} phase completed"),
        }
    }
}

/// `HH:MM:SS` rendering of an elapsed interval.
fn human_time(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:0>2}:{minutes:0>2}:{seconds:0>2}")
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("{message}");
            }
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let app_config = match AppConfig::load(&args.config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let (destination, level) = if args.verbose {
        (LogDestination::Both, LevelFilter::Debug)
    } else {
        (LogDestination::File, LevelFilter::Info)
    };
    engine_logging::initialize(destination, &app_config.advanced.log_file, level);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(app_config))
}

async fn run(app_config: AppConfig) -> ExitCode {
    let backend = match PortalBackend::new(FetchSettings::default()) {
        Ok(backend) => backend,
        Err(err) => {
            eprintln!("failed to build portal client: {err}");
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancelFlag::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("interrupt received, stopping at the next boundary");
            watcher.cancel();
        }
    });

    let sink = ConsoleSink;
    let orchestrator = SessionOrchestrator::new(
        &backend,
        &sink,
        app_config.session,
        app_config.advanced.data_dir,
        cancel,
    );

    let started = Instant::now();
    match orchestrator.run().await {
        Ok(SessionOutcome::Completed {
            summary_rows,
            series_written,
        }) => {
            harvest_info!("session completed successfully");
            println!(
                "done: {summary_rows} outages, {series_written} series files, total {}",
                human_time(started.elapsed())
            );
            ExitCode::SUCCESS
        }
        Ok(SessionOutcome::AlreadyComplete) => {
            println!("nothing to do: every series artifact is already present");
            ExitCode::SUCCESS
        }
        Ok(SessionOutcome::Terminated { phase }) => {
            harvest_info!("session terminated during the {phase} phase");
            println!(
                "terminated during the {phase} phase after {}",
                human_time(started.elapsed())
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            harvest_error!("session failed: {err}");
            eprintln!("session failed: {err}");
            ExitCode::FAILURE
        }
    }
}
