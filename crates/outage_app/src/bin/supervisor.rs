//! Process-level restart wrapper for long harvest runs.
//!
//! Harvests can die mid-session for reasons outside the program: the
//! connection drops, the portal throttles, the machine sleeps. The
//! supervisor re-runs the given command until it exits cleanly, waiting
//! between attempts, so a crashed session resumes without babysitting.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use tokio::process::Command;

const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(30);

struct SupervisorArgs {
    retry_interval: Duration,
    /// `None` means retry until the command succeeds or the user interrupts.
    max_retries: Option<u32>,
    command: Vec<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<SupervisorArgs, String> {
    let mut retry_interval = DEFAULT_RETRY_INTERVAL;
    let mut max_retries = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--retry-interval" => {
                let value = args
                    .next()
                    .ok_or("--retry-interval needs a value in seconds")?;
                let seconds: u64 = value
                    .parse()
                    .map_err(|_| format!("invalid retry interval: {value}"))?;
                retry_interval = Duration::from_secs(seconds);
            }
            "--max-retries" => {
                let value = args.next().ok_or("--max-retries needs a value")?;
                let count: u32 = value
                    .parse()
                    .map_err(|_| format!("invalid retry count: {value}"))?;
                max_retries = Some(count);
            }
            flag if flag.starts_with("--") => {
                return Err(format!("unknown flag: {flag}"));
            }
            first => {
                let mut command = vec![first.to_string()];
                command.extend(args);
                return Ok(SupervisorArgs {
                    retry_interval,
                    max_retries,
                    command,
                });
            }
        }
    }

    Err("need a command to supervise".to_string())
}

fn human_time(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!(
        "{:0>2}:{:0>2}:{:0>2}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("usage: supervisor [--retry-interval SECS] [--max-retries N] <command> [args...]");
            return ExitCode::FAILURE;
        }
    };

    let started = Instant::now();
    let mut crashes: u32 = 0;

    loop {
        println!("running {} with supervisor", args.command[0]);
        let mut child = match Command::new(&args.command[0])
            .args(&args.command[1..])
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                eprintln!("cannot start {}: {err}", args.command[0]);
                return ExitCode::FAILURE;
            }
        };

        let status = tokio::select! {
            status = child.wait() => status,
            _ = tokio::signal::ctrl_c() => {
                println!("received interrupt, supervisor is going to quit now");
                let _ = child.kill().await;
                return ExitCode::SUCCESS;
            }
        };

        match status {
            Ok(status) if status.success() => {
                println!(
                    "supervised command exited normally, crashed {crashes} times until \
                     completion, took {} of time",
                    human_time(started.elapsed())
                );
                return ExitCode::SUCCESS;
            }
            Ok(status) => {
                crashes += 1;
                println!(
                    "{} crashed with {status}, attempt {crashes}",
                    args.command[0]
                );
            }
            Err(err) => {
                crashes += 1;
                println!("{} could not be awaited: {err}", args.command[0]);
            }
        }

        if let Some(max) = args.max_retries {
            if crashes > max {
                eprintln!("giving up after {max} retries");
                return ExitCode::FAILURE;
            }
        }

        println!(
            "{} will start again in {} seconds",
            args.command[0],
            args.retry_interval.as_secs()
        );
        tokio::select! {
            _ = tokio::time::sleep(args.retry_interval) => {}
            _ = tokio::signal::ctrl_c() => {
                println!("received interrupt, supervisor is going to quit now");
                return ExitCode::SUCCESS;
            }
        }
    }
}
