//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `ct_monitor` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Signal handling and user-facing output
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::process;
use tokio_util::sync::CancellationToken;

use ct_monitor::initialization::init_logger;
use ct_monitor::{
    format_record, list_detections, run_monitor, spawn_signal_listener, Config, Opt,
};

#[tokio::main]
async fn main() -> Result<()> {
    // .env in the current directory, then next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::from(Opt::parse());

    init_logger(&config).context("Failed to initialize logger")?;

    let outcome = if config.list {
        list(&config).await
    } else {
        monitor(config).await
    };

    if let Err(e) = outcome {
        eprintln!("ct_monitor error: {:#}", e);
        process::exit(1);
    }

    // Dropping the runtime would wait on the blocking stdin reader, which only
    // returns once another line or EOF arrives.
    let _ = std::io::stdout().flush();
    process::exit(0);
}

async fn list(config: &Config) -> Result<()> {
    let records = list_detections(config).await?;
    for record in &records {
        println!("{}", format_record(record, &config.log_format)?);
    }
    log::info!(
        "{} detection(s) stored in {}",
        records.len(),
        config.db_path.display()
    );
    Ok(())
}

async fn monitor(config: Config) -> Result<()> {
    let cancel = CancellationToken::new();
    let signal_task = spawn_signal_listener(cancel.clone());

    let result = run_monitor(config, cancel).await;
    signal_task.abort();

    let report = result?;
    eprintln!(
        "Handled {} event{} ({} hostnames): {} new detection{}, {} stored in {} ({:.1}s)",
        report.events,
        if report.events == 1 { "" } else { "s" },
        report.hostnames,
        report.new_detections,
        if report.new_detections == 1 { "" } else { "s" },
        report.stored_detections,
        report.db_path.display(),
        report.elapsed_seconds
    );
    Ok(())
}
