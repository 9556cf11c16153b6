//! Command-line driver for the temperature runtime.
//!
//! Loads content, plays a scripted session against the runtime and prints a
//! JSON report of the final temperature state.
mod config;
mod scenario;

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::CliConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = CliConfig::from_env();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _guard = setup_logging(&config)?;

    let report = scenario::run(&config).await?;
    let json = serde_json::to_string_pretty(&report)?;

    match &config.report_path {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!("Report written to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Setup logging to a session file, optionally mirrored to stderr
fn setup_logging(config: &CliConfig) -> Result<WorkerGuard> {
    let session_id = config.session_id.clone().unwrap_or_else(|| {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        format!("session_{timestamp}")
    });

    let session_log_dir = log_directory().join(&session_id);
    std::fs::create_dir_all(&session_log_dir)?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "thermal.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    let stderr_layer = config.log_to_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!("Logging initialized: session={}", session_id);
    tracing::info!("Log file: {}/thermal.log", session_log_dir.display());

    Ok(guard)
}

/// Platform cache directory for logs, falling back to the working directory.
fn log_directory() -> PathBuf {
    directories::ProjectDirs::from("", "", "thermal")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".thermal"))
        .join("logs")
}
