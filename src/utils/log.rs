//! Operator-facing file logger. Strategy-by-strategy diagnostics land here;
//! the end user only ever sees the short summary or failure line.

use chrono::Local;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

static LOG_DIR: OnceLock<PathBuf> = OnceLock::new();
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Directory the active log file lives in, once the logger is up.
pub fn get_logs_dir() -> Option<PathBuf> {
    LOG_DIR.get().cloned()
}

fn logs_dir() -> io::Result<PathBuf> {
    let base = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
        .map(Ok)
        .unwrap_or_else(std::env::current_dir)?;
    let dir = base.join("logs");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Initializes non-blocking file logging under `logs/` beside the
/// executable, one file per process. Safe to call more than once.
pub fn init_logger() -> io::Result<PathBuf> {
    if let Some(dir) = LOG_DIR.get() {
        return Ok(dir.clone());
    }

    let dir = logs_dir()?;
    let file_name = format!(
        "disk-checker_{}_pid{}.log",
        Local::now().format("%Y-%m-%d_%H-%M-%S"),
        std::process::id()
    );
    let appender = tracing_appender::rolling::never(&dir, &file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer),
        )
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("logger init failed: {e}")))?;

    let _ = LOG_GUARD.set(guard);
    let _ = LOG_DIR.set(dir.clone());
    info!("Logging to {}", dir.join(&file_name).display());
    Ok(dir)
}
