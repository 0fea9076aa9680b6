//! Logging Initialization
//!
//! Library code logs through the `log` facade. The binary installs a
//! `tracing` registry with:
//! - a human-readable stderr layer (stdout carries command output)
//! - an optional JSON file layer, rolled daily, for later ingestion
//!
//! `SubscriberInitExt::init` also installs the `log` -> `tracing` bridge, so
//! `log` records reach the same sinks.

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log file prefix inside the log directory.
pub const LOG_FILE_NAME: &str = "ontology-rewrite.log";

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize stderr + JSON file logging.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn init(log_dir: &Path, default_level: &str) -> WorkerGuard {
    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("Failed to create logs directory: {}", e);
        }
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(env_filter(default_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(env_filter(default_level));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();

    log::info!(
        "Logging initialized: level={}, dir={}",
        default_level,
        log_dir.display()
    );

    guard
}

/// Initialize stderr-only logging, for runs without a log directory.
pub fn init_stderr_only(default_level: &str) {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(env_filter(default_level));

    tracing_subscriber::registry().with(stderr_layer).init();
}
