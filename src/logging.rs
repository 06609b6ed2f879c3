//! Tracing configuration and log routing.
//!
//! Request handlers log to stdout with a compact formatter. When `RUSTY_STUDENTS_LOG_FILE` is
//! set, the same events are also appended to that path through a non-blocking writer. Both this
//! variable and `RUST_LOG` may come from `.env`, which is loaded before the subscriber is built.
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_ENV: &str = "RUSTY_STUDENTS_LOG_FILE";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Configure tracing subscribers for stdout and optional file logging.
///
/// - Loads `.env` first so file-provided `RUST_LOG` and log path settings apply.
/// - Respects `RUST_LOG` for filtering (defaults to `info`).
/// - Installs a compact stdout layer and, when requested, a file layer.
/// - Keeps the non-blocking writer's guard alive for the process lifetime.
/// - Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_tracing() {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    if let Some(writer) = configure_file_writer() {
        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact();

        let _ = registry.with(file_layer).try_init();
    } else {
        let _ = registry.try_init();
    }
}

/// Build a non-blocking writer for the optional log file.
///
/// Returns `None` when `RUSTY_STUDENTS_LOG_FILE` is unset or the file cannot be opened.
fn configure_file_writer() -> Option<NonBlocking> {
    let path = log_file_path(|key| std::env::var(key).ok())?;
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(non_blocking)
        }
        Err(err) => {
            eprintln!("Failed to open log file {path}: {err}");
            None
        }
    }
}

fn log_file_path<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(LOG_FILE_ENV).filter(|value| !value.trim().is_empty())
}
