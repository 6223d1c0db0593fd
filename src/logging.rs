//! Structured logging for beatbars using the tracing crate.
//!
//! Writes to daily-rotated log files under the XDG state directory and never
//! to the terminal, which belongs to the bar display. Old files are pruned at
//! startup so only the most recent week is kept.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

/// File name prefix of every log file.
pub const LOG_FILE_PREFIX: &str = "beatbars.log";

/// Number of daily log files kept.
const MAX_LOG_FILES: usize = 7;

/// Keeps the non-blocking writer alive for the program lifetime.
static APPENDER_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Initializes the logging system with file-based output.
///
/// Log level is controlled by the RUST_LOG environment variable (defaults to "info").
///
/// # Errors
/// - If the log directory cannot be determined or created
/// - If logging was already initialized
pub fn init_logging() -> Result<(), anyhow::Error> {
    let log_dir = log_dir()?;
    fs::create_dir_all(&log_dir)?;

    if let Err(e) = cleanup_old_logs(&log_dir) {
        eprintln!("Warning: Failed to cleanup old logs: {e}");
    }

    let file_appender = rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Logging already initialized"))?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_ansi(false),
        )
        .init();

    tracing::debug!("Logging initialized. Log directory: {}", log_dir.display());
    Ok(())
}

/// Determines the log directory, following the XDG Base Directory Specification.
///
/// Prefers XDG_STATE_HOME if set, otherwise uses ~/.local/state/beatbars.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn log_dir() -> Result<PathBuf, anyhow::Error> {
    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg_state).join("beatbars"));
    }
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home.join(".local/state/beatbars"))
}

/// Returns rotated log files (`beatbars.log.YYYY-MM-DD`), newest first.
fn rotated_logs(log_dir: &Path) -> Result<Vec<PathBuf>, anyhow::Error> {
    let rotated_prefix = format!("{LOG_FILE_PREFIX}.");
    let mut log_files: Vec<_> = fs::read_dir(log_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let file_name = path.file_name()?.to_string_lossy().to_string();
            let date = file_name.strip_prefix(&rotated_prefix)?;
            if date.matches('-').count() != 2 {
                return None;
            }
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((path, modified))
        })
        .collect();

    log_files.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(log_files.into_iter().map(|(path, _)| path).collect())
}

/// Removes all but the most recent `MAX_LOG_FILES` rotated logs.
fn cleanup_old_logs(log_dir: &Path) -> Result<(), anyhow::Error> {
    for path in rotated_logs(log_dir)?.iter().skip(MAX_LOG_FILES) {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to delete old log file {}: {}", path.display(), e);
        }
    }
    Ok(())
}

/// Finds the most recently written log file.
///
/// # Errors
/// - If the directory cannot be read
/// - If it holds no log files
pub fn latest_log(log_dir: &Path) -> Result<PathBuf, anyhow::Error> {
    rotated_logs(log_dir)?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("No log files found in {}", log_dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn touch(dir: &Path, name: &str, age_days: u64) {
        let path = dir.join(name);
        fs::write(&path, name).unwrap();
        let modified = SystemTime::now() - Duration::from_secs(age_days * 86_400);
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
    }

    #[test]
    fn test_cleanup_keeps_newest_week() {
        let dir = tempfile::tempdir().unwrap();
        for day in 1..=10u64 {
            touch(dir.path(), &format!("beatbars.log.2026-01-{day:02}"), 10 - day);
        }
        touch(dir.path(), "unrelated.txt", 30);

        cleanup_old_logs(dir.path()).unwrap();

        let remaining = rotated_logs(dir.path()).unwrap();
        assert_eq!(remaining.len(), MAX_LOG_FILES);
        assert!(remaining[0].ends_with("beatbars.log.2026-01-10"));
        assert!(dir.path().join("unrelated.txt").exists());
        assert!(!dir.path().join("beatbars.log.2026-01-01").exists());
    }

    #[test]
    fn test_latest_log() {
        let dir = tempfile::tempdir().unwrap();
        assert!(latest_log(dir.path()).is_err());

        touch(dir.path(), "beatbars.log.2026-02-01", 2);
        touch(dir.path(), "beatbars.log.2026-02-03", 0);
        assert!(latest_log(dir.path())
            .unwrap()
            .ends_with("beatbars.log.2026-02-03"));
    }
}
