//! Tracing subscriber setup and log-file retention.
//!
//! Events go to stderr, and additionally to an append-only text file when one
//! is configured. File lines start with a local `YYYY-MM-DD HH:MM:SS` stamp,
//! which is what `prune_log` keys on.

use std::fs::{File, OpenOptions, create_dir_all};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Mutex;

use chrono::{Duration, Local, NaiveDateTime};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;

use crate::domain::LOG_RETENTION_DAYS;
use crate::error::AppError;

const FILE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%.3f";
const STAMP_PREFIX: &str = "%Y-%m-%d %H:%M:%S";
const STAMP_PREFIX_LEN: usize = 19;

/// Install the global subscriber.
///
/// The log file is pruned first; a pruning failure is logged once the
/// subscriber is up and never stops the run.
pub fn init(log_path: Option<&Path>) -> Result<(), AppError> {
    let mut prune_error = None;
    let mut pruned = 0usize;
    let file = match log_path {
        Some(path) => {
            match prune_log(path, LOG_RETENTION_DAYS, Local::now().naive_local()) {
                Ok(n) => pruned = n,
                Err(e) => prune_error = Some(e),
            }
            Some(open_append(path)?)
        }
        None => None,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = file.map(|f| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_timer(ChronoLocal::new(FILE_TIMESTAMP.to_string()))
            .with_writer(Mutex::new(f))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::new(2, format!("Failed to install logger: {e}")))?;

    if let Some(e) = prune_error {
        tracing::warn!("log maintenance failed: {e}");
    } else if pruned > 0 {
        tracing::debug!(pruned, "old log lines removed");
    }
    Ok(())
}

fn open_append(path: &Path) -> Result<File, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create log dir '{}': {e}", parent.display())))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))
}

/// Drop log entries stamped before `now - retention_days`.
///
/// Lines without a leading stamp belong to the entry above them. Returns the
/// number of lines removed; the file is only rewritten when that is non-zero.
pub fn prune_log(path: &Path, retention_days: i64, now: NaiveDateTime) -> Result<usize, AppError> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(AppError::new(2, format!("Failed to read log '{}': {e}", path.display()))),
    };

    let cutoff = now - Duration::days(retention_days);
    let mut keep = true;
    let mut kept = String::with_capacity(text.len());
    let mut removed = 0usize;

    for line in text.split_inclusive('\n') {
        if let Some(stamp) = line_stamp(line) {
            keep = stamp >= cutoff;
        }
        if keep {
            kept.push_str(line);
        } else {
            removed += 1;
        }
    }

    if removed > 0 {
        std::fs::write(path, kept)
            .map_err(|e| AppError::new(2, format!("Failed to rewrite log '{}': {e}", path.display())))?;
    }
    Ok(removed)
}

fn line_stamp(line: &str) -> Option<NaiveDateTime> {
    let prefix = line.get(..STAMP_PREFIX_LEN)?;
    NaiveDateTime::parse_from_str(prefix, STAMP_PREFIX).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, 15).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn prunes_entries_older_than_retention() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seaidx.log");
        std::fs::write(
            &path,
            "2024-03-01 08:00:00.001  INFO old entry\n\
             continuation of old entry\n\
             2024-03-20 08:00:00.002  INFO recent entry\n\
             2024-04-15 08:00:00.003  WARN today\n",
        )
        .unwrap();

        let removed = prune_log(&path, 30, now()).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "2024-03-20 08:00:00.002  INFO recent entry\n2024-04-15 08:00:00.003  WARN today\n"
        );
    }

    #[test]
    fn untouched_when_nothing_is_old() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seaidx.log");
        let body = "free text without stamp\n2024-04-14 08:00:00.000  INFO fine\n";
        std::fs::write(&path, body).unwrap();

        assert_eq!(prune_log(&path, 30, now()).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), body);
    }

    #[test]
    fn missing_log_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(prune_log(&dir.path().join("none.log"), 30, now()).unwrap(), 0);
    }

    #[test]
    fn stamp_is_read_from_line_prefix() {
        assert!(line_stamp("2024-03-01 08:00:00.001  INFO x").is_some());
        assert!(line_stamp("short").is_none());
        assert!(line_stamp("not a timestamp at all, really").is_none());
    }
}
