//! Persisted series storage.
//!
//! Two interchangeable layouts sit behind `SeriesStore`:
//!
//! - `table`: one CSV per update group, sharing a `date` column
//! - `document`: one JSON object keyed by metric
//!
//! The layout is picked once per run (`open_store`). Both backends treat a
//! missing file as empty history, and copy the existing file to `<path>.bak`
//! before overwriting it.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::{Dataset, Metric, StorageLayout};
use crate::error::AppError;

pub mod document;
pub mod table;

pub use document::DocumentStore;
pub use table::TableStore;

pub trait SeriesStore {
    fn layout(&self) -> StorageLayout;

    /// Load every series. Missing files yield empty series.
    fn load(&self) -> Result<Dataset, AppError>;

    /// Persist the series in `changed`. Files holding none of them are left as-is.
    fn save(&self, dataset: &Dataset, changed: &[Metric]) -> Result<(), AppError>;
}

pub fn open_store(layout: StorageLayout, data_dir: &Path) -> Box<dyn SeriesStore> {
    match layout {
        StorageLayout::Table => Box::new(TableStore::new(data_dir)),
        StorageLayout::Document => Box::new(DocumentStore::new(data_dir)),
    }
}

/// `<path>.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(".bak");
    PathBuf::from(s)
}

/// Read a file, mapping "not found" to `None`.
fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, AppError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no stored series yet, starting empty");
            Ok(None)
        }
        Err(e) => Err(AppError::new(2, format!("Failed to read '{}': {e}", path.display()))),
    }
}

/// Copy the current file to its backup path, then replace it with `bytes`.
fn write_with_backup(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    if path.exists() {
        let backup = backup_path(path);
        fs::copy(path, &backup).map_err(|e| {
            AppError::new(2, format!("Failed to back up '{}' to '{}': {e}", path.display(), backup.display()))
        })?;
    } else if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", parent.display())))?;
    }

    fs::write(path, bytes).map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", path.display())))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "series file written");
    Ok(())
}

/// Reject histories that are not strictly increasing by date.
fn ensure_chronological(
    path: &Path,
    metric: Metric,
    dates: impl IntoIterator<Item = NaiveDate>,
) -> Result<(), AppError> {
    let mut prev: Option<NaiveDate> = None;
    for date in dates {
        if let Some(p) = prev {
            if date <= p {
                return Err(AppError::new(
                    2,
                    format!(
                        "'{}': {metric} has {date} after {p}; records must be strictly increasing by date.",
                        path.display()
                    ),
                ));
            }
        }
        prev = Some(date);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(backup_path(Path::new("data/clarkson.csv")), PathBuf::from("data/clarkson.csv.bak"));
    }

    #[test]
    fn write_with_backup_keeps_previous_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("s.csv");

        write_with_backup(&path, b"first\n").unwrap();
        assert!(!backup_path(&path).exists());

        write_with_backup(&path, b"second\n").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second\n");
        assert_eq!(fs::read(backup_path(&path)).unwrap(), b"first\n");
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_optional(&dir.path().join("absent.json")).unwrap().is_none());
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let err = ensure_chronological(Path::new("x"), Metric::PortCongestion, [d, d]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
