//! Structured-document layout: one pretty-printed JSON object.
//!
//! ```json
//! {
//!   "container_port_congestion_idx": {
//!     "unit": "%",
//!     "records": [{ "date": "20240301", "value": 50.0 }]
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Dataset, Metric, Record, StorageLayout, Value, is_rate_unit};
use crate::error::AppError;
use crate::store::{SeriesStore, ensure_chronological, read_optional, write_with_backup};

const FILE_NAME: &str = "clarkson.json";

#[derive(Debug, Serialize, Deserialize)]
struct SeriesDoc {
    unit: String,
    records: Vec<RecordDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RecordDoc {
    #[serde(with = "date_key")]
    date: NaiveDate,
    value: Value,
}

pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SeriesStore for DocumentStore {
    fn layout(&self) -> StorageLayout {
        StorageLayout::Document
    }

    fn load(&self) -> Result<Dataset, AppError> {
        let mut dataset = Dataset::empty();
        let Some(bytes) = read_optional(&self.path)? else {
            return Ok(dataset);
        };

        let doc: BTreeMap<String, SeriesDoc> = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::new(2, format!("Invalid series document '{}': {e}", self.path.display())))?;

        for (key, series_doc) in doc {
            let Some(metric) = Metric::from_key(&key) else {
                tracing::warn!(%key, path = %self.path.display(), "ignoring unknown series");
                continue;
            };
            let rate = is_rate_unit(&series_doc.unit);
            let series = dataset.series_mut(metric);
            series.records = series_doc
                .records
                .into_iter()
                .map(|r| Record {
                    date: r.date,
                    value: match r.value {
                        Value::Float(v) if rate => Value::whole(v).unwrap_or(Value::Float(v)),
                        v => v,
                    },
                })
                .collect();
            series.unit = series_doc.unit;
            ensure_chronological(&self.path, metric, series.records.iter().map(|r| r.date))?;
        }

        Ok(dataset)
    }

    fn save(&self, dataset: &Dataset, changed: &[Metric]) -> Result<(), AppError> {
        if changed.is_empty() {
            return Ok(());
        }

        let doc: BTreeMap<&str, SeriesDoc> = dataset
            .iter()
            .map(|s| {
                let records = s
                    .records
                    .iter()
                    .map(|r| RecordDoc {
                        date: r.date,
                        value: r.value,
                    })
                    .collect();
                (
                    s.metric.key(),
                    SeriesDoc {
                        unit: s.unit.clone(),
                        records,
                    },
                )
            })
            .collect();

        let mut bytes = serde_json::to_vec_pretty(&doc)
            .map_err(|e| AppError::new(2, format!("Failed to encode series document: {e}")))?;
        bytes.push(b'\n');
        write_with_backup(&self.path, &bytes)
    }
}

mod date_key {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::domain::{format_date_key, parse_date_key};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_date_key(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date_key(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_date_key;
    use crate::store::backup_path;
    use std::fs;

    fn record(key: &str, value: Value) -> Record {
        Record {
            date: parse_date_key(key).unwrap(),
            value,
        }
    }

    #[test]
    fn missing_document_loads_template() {
        let dir = tempfile::tempdir().unwrap();
        let ds = DocumentStore::new(dir.path()).load().unwrap();
        assert_eq!(ds, Dataset::empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());

        let mut ds = Dataset::empty();
        ds.series_mut(Metric::ClarkSeaIndex).records.push(record("20240301", Value::Int(21250)));
        ds.series_mut(Metric::SeaborneTrade).records.push(record("20240301", Value::Float(12816.3)));
        store.save(&ds, &[Metric::ClarkSeaIndex, Metric::SeaborneTrade]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, ds);
        assert!(matches!(loaded.series(Metric::ClarkSeaIndex).records[0].value, Value::Int(21250)));

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\"date\": \"20240301\""));
        assert!(text.contains("\"unit\": \"$/day\""));
    }

    #[test]
    fn resave_is_byte_identical_and_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let mut ds = Dataset::empty();
        ds.series_mut(Metric::PortCongestion).records.push(record("20240301", Value::Float(50.0)));
        store.save(&ds, &[Metric::PortCongestion]).unwrap();
        let first = fs::read(store.path()).unwrap();

        let loaded = store.load().unwrap();
        store.save(&loaded, &[Metric::PortCongestion]).unwrap();
        assert_eq!(fs::read(store.path()).unwrap(), first);
        assert_eq!(fs::read(backup_path(store.path())).unwrap(), first);
    }

    #[test]
    fn empty_change_set_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        store.save(&Dataset::empty(), &[]).unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn unknown_keys_are_ignored_and_bad_dates_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());

        fs::write(store.path(), r#"{"mystery": {"unit": "x", "records": []}}"#).unwrap();
        assert_eq!(store.load().unwrap(), Dataset::empty());

        fs::write(
            store.path(),
            r#"{"growth": {"unit": "%", "records": [{"date": "2024-03-01", "value": 1.0}]}}"#,
        )
        .unwrap();
        assert_eq!(store.load().unwrap_err().exit_code(), 2);
    }
}
