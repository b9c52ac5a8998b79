//! Persisted history: dated records per metric.

use chrono::NaiveDate;

use crate::domain::{Metric, Value};
use crate::error::AppError;

/// Date key format used on disk (`20240301`).
pub const DATE_KEY_FORMAT: &str = "%Y%m%d";

pub fn format_date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parse a `YYYYMMDD` date key.
pub fn parse_date_key(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    if raw.len() != 8 {
        return Err(AppError::new(2, format!("Invalid date key '{raw}'. Expected YYYYMMDD.")));
    }
    NaiveDate::parse_from_str(raw, DATE_KEY_FORMAT)
        .map_err(|e| AppError::new(2, format!("Invalid date key '{raw}': {e}")))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub value: Value,
}

/// Chronological records for one metric. At most one record per date.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub metric: Metric,
    pub unit: String,
    pub records: Vec<Record>,
}

impl Series {
    pub fn empty(metric: Metric) -> Self {
        Self {
            metric,
            unit: metric.default_unit().to_string(),
            records: Vec::new(),
        }
    }

    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }
}

/// Every tracked series, one per metric in `Metric::ALL` order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    series: Vec<Series>,
}

impl Dataset {
    /// Template state: every series present, no records.
    pub fn empty() -> Self {
        Self {
            series: Metric::ALL.into_iter().map(Series::empty).collect(),
        }
    }

    pub fn series(&self, metric: Metric) -> &Series {
        &self.series[metric.result_index()]
    }

    pub fn series_mut(&mut self, metric: Metric) -> &mut Series {
        &mut self.series[metric.result_index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_keys_parse_and_format() {
        let d = parse_date_key("20240301").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(format_date_key(d), "20240301");
    }

    #[test]
    fn malformed_date_keys_are_rejected() {
        assert!(parse_date_key("2024-03-01").is_err());
        assert!(parse_date_key("20241301").is_err());
        assert!(parse_date_key("").is_err());
    }

    #[test]
    fn empty_dataset_has_every_metric() {
        let ds = Dataset::empty();
        for m in Metric::ALL {
            assert_eq!(ds.series(m).metric, m);
            assert!(ds.series(m).last().is_none());
            assert_eq!(ds.series(m).unit, m.default_unit());
        }
    }
}
