//! Row-oriented CSV layout.
//!
//! ```text
//! date,container_port_congestion_idx
//! 20240301,50
//! ```
//!
//! Each table holds one update group; its value columns share the `date` column,
//! so every series of a table has the same dates.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::domain::{Dataset, Metric, Record, StorageLayout, Value, format_date_key, parse_date_key};
use crate::error::AppError;
use crate::store::{SeriesStore, ensure_chronological, read_optional, write_with_backup};

const DATE_COLUMN: &str = "date";

struct TableFile {
    file: &'static str,
    metrics: &'static [Metric],
}

const TABLES: [TableFile; 2] = [
    TableFile {
        file: "container_port_congestion_idx.csv",
        metrics: &[Metric::PortCongestion],
    },
    TableFile {
        file: "clarkson.csv",
        metrics: &[
            Metric::SeaborneTrade,
            Metric::TradeGrowth,
            Metric::ClarkSeaIndex,
            Metric::NewbuildPriceIndex,
            Metric::Co2Emissions,
        ],
    },
];

pub struct TableStore {
    data_dir: PathBuf,
}

impl TableStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
        }
    }

    fn path(&self, table: &TableFile) -> PathBuf {
        self.data_dir.join(table.file)
    }

    fn load_table(&self, table: &TableFile, dataset: &mut Dataset) -> Result<(), AppError> {
        let path = self.path(table);
        let Some(bytes) = read_optional(&path)? else {
            return Ok(());
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(bytes.as_slice());

        let headers = reader
            .headers()
            .map_err(|e| AppError::new(2, format!("Failed to read headers of '{}': {e}", path.display())))?
            .clone();
        let header_map = build_header_map(&headers);

        let date_idx = column(&header_map, DATE_COLUMN, &path)?;
        let value_idx: Vec<usize> = table
            .metrics
            .iter()
            .map(|m| column(&header_map, m.key(), &path))
            .collect::<Result<_, _>>()?;

        for (idx, result) in reader.records().enumerate() {
            // +2: 1-based, after the header row.
            let line = idx + 2;
            let record = result
                .map_err(|e| AppError::new(2, format!("'{}' line {line}: CSV parse error: {e}", path.display())))?;

            let date = parse_date_cell(record.get(date_idx).unwrap_or(""))
                .map_err(|e| AppError::new(2, format!("'{}' line {line}: {e}", path.display())))?;

            for (&metric, &col) in table.metrics.iter().zip(&value_idx) {
                let cell = record.get(col).unwrap_or("");
                let value = Value::parse_for_unit(cell, metric.default_unit()).ok_or_else(|| {
                    AppError::new(
                        2,
                        format!("'{}' line {line}: invalid {} value '{cell}'.", path.display(), metric.key()),
                    )
                })?;
                dataset.series_mut(metric).records.push(Record { date, value });
            }
        }

        for &metric in table.metrics {
            ensure_chronological(&path, metric, dataset.series(metric).records.iter().map(|r| r.date))?;
        }

        Ok(())
    }

    fn save_table(&self, table: &TableFile, dataset: &Dataset) -> Result<(), AppError> {
        let path = self.path(table);
        let columns: Vec<&[Record]> = table
            .metrics
            .iter()
            .map(|&m| dataset.series(m).records.as_slice())
            .collect();

        let rows = columns.first().map_or(0, |c| c.len());
        for (metric, col) in table.metrics.iter().zip(&columns) {
            if col.len() != rows {
                return Err(AppError::new(
                    2,
                    format!("Cannot write '{}': {metric} has {} records, expected {rows}.", path.display(), col.len()),
                ));
            }
        }

        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = vec![DATE_COLUMN];
        header.extend(table.metrics.iter().map(|m| m.key()));
        writer
            .write_record(&header)
            .map_err(|e| AppError::new(2, format!("Failed to write CSV header: {e}")))?;

        for i in 0..rows {
            let date = columns[0][i].date;
            let mut row = vec![format_date_key(date)];
            for (metric, col) in table.metrics.iter().zip(&columns) {
                if col[i].date != date {
                    return Err(AppError::new(
                        2,
                        format!("Cannot write '{}': {metric} row {i} is dated {}, expected {date}.", path.display(), col[i].date),
                    ));
                }
                row.push(col[i].value.to_string());
            }
            writer
                .write_record(&row)
                .map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::new(2, format!("Failed to finish CSV: {e}")))?;
        write_with_backup(&path, &bytes)
    }
}

impl SeriesStore for TableStore {
    fn layout(&self) -> StorageLayout {
        StorageLayout::Table
    }

    fn load(&self) -> Result<Dataset, AppError> {
        let mut dataset = Dataset::empty();
        for table in &TABLES {
            self.load_table(table, &mut dataset)?;
        }
        Ok(dataset)
    }

    fn save(&self, dataset: &Dataset, changed: &[Metric]) -> Result<(), AppError> {
        for table in &TABLES {
            if table.metrics.iter().any(|m| changed.contains(m)) {
                self.save_table(table, dataset)?;
            }
        }
        Ok(())
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
        .collect()
}

fn column(header_map: &HashMap<String, usize>, name: &str, path: &Path) -> Result<usize, AppError> {
    header_map
        .get(name)
        .copied()
        .ok_or_else(|| AppError::new(2, format!("'{}' has no '{name}' column.", path.display())))
}

/// Date cells are `YYYYMMDD`; a trailing `.0` from float-typed writers is accepted.
fn parse_date_cell(cell: &str) -> Result<chrono::NaiveDate, AppError> {
    let cell = cell.trim();
    let key = cell.strip_suffix(".0").unwrap_or(cell);
    parse_date_key(key)
}
