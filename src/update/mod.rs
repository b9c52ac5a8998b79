//! Incremental update of stored series from a fresh snapshot.
//!
//! One snapshot produces at most one mutation per update group: append a new
//! dated record, overwrite the latest record, or leave the group alone.

use chrono::NaiveDate;

use crate::domain::{Dataset, Metric, Record, Snapshot, UpdateGroup, Value};
use crate::error::AppError;
use crate::store::SeriesStore;

pub mod decide;

pub use decide::{Decision, Mutation, decide};

#[derive(Debug, Clone, PartialEq)]
pub struct GroupOutcome {
    pub label: String,
    pub metrics: Vec<Metric>,
    pub mutation: Mutation,
    /// Date of the record that was written (or would have been, for `Keep`).
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub snapshot: Snapshot,
    pub outcomes: Vec<GroupOutcome>,
}

impl UpdateReport {
    /// Metrics whose series were mutated in this run.
    pub fn changed_metrics(&self) -> Vec<Metric> {
        self.outcomes
            .iter()
            .filter(|o| o.mutation != Mutation::Keep)
            .flat_map(|o| o.metrics.iter().copied())
            .collect()
    }
}

/// Apply one snapshot to one update group of `dataset`.
///
/// A group with no history is appended unconditionally. Otherwise every series
/// of the group must end on the same date, which is compared to the snapshot date.
pub fn update_group(
    dataset: &mut Dataset,
    group: &UpdateGroup,
    snapshot: &Snapshot,
) -> Result<GroupOutcome, AppError> {
    let new_date = snapshot.date();

    let mut new_values = Vec::with_capacity(group.metrics.len());
    let mut units = Vec::with_capacity(group.metrics.len());
    for &metric in &group.metrics {
        let obs = snapshot
            .get(metric)
            .ok_or_else(|| AppError::new(3, format!("Snapshot has no value for {metric}.")))?;
        new_values.push(obs.value);
        units.push(obs.unit.clone());
    }

    let lasts: Vec<Option<&Record>> = group
        .metrics
        .iter()
        .map(|&m| dataset.series(m).last())
        .collect();

    let mutation = if lasts.iter().all(Option::is_none) {
        tracing::info!(group = %group.label, %new_date, "no history, appending first record");
        Mutation::Append
    } else {
        let (last_date, last_values) = shared_last(group, &lasts)?;
        let labels: Vec<&str> = group.metrics.iter().map(|m| m.title()).collect();
        decide(
            &labels,
            last_date,
            new_date,
            &last_values,
            &new_values,
            group.cadence_days,
        )?
        .mutation()
    };

    let mut written_date = new_date;
    for ((&metric, value), unit) in group.metrics.iter().zip(new_values).zip(units) {
        let series = dataset.series_mut(metric);
        match mutation {
            Mutation::Append => {
                series.records.push(Record { date: new_date, value });
                series.unit = unit;
            }
            Mutation::Correct => {
                // Checked non-empty by `shared_last`.
                if let Some(last) = series.records.last_mut() {
                    last.value = value;
                    written_date = last.date;
                }
                series.unit = unit;
            }
            Mutation::Keep => {}
        }
    }

    Ok(GroupOutcome {
        label: group.label.clone(),
        metrics: group.metrics.clone(),
        mutation,
        date: written_date,
    })
}

fn shared_last(
    group: &UpdateGroup,
    lasts: &[Option<&Record>],
) -> Result<(NaiveDate, Vec<Value>), AppError> {
    let mut date = None;
    let mut values = Vec::with_capacity(lasts.len());
    for (metric, last) in group.metrics.iter().zip(lasts) {
        let Some(record) = last else {
            return Err(AppError::new(
                2,
                format!("Group '{}' is inconsistent: {metric} has no records.", group.label),
            ));
        };
        match date {
            None => date = Some(record.date),
            Some(d) if d != record.date => {
                return Err(AppError::new(
                    2,
                    format!(
                        "Group '{}' is inconsistent: {metric} ends on {} but others end on {d}.",
                        group.label, record.date
                    ),
                ));
            }
            Some(_) => {}
        }
        values.push(record.value);
    }
    let date = date.ok_or_else(|| AppError::new(2, format!("Group '{}' is empty.", group.label)))?;
    Ok((date, values))
}

/// Load the store, apply `snapshot` to every update group and persist what changed.
///
/// Files belonging only to unchanged groups are not rewritten.
pub fn apply_snapshot(store: &dyn SeriesStore, snapshot: Snapshot) -> Result<UpdateReport, AppError> {
    let mut dataset = store.load()?;

    let mut outcomes = Vec::new();
    for group in store.layout().update_groups() {
        outcomes.push(update_group(&mut dataset, &group, &snapshot)?);
    }

    let report = UpdateReport { snapshot, outcomes };
    let changed = report.changed_metrics();
    if changed.is_empty() {
        tracing::info!("nothing changed, storage untouched");
    } else {
        store.save(&dataset, &changed)?;
    }

    Ok(report)
}
