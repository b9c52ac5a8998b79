//! Date-axis labelling and value bounds.
//!
//! Frequent points make full dates unreadable, so only a strided subset of
//! points is labelled, and each label only spells out what changed since the
//! previous labelled point:
//!
//! - first label, or the year changed: `2024-03-01`
//! - the month changed: `04-02`
//! - otherwise: `09`

use chrono::{Datelike, NaiveDate};

/// Labels keyed by point index, in ascending index order.
pub fn date_labels(dates: &[NaiveDate], max_labels: usize) -> Vec<(usize, String)> {
    if dates.is_empty() || max_labels == 0 {
        return Vec::new();
    }

    let stride = dates.len().div_ceil(max_labels).max(1);
    let mut out = Vec::new();
    let mut prev: Option<NaiveDate> = None;

    for (i, &date) in dates.iter().enumerate().step_by(stride) {
        let label = match prev {
            Some(p) if p.year() == date.year() && p.month() == date.month() => date.format("%d"),
            Some(p) if p.year() == date.year() => date.format("%m-%d"),
            _ => date.format("%Y-%m-%d"),
        };
        out.push((i, label.to_string()));
        prev = Some(date);
    }

    out
}

/// Padded `(min, max)` for a set of values; never a zero-width range.
pub fn value_bounds(values: &[f64]) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !(lo.is_finite() && hi.is_finite()) {
        return None;
    }

    let span = hi - lo;
    let pad = if span > 0.0 { span * 0.05 } else { lo.abs().max(1.0) * 0.05 };
    Some((lo - pad, hi + pad))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn labels_compress_within_month_and_year() {
        let dates = [d(2023, 12, 30), d(2023, 12, 31), d(2024, 1, 1), d(2024, 1, 2), d(2024, 2, 1)];
        let labels = date_labels(&dates, 10);
        let text: Vec<&str> = labels.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(text, ["2023-12-30", "31", "2024-01-01", "02", "02-01"]);
        assert_eq!(labels.iter().map(|(i, _)| *i).collect::<Vec<_>>(), [0, 1, 2, 3, 4]);
    }

    #[test]
    fn labels_are_strided_and_compare_to_previous_label() {
        let dates: Vec<NaiveDate> = (0..10).map(|i| d(2024, 3, 1) + chrono::Days::new(i * 4)).collect();
        let labels = date_labels(&dates, 3);
        // stride 4 -> indices 0, 4, 8 -> Mar 1, Mar 17, Apr 2
        assert_eq!(
            labels,
            vec![(0, "2024-03-01".to_string()), (4, "17".to_string()), (8, "04-02".to_string())]
        );
    }

    #[test]
    fn no_dates_no_labels() {
        assert!(date_labels(&[], 12).is_empty());
        assert!(date_labels(&[d(2024, 1, 1)], 0).is_empty());
    }

    #[test]
    fn flat_series_gets_nonzero_bounds() {
        let (lo, hi) = value_bounds(&[50.0, 50.0]).unwrap();
        assert!(lo < 50.0 && hi > 50.0);
        let (lo, hi) = value_bounds(&[0.0]).unwrap();
        assert!(lo < 0.0 && hi > 0.0);
        assert!(value_bounds(&[]).is_none());
    }

    #[test]
    fn bounds_pad_the_range() {
        let (lo, hi) = value_bounds(&[100.0, 200.0]).unwrap();
        assert!((lo - 95.0).abs() < 1e-9);
        assert!((hi - 205.0).abs() < 1e-9);
    }
}
