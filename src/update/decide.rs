//! Append / correct / keep decision for one update group.
//!
//! The decider is pure: it sees two dates, two value vectors and a cadence, and
//! says whether the new observation opens a new reporting period (`append`) and
//! whether any value differs from what is stored (`correct`). It only logs.

use chrono::NaiveDate;

use crate::domain::Value;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// At least `cadence_days` elapsed since the last stored date.
    pub append: bool,
    /// Some compared value differs from the stored one.
    pub correct: bool,
}

/// The single storage mutation a decision resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Append,
    Correct,
    Keep,
}

impl Decision {
    /// Append wins over correct; a correction only applies when no append is due.
    pub fn mutation(self) -> Mutation {
        if self.append {
            Mutation::Append
        } else if self.correct {
            Mutation::Correct
        } else {
            Mutation::Keep
        }
    }
}

impl Mutation {
    pub fn as_str(self) -> &'static str {
        match self {
            Mutation::Append => "append",
            Mutation::Correct => "correct",
            Mutation::Keep => "no update",
        }
    }
}

/// Decide how a batch of metrics sharing one date pair should be stored.
///
/// `labels`, `last` and `new` are element-wise; `correct` is set if any element
/// changed. Each changed element is logged as `old -> new`.
pub fn decide(
    labels: &[&str],
    last_date: NaiveDate,
    new_date: NaiveDate,
    last: &[Value],
    new: &[Value],
    cadence_days: i64,
) -> Result<Decision, AppError> {
    if labels.len() != last.len() || last.len() != new.len() {
        return Err(AppError::new(
            2,
            format!(
                "Mismatched decision inputs: {} labels, {} stored values, {} new values.",
                labels.len(),
                last.len(),
                new.len()
            ),
        ));
    }

    let group = labels.join(", ");
    let elapsed = (new_date - last_date).num_days();
    let append = elapsed >= cadence_days;
    if append {
        tracing::info!(%group, %last_date, %new_date, elapsed, "new period, updating");
    } else {
        tracing::info!(%group, %last_date, %new_date, elapsed, "same period, no update");
    }

    let mut correct = false;
    for ((label, old), new) in labels.iter().zip(last).zip(new) {
        if old != new {
            tracing::info!(series = %label, "{old} -> {new}, updating");
            correct = true;
        }
    }

    Ok(Decision { append, correct })
}
