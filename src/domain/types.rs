//! Metrics, values and snapshots.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Unit substituted when a fragment carries no unit token.
pub const UNIT_SENTINEL: &str = "index";

/// Marker identifying a currency-per-day rate. Rates are quoted in whole units.
pub const RATE_MARKER: &str = "$/day";

/// Returns `true` when `unit` denotes a currency-per-day rate (case-insensitive).
pub fn is_rate_unit(unit: &str) -> bool {
    unit.to_ascii_lowercase().contains(RATE_MARKER)
}

/// One tracked shipping-market indicator.
///
/// Variant order matches the positional order of the source's `Results` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    SeaborneTrade,
    TradeGrowth,
    ClarkSeaIndex,
    NewbuildPriceIndex,
    Co2Emissions,
    PortCongestion,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::SeaborneTrade,
        Metric::TradeGrowth,
        Metric::ClarkSeaIndex,
        Metric::NewbuildPriceIndex,
        Metric::Co2Emissions,
        Metric::PortCongestion,
    ];

    /// Stable storage key (CSV column name, JSON object key, chart file stem).
    pub fn key(self) -> &'static str {
        match self {
            Metric::SeaborneTrade => "world_seaborne_trade",
            Metric::TradeGrowth => "growth",
            Metric::ClarkSeaIndex => "clarksea_idx",
            Metric::NewbuildPriceIndex => "newbuild_price_idx",
            Metric::Co2Emissions => "co2_emissions",
            Metric::PortCongestion => "container_port_congestion_idx",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Metric::SeaborneTrade => "World Seaborne Trade",
            Metric::TradeGrowth => "World Seaborne Trade YoY",
            Metric::ClarkSeaIndex => "ClarkSea Index",
            Metric::NewbuildPriceIndex => "Newbuild Price Index",
            Metric::Co2Emissions => "CO2 Emissions",
            Metric::PortCongestion => "Container Port Congestion Index",
        }
    }

    /// Unit assumed before any observation has been stored.
    pub fn default_unit(self) -> &'static str {
        match self {
            Metric::SeaborneTrade => "bt",
            Metric::TradeGrowth | Metric::PortCongestion => "%",
            Metric::ClarkSeaIndex => RATE_MARKER,
            Metric::NewbuildPriceIndex | Metric::Co2Emissions => UNIT_SENTINEL,
        }
    }

    /// Minimum elapsed days before a new observation becomes a new record.
    pub fn cadence_days(self) -> i64 {
        match self {
            Metric::PortCongestion => 1,
            _ => 7,
        }
    }

    /// Position of this metric in the source's `Results` array.
    pub fn result_index(self) -> usize {
        self as usize
    }

    pub fn from_key(key: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.key() == key)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A numeric indicator value.
///
/// Rates quoted in currency per day are whole numbers; everything else is a float.
/// Equality is numeric, so `Int(100) == Float(100.0)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Int(v) => v as f64,
            Value::Float(v) => v,
        }
    }

    /// `Int` for a whole `v` that fits in an `i64`, otherwise `None`.
    pub fn whole(v: f64) -> Option<Value> {
        // i64::MAX as f64 rounds up to 2^63, which is already out of range.
        let in_range = v >= i64::MIN as f64 && v < i64::MAX as f64;
        (v.is_finite() && v.fract() == 0.0 && in_range).then(|| Value::Int(v as i64))
    }

    /// Parse a stored cell, typed by the unit it is quoted in.
    pub fn parse_for_unit(raw: &str, unit: &str) -> Option<Value> {
        let raw = raw.trim();
        if is_rate_unit(unit) {
            if let Ok(v) = raw.parse::<i64>() {
                return Some(Value::Int(v));
            }
            // Float-only tools write `12345.0`.
            return Value::whole(raw.parse::<f64>().ok()?);
        }
        let v = raw.parse::<f64>().ok()?;
        if v.is_finite() { Some(Value::Float(v)) } else { None }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
        }
    }
}

/// One fetched metric value.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub metric: Metric,
    pub value: Value,
    pub unit: String,
    pub captured_at: NaiveDateTime,
}

/// All observations from one fetch, sharing one capture timestamp.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub captured_at: NaiveDateTime,
    pub observations: Vec<Observation>,
}

impl Snapshot {
    pub fn date(&self) -> NaiveDate {
        self.captured_at.date()
    }

    pub fn get(&self, metric: Metric) -> Option<&Observation> {
        self.observations.iter().find(|o| o.metric == metric)
    }
}

/// Which persisted layout the store uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageLayout {
    /// One CSV per update group (`clarkson.csv`, `container_port_congestion_idx.csv`).
    Table,
    /// One JSON document keyed by metric (`clarkson.json`).
    Document,
}

/// Metrics decided together against one shared date pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateGroup {
    pub label: String,
    pub metrics: Vec<Metric>,
    pub cadence_days: i64,
}

impl StorageLayout {
    /// Update groups implied by the layout.
    ///
    /// A table shares its date column across all value columns, so the columns of
    /// one table move together. A document keeps one record list per metric.
    pub fn update_groups(self) -> Vec<UpdateGroup> {
        match self {
            StorageLayout::Table => vec![
                UpdateGroup {
                    label: Metric::PortCongestion.key().to_string(),
                    metrics: vec![Metric::PortCongestion],
                    cadence_days: Metric::PortCongestion.cadence_days(),
                },
                UpdateGroup {
                    label: "weekly".to_string(),
                    metrics: Metric::ALL[..5].to_vec(),
                    cadence_days: 7,
                },
            ],
            StorageLayout::Document => Metric::ALL
                .into_iter()
                .map(|m| UpdateGroup {
                    label: m.key().to_string(),
                    metrics: vec![m],
                    cadence_days: m.cadence_days(),
                })
                .collect(),
        }
    }
}
