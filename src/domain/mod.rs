//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the tracked metrics and how they are grouped for updates (`Metric`, `UpdateGroup`)
//! - fetched values and snapshots (`Value`, `Observation`, `Snapshot`)
//! - persisted history (`Record`, `Series`, `Dataset`)
//! - run configuration (`Config`)

pub mod config;
pub mod series;
pub mod types;

pub use config::*;
pub use series::*;
pub use types::*;
