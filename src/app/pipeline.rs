//! Shared pipeline steps used by the subcommands.
//!
//! fetch -> decide per update group -> persist, and independently
//! load -> render. Fetching and parsing finish before the store is opened, so
//! a fatal source error never leaves a partial write behind.

use std::path::PathBuf;

use crate::data::SnapshotClient;
use crate::domain::{Config, Dataset, Snapshot};
use crate::error::AppError;
use crate::store::open_store;
use crate::update::{UpdateReport, apply_snapshot};

pub fn fetch_snapshot(config: &Config) -> Result<Snapshot, AppError> {
    let client = SnapshotClient::new(config)?;
    client.fetch_snapshot()
}

/// Fetch one snapshot and apply it to the configured store.
pub fn run_update(config: &Config) -> Result<UpdateReport, AppError> {
    let snapshot = fetch_snapshot(config)?;
    update_from_snapshot(config, snapshot)
}

/// Apply an already fetched snapshot to the configured store.
pub fn update_from_snapshot(config: &Config, snapshot: Snapshot) -> Result<UpdateReport, AppError> {
    let store = open_store(config.layout, &config.data_dir);
    apply_snapshot(store.as_ref(), snapshot)
}

pub fn load_dataset(config: &Config) -> Result<Dataset, AppError> {
    open_store(config.layout, &config.data_dir).load()
}

/// Render every chart from the stored history.
pub fn run_render(config: &Config) -> Result<Vec<PathBuf>, AppError> {
    let dataset = load_dataset(config)?;
    crate::plot::render_charts(&dataset, &config.chart_dir)
}
