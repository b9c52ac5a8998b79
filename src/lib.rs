//! `sea-indices` library crate.
//!
//! The binary (`seaidx`) is a thin wrapper around this library so that the
//! value extraction, update decisions and storage rules are testable without
//! network access or spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod logging;
pub mod plot;
pub mod report;
pub mod store;
pub mod update;
