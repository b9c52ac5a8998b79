//! Chart rendering from the stored history.
//!
//! - date-axis labels and value bounds (`axis`)
//! - PNG output via Plotters (`chart`)

pub mod axis;
pub mod chart;

pub use chart::render_charts;
