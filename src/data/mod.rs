//! Source data: value extraction and snapshot fetching.

pub mod fetch;
pub mod parser;

pub use fetch::{SearchResponse, SearchResult, SnapshotClient, snapshot_from_response};
pub use parser::{ParsedValue, parse_value};
