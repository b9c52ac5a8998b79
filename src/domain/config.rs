//! Run configuration shared by the fetch client, store and renderer.

use std::path::PathBuf;

use crate::domain::StorageLayout;

pub const DEFAULT_ENDPOINT: &str = "https://sin.clarksons.net/home/GetHomeLinksSearch";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36 Edg/116.0.0.0";

/// Log entries older than this are pruned on every run.
pub const LOG_RETENTION_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint_url: String,
    /// HTTP or SOCKS proxy URL, e.g. `http://127.0.0.1:7890`.
    pub proxy: Option<String>,
    pub user_agent: String,
    pub layout: StorageLayout,
    /// Directory holding the series files.
    pub data_dir: PathBuf,
    pub chart_dir: PathBuf,
    pub log_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT.to_string(),
            proxy: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            layout: StorageLayout::Table,
            data_dir: PathBuf::from("."),
            chart_dir: PathBuf::from("."),
            log_path: None,
        }
    }
}
