//! Command-line parsing for the shipping indicator tracker.
//!
//! Every global option can also come from the environment (or a `.env` file
//! loaded before parsing), so a scheduler entry can stay a bare `seaidx`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_ENDPOINT, DEFAULT_USER_AGENT, StorageLayout};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "seaidx", version, about = "Shipping market indicator tracker")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Defaults to `run`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Update the stored series, then render charts (the scheduled job).
    Run,
    /// Fetch one snapshot and append/correct the stored series.
    Update,
    /// Render charts from the stored series.
    Render,
    /// Fetch and print one snapshot without touching storage.
    Fetch,
    /// Print the latest stored record of every series.
    Show,
}

/// Options shared by all subcommands.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Search endpoint queried for the indicator titles.
    #[arg(long, global = true, env = "SEAIDX_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// HTTP or SOCKS proxy for the first request attempt (e.g. http://127.0.0.1:7890).
    #[arg(long, global = true, env = "SEAIDX_PROXY")]
    pub proxy: Option<String>,

    /// User-Agent header sent with the request.
    #[arg(long, global = true, env = "SEAIDX_USER_AGENT", default_value = DEFAULT_USER_AGENT, hide_default_value = true)]
    pub user_agent: String,

    /// Storage layout of the series files.
    #[arg(long, global = true, value_enum, env = "SEAIDX_LAYOUT", default_value_t = StorageLayout::Table)]
    pub layout: StorageLayout,

    /// Directory holding the series files.
    #[arg(long, global = true, env = "SEAIDX_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Directory receiving the PNG charts.
    #[arg(long, global = true, env = "SEAIDX_CHART_DIR", default_value = ".")]
    pub chart_dir: PathBuf,

    /// Append log lines to this file (entries older than 30 days are pruned).
    #[arg(long = "log-file", global = true, env = "SEAIDX_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["seaidx", "--data-dir", "data"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.global.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["seaidx", "update", "--layout", "document", "--proxy", "socks5://127.0.0.1:1080"]).unwrap();
        assert_eq!(cli.command, Some(Command::Update));
        assert_eq!(cli.global.layout, StorageLayout::Document);
        assert_eq!(cli.global.proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
    }
}
