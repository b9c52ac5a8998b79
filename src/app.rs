//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - dispatches to the update / render pipeline
//! - prints summaries

use clap::Parser;

use crate::cli::{Cli, Command, GlobalArgs};
use crate::domain::Config;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `seaidx` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = config_from_args(&cli.global);
    crate::logging::init(config.log_path.as_deref())?;

    let command = cli.command.unwrap_or(Command::Run);
    tracing::info!(?command, "start");
    match command {
        Command::Run => {
            handle_update(&config)?;
            handle_render(&config)?;
        }
        Command::Update => handle_update(&config)?,
        Command::Render => handle_render(&config)?,
        Command::Fetch => handle_fetch(&config)?,
        Command::Show => handle_show(&config)?,
    }
    tracing::info!(?command, "end");
    Ok(())
}

fn handle_update(config: &Config) -> Result<(), AppError> {
    let report = pipeline::run_update(config)?;
    println!("{}", crate::report::format_update_summary(&report));
    Ok(())
}

fn handle_render(config: &Config) -> Result<(), AppError> {
    let written = pipeline::run_render(config)?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn handle_fetch(config: &Config) -> Result<(), AppError> {
    let snapshot = pipeline::fetch_snapshot(config)?;
    println!("{}", crate::report::format_snapshot(&snapshot));
    Ok(())
}

fn handle_show(config: &Config) -> Result<(), AppError> {
    let dataset = pipeline::load_dataset(config)?;
    println!("{}", crate::report::format_latest(&dataset));
    Ok(())
}

pub fn config_from_args(args: &GlobalArgs) -> Config {
    Config {
        endpoint_url: args.endpoint.clone(),
        proxy: args.proxy.clone().filter(|p| !p.trim().is_empty()),
        user_agent: args.user_agent.clone(),
        layout: args.layout,
        data_dir: args.data_dir.clone(),
        chart_dir: args.chart_dir.clone(),
        log_path: args.log_file.clone(),
    }
}
