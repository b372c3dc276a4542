pub mod cli;
pub mod commands;
pub mod file_store;
pub mod render;

use std::ffi::OsString;
use std::io::{self, Write};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Parser;
use monthplan_core::config::PlannerConfig;
use monthplan_core::store::TaskStore;
use tracing::info;

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    run_with(
        raw_args,
        Local::now().date_naive(),
        &render::Renderer::detect(),
        &mut out,
    )
}

/// Runs one command against the data directory, writing its output to
/// `out`. `today` anchors time windows and the default month.
pub fn run_with<W: Write>(
    raw_args: Vec<OsString>,
    today: NaiveDate,
    renderer: &render::Renderer,
    out: &mut W,
) -> anyhow::Result<()> {
    let cli = cli::GlobalCli::parse_from(raw_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        "starting monthplan CLI"
    );

    let cfg = PlannerConfig::load_embedded();

    let data_dir = file_store::resolve_data_dir(cli.data.as_deref())
        .context("failed to resolve data directory")?;

    let backend = file_store::FileStore::open(&data_dir)
        .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;

    let mut store = TaskStore::load(backend, &cfg.storage_key)
        .with_context(|| format!("failed to load tasks from {}", data_dir.display()))?;

    commands::dispatch(&mut store, &cfg, renderer, cli.command, today, out)?;

    info!("done");
    Ok(())
}
