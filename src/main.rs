mod cli;
mod config;
mod domain;
mod workflows;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use config::ShowConfig;
use workflows::aggregator;
use workflows::renamer::{self, RenameMode, RenameOutcome};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let Some(dir) = cli.dir.as_deref() else {
        println!("pass in a directory to scan");
        std::process::exit(0);
    };

    if let Err(e) = run(dir, &cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(dir: &Path, cli: &Cli) -> Result<()> {
    let config_path = config::resolve_config_path(&cli.config);
    let shows = config::load_config(&config_path)
        .with_context(|| format!("Failed to load configuration from {config_path:?}"))?;
    if shows.is_empty() {
        warn!("No shows configured in {config_path:?}");
    }

    let mode = RenameMode::from_dryrun(cli.dryrun);
    for show in &shows {
        process_show(dir, show, mode)?;
    }

    Ok(())
}

fn process_show(dir: &Path, show: &ShowConfig, mode: RenameMode) -> Result<()> {
    info!("Scanning {dir:?} for {show}");
    let episodes = aggregator::find_episodes(dir, show)?;

    let mut renamed = 0;
    let mut skipped = 0;
    for episode in episodes.values() {
        debug!("{:?} -> {}", episode.key(), renamer::basename(episode));
        for op in renamer::plan_renames(episode) {
            match renamer::apply(&op, mode)? {
                RenameOutcome::Renamed => renamed += 1,
                RenameOutcome::SkippedExisting => skipped += 1,
                RenameOutcome::Previewed
                | RenameOutcome::AlreadyNamed
                | RenameOutcome::NoExtension => {}
            }
        }
    }

    info!(
        "{}: {} episode(s), {renamed} renamed, {skipped} skipped",
        show.name,
        episodes.len()
    );
    Ok(())
}
