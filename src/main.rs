//! Keeps a local CSV snapshot of Formula 1 history up to date.
//!
//! # Overview
//!
//! `f1db` reads races, circuits, drivers, constructors and championship standings from the
//! Jolpica/Ergast API and stores them as one CSV file per table. Every run only re-fetches what may
//! have changed since the previous one: the last few seasons of races and the last few rounds of
//! standings.
//!
//! # Usage
//!
//! **Sync the tables in a directory:**
//! ```bash
//! f1db update --directory data
//! ```
//!
//! **Fetch driver portraits and constructor logos:**
//! ```bash
//! f1db update-images --images-directory images --data-directory data --start-season 2010
//! ```
//!
//! # Configuration
//!
//! Settings are read from `f1db.toml` in the working directory, or from the file given with
//! `--config`. Every setting is optional:
//!
//! ```toml
//! base_url = "https://api.jolpi.ca/ergast/f1"
//! page_limit = 100
//! max_retries = 3
//! request_timeout_secs = 60
//! first_season = 1950
//! races_margin = 2
//! standings_margin = 2
//! images_start_season = 2000
//! image_size = 250
//! ```
//!
//! # Logging
//!
//! Progress is logged at the `info` level. Use `--log-level` to change it, or `RUST_LOG` for finer control.

use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod commands;

use crate::commands::{CommonArgs, CreateArgs, UpdateArgs, UpdateImagesArgs, create, update, update_images};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "f1db", version, about)]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sync the race and standings tables with the API
    Update(UpdateArgs),
    /// Download images for the drivers and constructors of recent seasons
    UpdateImages(UpdateImagesArgs),
    /// Create a fresh set of tables
    Create(CreateArgs),
}

async fn run(cli: Cli) -> f1db::Result<()> {
    let config = cli.common.setup()?;

    match &cli.command {
        Command::Update(args) => update(args, &config).await,
        Command::UpdateImages(args) => update_images(args, &config).await,
        Command::Create(args) => create(args),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
