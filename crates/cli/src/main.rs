// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! keepctl - operator tool for keep entity store files

mod commands;
mod output;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use commands::{inspect, recover, verify};
use keep_storage::StoreConfig;
use output::OutputFormat;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "keepctl",
    version,
    about = "Inspect and repair keep entity store files"
)]
struct Cli {
    /// Store config file; its `path` is used when no file is given
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a store file
    Inspect(inspect::InspectArgs),
    /// Check that a store file would load under a given data version
    Verify(verify::VerifyArgs),
    /// Promote a leftover temp file when the store file is missing
    Recover(recover::RecoverArgs),
}

fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Inspect(args) => {
            let path = store_file(args.file, config)?;
            inspect::handle(&path, cli.output)
        }
        Commands::Verify(args) => {
            let path = store_file(args.file, config)?;
            verify::handle(&path, args.current, cli.output)
        }
        Commands::Recover(args) => {
            let path = store_file(args.file, config)?;
            recover::handle(&path, args.force, cli.output)
        }
    }
}

fn store_file(file: Option<PathBuf>, config: Option<&Path>) -> Result<PathBuf> {
    if let Some(file) = file {
        return Ok(file);
    }
    let Some(config) = config else {
        bail!("no store file given; pass one or use --config");
    };
    Ok(StoreConfig::load(config)?.path)
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env("KEEP_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
