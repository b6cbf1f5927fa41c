//! Command-line surface

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "mapa-cli",
    version,
    about = "Consolidate the product launch map and serve the lookup page"
)]
pub struct Cli {
    /// Optional TOML config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch, consolidate and enrich the launch map, then replace the store table
    Ingest(IngestArgs),
    /// Load an already consolidated spreadsheet into the store table
    Import(ImportArgs),
    /// Run the password-gated lookup page
    Serve(ServeArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct IngestArgs {
    /// Read a local workbook instead of downloading from SharePoint
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Skip writing the consolidated spreadsheet
    #[arg(long)]
    pub no_artifact: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// Consolidated .xlsx file
    pub file: PathBuf,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,
}
