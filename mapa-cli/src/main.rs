mod api;
mod cli;
mod config;
mod ingest;
mod record;
mod services;
mod web;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands, commands};

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config::load_config(cli.config)?;
    log::debug!("Loaded configuration");

    match cli.command {
        Commands::Ingest(args) => commands::handle_ingest_command(args, config).await,
        Commands::Import(args) => commands::handle_import_command(args, config).await,
        Commands::Serve(args) => commands::handle_serve_command(args, config).await,
    }
}
