use anyhow::Result;
use colored::*;

use super::ingest::persist;
use crate::cli::ImportArgs;
use crate::config::AppConfig;
use crate::ingest::artifact;

/// Load a consolidated spreadsheet straight into the store table
pub async fn handle_import_command(args: ImportArgs, config: AppConfig) -> Result<()> {
    if !args.file.exists() {
        anyhow::bail!("Spreadsheet does not exist: {}", args.file.display());
    }

    let records = artifact::read_artifact(&args.file)?;
    log::info!("Read {} records from {}", records.len(), args.file.display());

    let written = persist(&records, &config).await?;
    println!(
        "{} {} rows imported into table '{}'",
        "✓".green().bold(),
        written.to_string().bold(),
        config.store.table
    );
    Ok(())
}
