//! Ingest command: remote workbook to store table

use anyhow::{Context, Result};
use colored::*;
use is_terminal::IsTerminal;
use std::time::Instant;

use crate::api::SharePointClient;
use crate::cli::IngestArgs;
use crate::config::repository::{open_for_write, records::replace_records};
use crate::config::{AppConfig, SourceConfig};
use crate::ingest::{self, ReferenceTables, artifact};
use crate::record::LaunchRecord;

/// Run the whole pipeline; the store is only touched once every record
/// is consolidated and enriched in memory
pub async fn handle_ingest_command(args: IngestArgs, config: AppConfig) -> Result<()> {
    let started = Instant::now();
    let settings = &config.pipeline;

    let mut records = match &args.input {
        Some(path) => {
            println!("Reading workbook {}", path.display().to_string().cyan());
            ingest::consolidate_file(path, settings)?
        }
        None => {
            let bytes = fetch_source(&config.source).await?;
            ingest::consolidate_bytes(bytes, settings)?
        }
    };
    log::info!("Consolidated {} records", records.len());

    let references = ReferenceTables::load(
        &config.references.posted_products,
        &config.references.inconsistencies,
        settings,
    )?;
    ingest::enrich_records(&mut records, &references, settings);

    if !args.no_artifact {
        artifact::write_artifact(
            &records,
            &config.references.output,
            &config.references.output_sheet,
        )?;
        println!(
            "Artifact written to {}",
            config.references.output.display().to_string().cyan()
        );
    }

    let written = persist(&records, &config).await?;

    println!(
        "{} {} rows written to table '{}' in {} ({:.1}s)",
        "✓".green().bold(),
        written.to_string().bold(),
        config.store.table,
        config.store.database.display(),
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Replace the configured store table with `records`
pub async fn persist(records: &[LaunchRecord], config: &AppConfig) -> Result<u64> {
    let pool = open_for_write(&config.store.database).await?;
    let written = replace_records(&pool, &config.store.table, records).await;
    pool.close().await;
    written
}

async fn fetch_source(source: &SourceConfig) -> Result<Vec<u8>> {
    let client = SharePointClient::new(source.clone())?;
    let password = resolve_password(source)?;

    println!("Downloading {}", client.download_url().dimmed());
    let bytes = client
        .download(&password)
        .await
        .context("Failed to download launch map")?;
    log::info!("Downloaded {} bytes", bytes.len());
    Ok(bytes)
}

fn resolve_password(source: &SourceConfig) -> Result<String> {
    if let Some(password) = &source.password {
        return Ok(password.clone());
    }

    if !std::io::stdin().is_terminal() {
        anyhow::bail!("SHAREPOINT_PASSWORD is not set and stdin is not a terminal");
    }

    rpassword::prompt_password(format!("SharePoint password for {}: ", source.username))
        .context("Failed to read password")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::repository::{open_for_read, records::load_records};
    use rust_xlsxwriter::Workbook;
    use std::path::{Path, PathBuf};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mapa-ingest-{}-{}", uuid::Uuid::new_v4(), name))
    }

    fn source_workbook(path: &Path) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("PAS").unwrap();
        sheet.write_string(0, 0, "Mapa").unwrap();
        sheet.write_string(1, 0, "Solicitante").unwrap();
        sheet.write_string(2, 0, "ana").unwrap();
        sheet.write_number(2, 1, 45296.0).unwrap();
        sheet.write_string(2, 2, "789.123").unwrap();
        sheet.write_string(2, 3, "10").unwrap();
        sheet.write_string(3, 4, "Row without identity").unwrap();
        workbook.save(path).unwrap();
    }

    fn reference_workbook(path: &Path, headers: &[&str], rows: &[&[&str]]) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                sheet.write_string(r as u32 + 1, col as u16, *value).unwrap();
            }
        }
        workbook.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_ingest_local_workbook_into_store() {
        let input = temp_path("source.xlsx");
        let posted = temp_path("posted.xlsx");
        let issues = temp_path("issues.xlsx");
        let output = temp_path("tratada.xlsx");
        let database = temp_path("dados.db");

        source_workbook(&input);
        reference_workbook(
            &posted,
            &["Cód Chave do Produto", "Nome Provedor"],
            &[&["789123", "Simplus"]],
        );
        reference_workbook(&issues, &["Cód Chave do Produto", "Erro"], &[]);

        let mut config = AppConfig::default();
        config.references.posted_products = posted.clone();
        config.references.inconsistencies = issues.clone();
        config.references.output = output.clone();
        config.store.database = database.clone();

        handle_ingest_command(
            IngestArgs {
                input: Some(input.clone()),
                no_artifact: false,
            },
            config.clone(),
        )
        .await
        .unwrap();

        assert!(output.exists());

        let pool = open_for_read(&database).await.unwrap();
        let loaded = load_records(&pool, "dados").await.unwrap();
        pool.close().await;

        assert_eq!(loaded.records.len(), 1);
        let record = &loaded.records[0];
        assert_eq!(record.requester.as_deref(), Some("ANA"));
        assert_eq!(record.ean.as_deref(), Some("789123"));
        assert_eq!(record.origin.as_deref(), Some("PAS"));
        assert_eq!(record.provider.as_deref(), Some("Simplus"));
        assert_eq!(record.inconsistencies.as_deref(), Some("Sem inconsistências"));
        assert_eq!(
            record.inclusion_date,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 5)
        );

        for path in [input, posted, issues, output, database] {
            std::fs::remove_file(path).ok();
        }
    }

    #[tokio::test]
    async fn test_missing_reference_aborts_before_store_write() {
        let input = temp_path("source.xlsx");
        let database = temp_path("dados.db");
        source_workbook(&input);

        let mut config = AppConfig::default();
        config.references.posted_products = temp_path("absent.xlsx");
        config.store.database = database.clone();

        let result = handle_ingest_command(
            IngestArgs {
                input: Some(input.clone()),
                no_artifact: true,
            },
            config,
        )
        .await;

        assert!(result.is_err());
        assert!(!database.exists());
        std::fs::remove_file(input).ok();
    }

    #[test]
    fn test_configured_password_is_used() {
        let source = SourceConfig {
            password: Some("secret".into()),
            ..Default::default()
        };
        assert_eq!(resolve_password(&source).unwrap(), "secret");
    }
}
