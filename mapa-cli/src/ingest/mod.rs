//! Ingestion pipeline for the launch map
//!
//! Consolidates the sheets of interest of the source workbook, normalizes
//! EANs and enriches every record with its provider and inconsistency
//! classification. Everything happens in memory; persisting the result is
//! left to the caller so a failure never leaves a partial table behind.

pub mod artifact;
pub mod cells;
pub mod dates;
pub mod enrich;
pub mod error;
pub mod keys;
pub mod reference;
pub mod sheets;

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs};
use serde::{Deserialize, Serialize};

pub use reference::{InconsistencyIndex, PostedProducts};

use crate::record::LaunchRecord;

/// Fixed vocabularies of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Sheets consolidated, in order
    pub sheets: Vec<String>,
    /// Banner rows above the data of every sheet
    pub header_rows: usize,
    /// Requester used when a row has none
    pub requester_sentinel: String,
    /// Providers whose postings are recognized
    pub accepted_providers: Vec<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            sheets: [
                "NAL",
                "PAS",
                "DPH e Perfumaria",
                "Liquida",
                "Mercearia Complementar",
                "Merc Basica",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            header_rows: 2,
            requester_sentinel: "Não Informado".to_string(),
            accepted_providers: vec!["Simplus".to_string(), "Portal de Produtos".to_string()],
        }
    }
}

/// Reference tables joined onto the consolidated records
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub posted: PostedProducts,
    pub inconsistencies: InconsistencyIndex,
}

impl ReferenceTables {
    pub fn load(posted_path: &Path, inconsistencies_path: &Path, settings: &PipelineSettings) -> Result<Self> {
        let posted = reference::load_posted_products(posted_path, &settings.accepted_providers)
            .context("Failed to load posted products")?;
        let inconsistencies = reference::load_inconsistencies(inconsistencies_path)
            .context("Failed to load inconsistencies")?;
        Ok(Self {
            posted,
            inconsistencies,
        })
    }
}

/// Consolidate a workbook held in memory (xlsb, xlsx, xls or ods)
pub fn consolidate_bytes(bytes: Vec<u8>, settings: &PipelineSettings) -> Result<Vec<LaunchRecord>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .context("Failed to parse source workbook")?;
    Ok(sheets::consolidate_workbook(&mut workbook, settings))
}

/// Consolidate a workbook on disk
pub fn consolidate_file(path: &Path, settings: &PipelineSettings) -> Result<Vec<LaunchRecord>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open source workbook: {}", path.display()))?;
    Ok(sheets::consolidate_workbook(&mut workbook, settings))
}

/// Normalize EANs, then classify providers and inconsistencies
pub fn enrich_records(records: &mut [LaunchRecord], references: &ReferenceTables, settings: &PipelineSettings) {
    enrich::normalize_eans(records);
    enrich::apply_providers(records, &references.posted, &settings.accepted_providers);
    enrich::apply_inconsistencies(records, &references.inconsistencies);
}
