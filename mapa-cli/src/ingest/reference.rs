//! Reference workbooks: already-posted products and known inconsistencies
//!
//! Both are keyed by the product code column and read from their first
//! sheet with the header in the first row. Failing to read either one is
//! fatal for the ingestion run.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, open_workbook_auto};

use super::cells::{cell_text, row_cell};
use super::error::ParseError;
use super::keys::normalize_code;

pub const CODE_COLUMN: &str = "Cód Chave do Produto";
pub const PROVIDER_COLUMN: &str = "Nome Provedor";
pub const ERROR_COLUMN: &str = "Erro";

/// Separator used when joining several errors of one product
pub const ERROR_SEPARATOR: &str = "; ";

/// Provider per normalized product code, first accepted occurrence wins
#[derive(Debug, Clone, Default)]
pub struct PostedProducts {
    providers: HashMap<String, String>,
}

impl PostedProducts {
    pub fn provider_for(&self, code: &str) -> Option<&str> {
        if code.is_empty() {
            return None;
        }
        self.providers.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Build from `(code, provider)` pairs, keeping accepted providers only
    pub fn from_rows<I>(rows: I, accepted: &[String]) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut providers = HashMap::new();
        for (raw_code, raw_provider) in rows {
            let code = normalize_code(&raw_code);
            let provider = raw_provider.trim();
            if code.is_empty() || !accepted.iter().any(|a| a == provider) {
                continue;
            }
            providers.entry(code).or_insert_with(|| provider.to_string());
        }
        Self { providers }
    }
}

/// Distinct error messages per normalized product code
#[derive(Debug, Clone, Default)]
pub struct InconsistencyIndex {
    errors: HashMap<String, Vec<String>>,
}

impl InconsistencyIndex {
    /// Errors of a code joined with `"; "` in first-seen order
    pub fn joined_for(&self, code: &str) -> Option<String> {
        if code.is_empty() {
            return None;
        }
        self.errors.get(code).map(|errs| errs.join(ERROR_SEPARATOR))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut errors: HashMap<String, Vec<String>> = HashMap::new();
        for (raw_code, raw_error) in rows {
            let code = normalize_code(&raw_code);
            let error = raw_error.trim();
            if code.is_empty() || error.is_empty() {
                continue;
            }
            let entry = errors.entry(code).or_default();
            if !entry.iter().any(|e| e == error) {
                entry.push(error.to_string());
            }
        }
        Self { errors }
    }
}

/// Load the posted-products workbook
pub fn load_posted_products(path: &Path, accepted: &[String]) -> Result<PostedProducts> {
    let range = read_first_sheet(path)?;
    let pairs = column_pairs(&range, path, CODE_COLUMN, PROVIDER_COLUMN)?;
    let posted = PostedProducts::from_rows(pairs, accepted);
    log::info!(
        "Loaded {} posted product codes from {}",
        posted.len(),
        path.display()
    );
    Ok(posted)
}

/// Load the inconsistencies workbook
pub fn load_inconsistencies(path: &Path) -> Result<InconsistencyIndex> {
    let range = read_first_sheet(path)?;
    let pairs = column_pairs(&range, path, CODE_COLUMN, ERROR_COLUMN)?;
    let index = InconsistencyIndex::from_rows(pairs);
    log::info!(
        "Loaded inconsistencies for {} product codes from {}",
        index.len(),
        path.display()
    );
    Ok(index)
}

fn read_first_sheet(path: &Path) -> Result<Range<Data>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open reference workbook: {}", path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ParseError::new(path.display().to_string(), "workbook has no sheets"))?;

    workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet '{}' of {}", sheet_name, path.display()))
}

/// Extract `(key, value)` text pairs from two named columns
fn column_pairs(
    range: &Range<Data>,
    path: &Path,
    key_column: &str,
    value_column: &str,
) -> Result<Vec<(String, String)>> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| ParseError::new(path.display().to_string(), "sheet is empty"))?;

    let find = |name: &str| -> Result<usize, ParseError> {
        header
            .iter()
            .position(|cell| cell_text(cell).as_deref() == Some(name))
            .ok_or_else(|| {
                ParseError::new(path.display().to_string(), format!("missing column '{}'", name))
            })
    };
    let key_idx = find(key_column)?;
    let value_idx = find(value_column)?;

    Ok(rows
        .map(|row| {
            (
                cell_text(row_cell(row, key_idx)).unwrap_or_default(),
                cell_text(row_cell(row, value_idx)).unwrap_or_default(),
            )
        })
        .collect())
}
