//! Launch-map table: full replace on ingestion, full read on lookup

use std::collections::HashSet;

use anyhow::{Context, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column as _, Row, SqlitePool, TypeInfo, ValueRef};

use super::quote_ident;
use crate::record::{Column, FieldRef, FieldValue, LaunchRecord};

/// A date column of the stored table could not be converted
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnConversionWarning {
    pub column: String,
    pub reason: String,
}

impl std::fmt::Display for ColumnConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Erro ao converter coluna {}: {}", self.column, self.reason)
    }
}

/// Every record of the table plus any conversion warnings raised on load
#[derive(Debug, Clone, Default)]
pub struct LoadedTable {
    pub records: Vec<LaunchRecord>,
    pub warnings: Vec<ColumnConversionWarning>,
}

fn create_table_sql(table: &str) -> String {
    let columns: Vec<String> = Column::ALL
        .iter()
        .map(|c| format!("{} TEXT", quote_ident(c.header())))
        .collect();
    format!("CREATE TABLE {} ({})", quote_ident(table), columns.join(", "))
}

fn insert_sql(table: &str) -> String {
    let names: Vec<String> = Column::ALL.iter().map(|c| quote_ident(c.header())).collect();
    let placeholders = vec!["?"; Column::ALL.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        names.join(", "),
        placeholders
    )
}

/// Replace the whole table with `records` in one transaction.
///
/// Returns the number of rows written.
pub async fn replace_records(pool: &SqlitePool, table: &str, records: &[LaunchRecord]) -> Result<u64> {
    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    sqlx::query(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))
        .execute(&mut *tx)
        .await
        .context("Failed to drop previous table")?;

    sqlx::query(&create_table_sql(table))
        .execute(&mut *tx)
        .await
        .context("Failed to create table")?;

    let insert = insert_sql(table);
    let mut written = 0u64;
    for record in records {
        let mut query = sqlx::query(&insert);
        for column in Column::ALL {
            query = query.bind(record.get(*column).map(FieldRef::to_stored));
        }
        written += query
            .execute(&mut *tx)
            .await
            .context("Failed to insert record")?
            .rows_affected();
    }

    tx.commit().await.context("Failed to commit table replacement")?;

    log::info!("Replaced table '{}' with {} rows", table, written);
    Ok(written)
}

/// Read a stored value as text regardless of its storage class
fn read_text(row: &SqliteRow, name: &str) -> Result<Option<String>, sqlx::Error> {
    let raw = row.try_get_raw(name)?;
    if raw.is_null() {
        return Ok(None);
    }

    let text = match raw.type_info().name() {
        "INTEGER" => row.try_get::<i64, _>(name)?.to_string(),
        "REAL" => {
            let f: f64 = row.try_get(name)?;
            if f.fract() == 0.0 && f.abs() < 1e15 {
                (f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        _ => row.try_get_unchecked::<String, _>(name)?,
    };

    Ok(Some(text))
}

#[derive(Default)]
struct DateColumnStats {
    non_empty: usize,
    parsed: usize,
}

/// Load every record of the table.
///
/// Columns missing from the table stay unset. A date column whose
/// non-empty values cannot be parsed at all is blanked and reported.
pub async fn load_records(pool: &SqlitePool, table: &str) -> Result<LoadedTable> {
    let rows: Vec<SqliteRow> = sqlx::query(&format!("SELECT * FROM {}", quote_ident(table)))
        .fetch_all(pool)
        .await
        .with_context(|| format!("Failed to read table '{}'", table))?;

    let present: HashSet<String> = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();
    let columns: Vec<Column> = Column::ALL
        .iter()
        .copied()
        .filter(|c| present.contains(c.header()))
        .collect();

    let mut stats: Vec<(Column, DateColumnStats)> = Column::date_columns()
        .filter(|c| columns.contains(c))
        .map(|c| (c, DateColumnStats::default()))
        .collect();

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut record = LaunchRecord::default();
        for column in &columns {
            let Some(text) = read_text(row, column.header())
                .with_context(|| format!("Failed to read column '{}'", column.header()))?
            else {
                continue;
            };

            record.set(*column, FieldValue::Text(text.clone()));

            if let Some((_, s)) = stats.iter_mut().find(|(c, _)| c == column) {
                if !text.trim().is_empty() {
                    s.non_empty += 1;
                    if record.get(*column).is_some() {
                        s.parsed += 1;
                    }
                }
            }
        }
        records.push(record);
    }

    let mut warnings = Vec::new();
    for (column, s) in stats {
        if s.non_empty > 0 && s.parsed == 0 {
            for record in &mut records {
                record.clear(column);
            }
            let warning = ColumnConversionWarning {
                column: column.header().to_string(),
                reason: format!("{} valores não reconhecidos como data", s.non_empty),
            };
            log::warn!("{}", warning);
            warnings.push(warning);
        }
    }

    Ok(LoadedTable { records, warnings })
}
