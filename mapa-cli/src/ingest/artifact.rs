//! Audit spreadsheet of the consolidated launch map
//!
//! The consolidated records are written to a standalone workbook before the
//! store is replaced. The same layout can be loaded back with
//! [`read_artifact`], which is how an already-treated spreadsheet is
//! imported without running the whole pipeline.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use rust_xlsxwriter::{Color, Format, Workbook};

use super::cells::cell_text;
use super::dates::{coerce_cell, to_serial};
use crate::record::{Column, FieldRef, FieldValue, LaunchRecord};

pub const DEFAULT_SHEET_NAME: &str = "Mapa Gcat";

/// Write records to a single-sheet workbook with one column per record field
pub fn write_artifact(records: &[LaunchRecord], path: &Path, sheet_name: &str) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White);
    let date_format = Format::new().set_num_format("dd/mm/yyyy");

    for (col, column) in Column::ALL.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, column.header(), &header_format)?;
    }

    for (row_idx, record) in records.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        for (col, column) in Column::ALL.iter().enumerate() {
            let col = col as u16;
            match record.get(*column) {
                None => {}
                Some(FieldRef::Text(s)) => {
                    worksheet.write_string(row, col, s)?;
                }
                // Serials share the reader's 1899-12-30 epoch; other dates stay ISO text
                Some(FieldRef::Date(d)) => match to_serial(d) {
                    Some(serial) => {
                        worksheet.write_number_with_format(row, col, serial, &date_format)?;
                    }
                    None => {
                        worksheet.write_string(row, col, d.format("%Y-%m-%d").to_string())?;
                    }
                },
            }
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofit();

    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;

    log::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

/// Read every sheet of a consolidated workbook, header in the first row.
///
/// Columns are matched by name; unknown columns are ignored.
pub fn read_artifact(path: &Path) -> Result<Vec<LaunchRecord>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let mut records = Vec::new();

    for sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            continue;
        };

        let columns: HashMap<usize, Column> = header
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| {
                cell_text(cell)
                    .and_then(|name| Column::from_header(&name))
                    .map(|column| (idx, column))
            })
            .collect();

        let before = records.len();
        for row in rows {
            let mut record = LaunchRecord::default();
            for (idx, column) in &columns {
                let Some(cell) = row.get(*idx) else {
                    continue;
                };
                if let Some(value) = artifact_value(*column, cell) {
                    record.set(*column, value);
                }
            }
            if record != LaunchRecord::default() {
                records.push(record);
            }
        }

        log::debug!(
            "Sheet '{}': {} rows read",
            sheet_name,
            records.len() - before
        );
    }

    Ok(records)
}

fn artifact_value(column: Column, cell: &Data) -> Option<FieldValue> {
    if column.is_date() {
        coerce_cell(cell).map(FieldValue::Date)
    } else {
        cell_text(cell).map(FieldValue::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("mapa-{}-{}", uuid::Uuid::new_v4(), name))
    }

    #[test]
    fn test_artifact_preserves_fields() {
        let record = LaunchRecord {
            requester: Some("JOAO".into()),
            inclusion_date: NaiveDate::from_ymd_opt(2024, 1, 5),
            ean: Some("7891234567890".into()),
            plu: Some("001".into()),
            status: Some("Aprovado".into()),
            approval_owner: Some("GCAT".into()),
            origin: Some("NAL".into()),
            provider: Some("Simplus".into()),
            inconsistencies: Some("Sem inconsistências".into()),
            ..Default::default()
        };

        let path = temp_path("artifact.xlsx");
        write_artifact(std::slice::from_ref(&record), &path, DEFAULT_SHEET_NAME).unwrap();
        let loaded = read_artifact(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, vec![record]);
    }

    #[test]
    fn test_artifact_keeps_early_dates() {
        let dates = [
            NaiveDate::from_ymd_opt(1899, 12, 31),
            NaiveDate::from_ymd_opt(1900, 1, 1),
            NaiveDate::from_ymd_opt(1900, 3, 1),
            NaiveDate::from_ymd_opt(1850, 3, 1),
        ];
        let records: Vec<LaunchRecord> = dates
            .iter()
            .map(|date| LaunchRecord {
                ean: Some("111".into()),
                inclusion_date: *date,
                ..Default::default()
            })
            .collect();

        let path = temp_path("early-dates.xlsx");
        write_artifact(&records, &path, DEFAULT_SHEET_NAME).unwrap();
        let loaded = read_artifact(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let loaded_dates: Vec<_> = loaded.iter().map(|r| r.inclusion_date).collect();
        assert_eq!(loaded_dates, dates.to_vec());
    }

    #[test]
    fn test_read_artifact_ignores_unknown_columns() {
        let path = temp_path("foreign.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "EAN").unwrap();
        sheet.write_string(0, 1, "Coluna Extra").unwrap();
        sheet.write_string(0, 2, "Data de Validação").unwrap();
        sheet.write_number(1, 0, 111.0).unwrap();
        sheet.write_string(1, 1, "ignored").unwrap();
        sheet.write_string(1, 2, "10/02/2024").unwrap();
        workbook.save(&path).unwrap();

        let loaded = read_artifact(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].ean.as_deref(), Some("111"));
        assert_eq!(loaded[0].validation_date, NaiveDate::from_ymd_opt(2024, 2, 10));
    }
}
