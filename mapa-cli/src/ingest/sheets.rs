//! Consolidation of the launch-map sheets into one record set
//!
//! Each sheet of interest carries the same positional layout below a fixed
//! number of banner rows. Rows are mapped onto the canonical columns, rows
//! without any identifying field are dropped and the requester is
//! normalized before the sheet name is recorded as provenance.

use std::collections::BTreeMap;
use std::io::{Read, Seek};

use calamine::{Data, Range, Reader, Sheets};

use super::cells::{cell_text, is_empty};
use super::dates::coerce_cell;
use super::error::ParseError;
use super::PipelineSettings;
use crate::record::{Column, FieldValue, LaunchRecord};

/// Columns a sheet must reach for its rows to be identifiable
const IDENTIFYING_WIDTH: usize = 4;

/// Result of consolidating one sheet
#[derive(Debug, Default)]
pub struct SheetOutcome {
    pub records: Vec<LaunchRecord>,
    /// Rows dropped because requester, EAN and PLU were all empty
    pub dropped_rows: usize,
    /// Non-empty date cells that could not be coerced, per column
    pub unreadable_dates: BTreeMap<&'static str, usize>,
}

/// Consolidate a single sheet range
pub fn consolidate_sheet(
    sheet_name: &str,
    range: &Range<Data>,
    settings: &PipelineSettings,
) -> Result<SheetOutcome, ParseError> {
    let mut outcome = SheetOutcome::default();

    let Some((start_row, start_col)) = range.start() else {
        return Ok(outcome);
    };
    let start_row = start_row as usize;
    let start_col = start_col as usize;

    let total_width = start_col + range.width();
    if total_width < IDENTIFYING_WIDTH {
        return Err(ParseError::new(
            sheet_name,
            format!(
                "sheet has {} columns, at least {} are required (Solicitante, EAN, PLU)",
                total_width, IDENTIFYING_WIDTH
            ),
        ));
    }

    let columns = Column::source_columns();

    for (offset, row) in range.rows().enumerate() {
        let row_idx = start_row + offset;
        if row_idx < settings.header_rows {
            continue;
        }

        let mut record = LaunchRecord::default();

        for (cell_offset, cell) in row.iter().enumerate() {
            if is_empty(cell) {
                continue;
            }

            let col_idx = start_col + cell_offset;
            let Some(&column) = columns.get(col_idx) else {
                return Err(ParseError::new(
                    sheet_name,
                    format!(
                        "row {} has a value in column {} but only {} columns are known",
                        row_idx + 1,
                        col_idx + 1,
                        columns.len()
                    ),
                ));
            };

            if column.is_date() {
                match coerce_cell(cell) {
                    Some(date) => record.set(column, FieldValue::Date(date)),
                    None => *outcome.unreadable_dates.entry(column.header()).or_default() += 1,
                }
            } else if let Some(text) = cell_text(cell) {
                record.set(column, FieldValue::Text(text));
            }
        }

        if record.lacks_identity() {
            outcome.dropped_rows += 1;
            continue;
        }

        let requester = record
            .requester
            .take()
            .unwrap_or_else(|| settings.requester_sentinel.clone());
        record.requester = Some(requester.trim().to_uppercase());
        record.origin = Some(sheet_name.to_string());

        outcome.records.push(record);
    }

    Ok(outcome)
}

/// Consolidate every sheet of interest present in the workbook, in the
/// configured order. Missing sheets are skipped silently; unreadable
/// sheets are logged and skipped.
pub fn consolidate_workbook<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    settings: &PipelineSettings,
) -> Vec<LaunchRecord> {
    let available = workbook.sheet_names();
    let mut consolidated = Vec::new();

    for sheet in &settings.sheets {
        if !available.iter().any(|name| name == sheet) {
            log::debug!("Sheet '{}' not in workbook, skipping", sheet);
            continue;
        }

        let range = match workbook.worksheet_range(sheet) {
            Ok(range) => range,
            Err(e) => {
                log::warn!("{}", ParseError::new(sheet.as_str(), e.to_string()));
                continue;
            }
        };

        match consolidate_sheet(sheet, &range, settings) {
            Ok(outcome) => {
                for (column, count) in &outcome.unreadable_dates {
                    log::warn!(
                        "Sheet '{}': {} value(s) in '{}' could not be read as dates",
                        sheet,
                        count,
                        column
                    );
                }
                log::info!(
                    "Sheet '{}': {} rows consolidated, {} without identification dropped",
                    sheet,
                    outcome.records.len(),
                    outcome.dropped_rows
                );
                consolidated.extend(outcome.records);
            }
            Err(e) => log::warn!("Skipping sheet: {}", e),
        }
    }

    consolidated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sheet(rows: &[Vec<Data>]) -> Range<Data> {
        let width = rows.iter().map(Vec::len).max().unwrap_or(1) as u32;
        let mut range = Range::new((0, 0), (rows.len() as u32 - 1, width - 1));
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    fn banner() -> Vec<Data> {
        vec![s("Mapa de Lançamentos"), Data::Empty, Data::Empty, Data::Empty]
    }

    #[test]
    fn test_consolidate_sheet_maps_positional_columns() {
        let range = sheet(&[
            banner(),
            vec![s("Solicitante"), s("Data"), s("EAN"), s("PLU"), s("Descrição")],
            vec![s(" joao "), s("2024-01-05"), s("7891234567890"), s("001"), s("Widget")],
        ]);

        let outcome = consolidate_sheet("NAL", &range, &PipelineSettings::default()).unwrap();
        assert_eq!(outcome.records.len(), 1);

        let record = &outcome.records[0];
        assert_eq!(record.requester.as_deref(), Some("JOAO"));
        assert_eq!(record.ean.as_deref(), Some("7891234567890"));
        assert_eq!(record.plu.as_deref(), Some("001"));
        assert_eq!(record.description.as_deref(), Some("Widget"));
        assert_eq!(record.inclusion_date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(record.origin.as_deref(), Some("NAL"));
        assert_eq!(record.display(Column::InclusionDate), "05/01/2024");
    }

    #[test]
    fn test_consolidate_sheet_drops_unidentified_rows() {
        let range = sheet(&[
            banner(),
            banner(),
            vec![Data::Empty, s("2024-01-05"), Data::Empty, Data::Empty, s("Orphan")],
            vec![Data::Empty, Data::Empty, Data::Empty, s("123")],
        ]);

        let outcome = consolidate_sheet("PAS", &range, &PipelineSettings::default()).unwrap();
        assert_eq!(outcome.dropped_rows, 1);
        assert_eq!(outcome.records.len(), 1);
        // Missing requester falls back to the uppercased sentinel
        assert_eq!(outcome.records[0].requester.as_deref(), Some("NÃO INFORMADO"));
        assert_eq!(outcome.records[0].plu.as_deref(), Some("123"));
    }

    #[test]
    fn test_consolidate_sheet_numeric_dates() {
        let mut row = vec![s("ana"), Data::Float(45296.0), Data::Float(7891234567890.0), Data::Empty];
        row.resize(17, Data::Empty);
        row[16] = Data::Int(70000); // Previsão de Lançamento, out of range

        let range = sheet(&[banner(), banner(), row]);
        let outcome = consolidate_sheet("NAL", &range, &PipelineSettings::default()).unwrap();

        let record = &outcome.records[0];
        assert_eq!(record.inclusion_date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(record.launch_forecast, None);
        assert_eq!(record.ean.as_deref(), Some("7891234567890"));
        assert_eq!(outcome.unreadable_dates.get("Previsão de Lançamento"), Some(&1));
    }

    #[test]
    fn test_consolidate_sheet_rejects_narrow_sheet() {
        let range = sheet(&[vec![s("a"), s("b")], vec![s("c"), s("d")], vec![s("e"), s("f")]]);
        let err = consolidate_sheet("Liquida", &range, &PipelineSettings::default()).unwrap_err();
        assert_eq!(err.location, "Liquida");
    }

    #[test]
    fn test_consolidate_sheet_rejects_overflowing_row() {
        let mut row = vec![s("ana"), Data::Empty, s("1"), s("2")];
        row.resize(40, Data::Empty);
        row[38] = s("stray");

        let range = sheet(&[banner(), banner(), row]);
        assert!(consolidate_sheet("NAL", &range, &PipelineSettings::default()).is_err());
    }

    #[test]
    fn test_consolidate_sheet_empty_range() {
        let range: Range<Data> = Range::empty();
        let outcome = consolidate_sheet("NAL", &range, &PipelineSettings::default()).unwrap();
        assert!(outcome.records.is_empty());
    }
}
