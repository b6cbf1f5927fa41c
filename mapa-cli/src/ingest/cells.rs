//! Conversion of spreadsheet cells into record text

use calamine::Data;
use chrono::NaiveDate;

use super::dates::from_serial;

/// Day zero of spreadsheet serial dates
pub fn spreadsheet_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN)
}

pub fn is_empty(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        Data::Error(_) => true,
        _ => false,
    }
}

/// Numeric value of a cell, including spreadsheet date cells
pub fn as_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        Data::DateTime(dt) => Some(dt.as_f64()),
        _ => None,
    }
}

/// Text of a cell, `None` when empty.
///
/// Whole floats print without a fractional part so numeric codes
/// (EAN, PLU, supplier numbers) keep their digits.
pub fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => number_text(*f),
        Data::Bool(b) => b.to_string(),
        // Date-formatted codes fall back to their digits
        Data::DateTime(dt) => match from_serial(dt.as_f64()) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => number_text(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
    };

    if text.is_empty() { None } else { Some(text) }
}

fn number_text(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

pub fn row_cell(row: &[Data], col: usize) -> &Data {
    row.get(col).unwrap_or(&Data::Empty)
}
