//! Date coercion for the launch-map date columns
//!
//! Numeric cells are spreadsheet serial dates (days since 1899-12-30) and
//! are only accepted in `[1, 60000]`; text cells are read as ISO or
//! day-first dates. Anything else becomes a missing date.

use calamine::Data;
use chrono::{Duration, NaiveDate};

use super::cells::{as_number, spreadsheet_epoch};

pub const MIN_SERIAL: f64 = 1.0;
pub const MAX_SERIAL: f64 = 60000.0;

/// Convert a spreadsheet serial day number to a calendar date
pub fn from_serial(value: f64) -> Option<NaiveDate> {
    if !(MIN_SERIAL..=MAX_SERIAL).contains(&value) {
        return None;
    }
    Some(spreadsheet_epoch() + Duration::days(value.floor() as i64))
}

/// Serial day number of a date, `None` outside the accepted serial range
pub fn to_serial(date: NaiveDate) -> Option<f64> {
    let serial = date.signed_duration_since(spreadsheet_epoch()).num_days() as f64;
    (MIN_SERIAL..=MAX_SERIAL).contains(&serial).then_some(serial)
}

/// Parse a textual date, ISO first, then day-first
pub fn parse_text_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()
        .unwrap_or_default();

    let sep = date_part.chars().find(|c| matches!(c, '/' | '-' | '.'))?;
    let parts: Vec<&str> = date_part.split(sep).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    let (year, month, day) = if parts[0].len() == 4 {
        (parts[0], parts[1], parts[2])
    } else {
        (parts[2], parts[1], parts[0])
    };

    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    let year: i32 = match year.len() {
        2 => {
            let yy: i32 = year.parse().ok()?;
            if yy < 70 { 2000 + yy } else { 1900 + yy }
        }
        4 => year.parse().ok()?,
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Coerce one cell of a date column
pub fn coerce_cell(cell: &Data) -> Option<NaiveDate> {
    if let Some(n) = as_number(cell) {
        return from_serial(n);
    }
    match cell {
        Data::String(s) | Data::DateTimeIso(s) => parse_text_date(s),
        _ => None,
    }
}
