use csv::StringRecord;
use time::{macros::format_description, Date};

/// A row that could not be turned into a reading. Always recovered: the row
/// is dropped and counted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RowParseError {
    #[error("unparseable date '{0}'")]
    Date(String),
    #[error("unreadable row: {0}")]
    Unreadable(String),
}

/// Parses `YYYY-MM-DD`. A trailing time component (`T...` or ` ...`) is ignored.
pub fn parse_date(raw: &str) -> Result<Date, RowParseError> {
    let trimmed = raw.trim();
    let day = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    Date::parse(day, format_description!("[year]-[month]-[day]"))
        .map_err(|_| RowParseError::Date(trimmed.to_string()))
}

pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Numeric cell; empty, non-numeric and non-finite tokens are missing.
pub fn coerce_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// Index of a named column, tolerating a UTF-8 byte-order mark and padding.
pub fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
}
