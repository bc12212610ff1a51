use std::path::Path;

use pr_client::{DailyRecord, MergedSeries};

use super::cells::{coerce_value, column_index, parse_date};
use crate::pipeline::PipelineError;

/// Reads a `Date,GHI,PR` table previously written by the processed-table sink.
///
/// Rows with an unparseable date are dropped; unparseable values are missing.
pub fn read_processed_table(path: &Path) -> Result<MergedSeries, PipelineError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| PipelineError::Source(format!("failed to open {}: {e}", path.display())))?;
    let headers = rdr
        .headers()
        .map_err(|e| PipelineError::Source(format!("failed to read headers of {}: {e}", path.display())))?
        .clone();

    let missing = |name: &str| {
        PipelineError::Source(format!("missing column '{name}' in {}", path.display()))
    };
    let date_idx = column_index(&headers, "Date").ok_or_else(|| missing("Date"))?;
    let ghi_idx = column_index(&headers, "GHI").ok_or_else(|| missing("GHI"))?;
    let pr_idx = column_index(&headers, "PR").ok_or_else(|| missing("PR"))?;

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for result in rdr.records() {
        let Ok(record) = result else {
            dropped += 1;
            continue;
        };
        let Ok(date) = parse_date(record.get(date_idx).unwrap_or("")) else {
            dropped += 1;
            continue;
        };
        records.push(DailyRecord {
            date,
            pr: record.get(pr_idx).and_then(coerce_value),
            ghi: record.get(ghi_idx).and_then(coerce_value),
        });
    }

    if dropped > 0 {
        tracing::warn!(file = %path.display(), dropped, "dropped unreadable rows from processed table");
    }

    let series = MergedSeries::from_records(records);
    tracing::info!(file = %path.display(), dates = series.len(), "loaded processed table");
    Ok(series)
}
