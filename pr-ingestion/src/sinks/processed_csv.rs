use std::path::PathBuf;

use pr_client::MergedSeries;

use super::atomic::replace_via_temp;
use crate::{
    pipeline::{PipelineError, Sink},
    sources::cells::format_date,
};

/// Writes the merged series as a `Date,GHI,PR` table, one row per date.
/// Missing values are empty cells.
pub struct ProcessedCsvSink {
    path: PathBuf,
}

impl ProcessedCsvSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

fn cell(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

impl Sink<MergedSeries> for ProcessedCsvSink {
    fn write(&self, input: &MergedSeries) -> Result<(), PipelineError> {
        replace_via_temp(&self.path, |tmp| {
            let mut wtr = csv::Writer::from_path(tmp)?;
            wtr.write_record(["Date", "GHI", "PR"])?;
            for r in input.records() {
                wtr.write_record([format_date(r.date), cell(r.ghi), cell(r.pr)])?;
            }
            wtr.flush()?;
            Ok(())
        })
        .map_err(|e| PipelineError::Sink(format!("{e:#}")))?;

        tracing::info!(path = %self.path.display(), rows = input.len(), "processed table written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::read_processed_table;
    use pr_client::DailyRecord;
    use tempfile::TempDir;
    use time::macros::date;

    fn sample() -> MergedSeries {
        MergedSeries::from_records([
            DailyRecord { date: date!(2024 - 01 - 01), pr: Some(74.123456789), ghi: Some(2.0) },
            DailyRecord { date: date!(2024 - 01 - 02), pr: None, ghi: Some(0.1 + 0.2) },
            DailyRecord { date: date!(2024 - 01 - 03), pr: Some(80.0), ghi: None },
        ])
    }

    #[test]
    fn writes_header_and_empty_cells() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed_data.csv");
        ProcessedCsvSink::new(&path).write(&sample()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,GHI,PR");
        assert_eq!(lines[1], "2024-01-01,2,74.123456789");
        assert_eq!(lines[3], "2024-01-03,,80");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn table_round_trips_to_equal_series() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed_data.csv");
        let series = sample();

        ProcessedCsvSink::new(&path).write(&series).unwrap();
        assert_eq!(read_processed_table(&path).unwrap(), series);
    }

    #[test]
    fn unwritable_path_is_sink_error() {
        let dir = TempDir::new().unwrap();
        let err = ProcessedCsvSink::new(dir.path().join("missing/processed.csv"))
            .write(&sample())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Sink(_)));
    }
}
