use std::{
    fs,
    path::{Path, PathBuf},
};

use csv::StringRecord;
use pr_client::domain::{Metric, MetricReading};

use super::cells::{coerce_value, column_index, parse_date, RowParseError};
use crate::pipeline::{DataSourceError, Envelope, PipelineError, Source};

/// Recursive folder of daily `Date,<metric>` CSV files for one metric.
///
/// Every file under the root is a candidate regardless of name or extension;
/// files whose header lacks `Date` or the metric column are skipped with a
/// warning. Files are read in sorted path order.
pub struct MetricCsvDirSource {
    root: PathBuf,
    metric: Metric,
}

impl MetricCsvDirSource {
    pub fn new<P: Into<PathBuf>>(root: P, metric: Metric) -> Self {
        Self {
            root: root.into(),
            metric,
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    fn read_file(&self, path: &Path) -> Result<FileScan, String> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| format!("failed to open: {e}"))?;
        let headers = rdr
            .headers()
            .map_err(|e| format!("failed to read headers: {e}"))?
            .clone();

        let column = self.metric.column();
        let (Some(date_idx), Some(value_idx)) =
            (column_index(&headers, "Date"), column_index(&headers, column))
        else {
            return Err(format!(
                "header {:?} lacks 'Date' and '{column}' columns",
                headers.iter().collect::<Vec<_>>()
            ));
        };

        let mut scan = FileScan::default();
        for result in rdr.records() {
            let parsed = result
                .map_err(|e| RowParseError::Unreadable(e.to_string()))
                .and_then(|record| record_to_reading(&record, date_idx, value_idx));
            match parsed {
                Ok(reading) => {
                    if reading.value.is_none() {
                        scan.missing_values += 1;
                    }
                    scan.readings.push(reading);
                }
                Err(e) => {
                    tracing::debug!(metric = %self.metric, file = %path.display(), error = %e, "row dropped");
                    scan.dropped_rows += 1;
                }
            }
        }

        Ok(scan)
    }
}

#[derive(Debug, Default)]
struct FileScan {
    readings: Vec<MetricReading>,
    dropped_rows: usize,
    missing_values: usize,
}

fn record_to_reading(
    record: &StringRecord,
    date_idx: usize,
    value_idx: usize,
) -> Result<MetricReading, RowParseError> {
    let date = parse_date(record.get(date_idx).unwrap_or(""))?;
    let value = record.get(value_idx).and_then(coerce_value);
    Ok(MetricReading { date, value })
}

/// All regular files below `root`, sorted. Symlinked directories are not followed.
pub(crate) fn collect_files(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            if let Err(e) = walk(&path, out) {
                tracing::warn!(dir = %path.display(), error = %e, "skipping unreadable directory");
            }
        } else if path.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

impl Source<MetricReading> for MetricCsvDirSource {
    fn origin(&self) -> &Path {
        &self.root
    }

    fn read(&self) -> Result<Vec<Envelope<MetricReading>>, PipelineError> {
        let metric = self.metric;
        if !self.root.is_dir() {
            return Err(DataSourceError::MissingDirectory {
                metric,
                path: self.root.clone(),
            }
            .into());
        }

        let files = collect_files(&self.root).map_err(|e| {
            PipelineError::Source(format!("failed to list {}: {e}", self.root.display()))
        })?;

        let mut out = Vec::new();
        let mut used = 0usize;
        let mut dropped_rows = 0usize;
        let mut missing_values = 0usize;

        for path in &files {
            let scan = match self.read_file(path) {
                Ok(scan) => scan,
                Err(reason) => {
                    tracing::warn!(metric = %metric, file = %path.display(), %reason, "skipping file");
                    metrics::counter!("pr_ingest_files_skipped_total", "metric" => metric.column())
                        .increment(1);
                    continue;
                }
            };

            used += 1;
            dropped_rows += scan.dropped_rows;
            missing_values += scan.missing_values;
            out.extend(scan.readings.into_iter().map(|payload| Envelope {
                payload,
                origin: path.clone(),
            }));
        }

        metrics::counter!("pr_ingest_row_parse_errors_total", "metric" => metric.column())
            .increment(dropped_rows as u64);
        metrics::counter!("pr_ingest_values_missing_total", "metric" => metric.column())
            .increment(missing_values as u64);

        if used == 0 {
            return Err(DataSourceError::NoUsableFiles {
                metric,
                path: self.root.clone(),
                scanned: files.len(),
            }
            .into());
        }
        if out.is_empty() {
            return Err(DataSourceError::NoRecords {
                metric,
                path: self.root.clone(),
            }
            .into());
        }

        tracing::info!(
            metric = %metric,
            root = %self.root.display(),
            files_found = files.len(),
            files_used = used,
            readings = out.len(),
            dropped_rows,
            missing_values,
            "scanned metric folder"
        );
        Ok(out)
    }
}
