use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use pr_client::{
    domain::{Metric, MetricReading},
    AnalysisError, MergedSeries,
};
use time::Date;

mod accumulator;

pub use accumulator::{DuplicatePolicy, MetricAccumulator};

/// A payload together with the file it was read from.
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
    pub origin: PathBuf,
}

/// Input roots that cannot feed a merge. Always fatal, raised before any output is written.
#[derive(thiserror::Error, Debug)]
pub enum DataSourceError {
    #[error("{metric} directory not found: {}", .path.display())]
    MissingDirectory { metric: Metric, path: PathBuf },
    #[error("{metric} directory {} has no usable files ({scanned} scanned)", .path.display())]
    NoUsableFiles {
        metric: Metric,
        path: PathBuf,
        scanned: usize,
    },
    #[error("{metric} directory {} yielded no parseable records", .path.display())]
    NoRecords { metric: Metric, path: PathBuf },
    #[error("conflicting {metric} values for {date}: {kept} already read, {incoming} in {}", .origin.display())]
    ConflictingValues {
        metric: Metric,
        date: Date,
        kept: f64,
        incoming: f64,
        origin: PathBuf,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    #[error("source error: {0}")]
    Source(String),
    #[error("transform error: {0}")]
    Transform(String),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("sink error: {0}")]
    Sink(String),
    #[error("render error: {0}")]
    Render(String),
}

pub trait Source<T>: Send + Sync {
    /// Root the source reads from, used when reporting an empty source.
    fn origin(&self) -> &Path;

    /// Reads every record the source can parse. Unreadable rows and files are
    /// logged and skipped; only conditions that leave the source unusable are
    /// returned as errors.
    fn read(&self) -> Result<Vec<Envelope<T>>, PipelineError>;
}

pub trait Transform<I, O>: Send + Sync {
    fn apply(&self, input: Envelope<I>) -> Result<Envelope<O>, PipelineError>;
}

pub trait Sink<T: ?Sized>: Send + Sync {
    fn write(&self, input: &T) -> Result<(), PipelineError>;
}

/// Loader/Merger: reads both metric trees, validates readings, joins them by
/// date and hands the merged series to the sink.
pub struct Pipeline<S, K> {
    pub pr_source: S,
    pub ghi_source: S,
    pub transforms: Vec<Arc<dyn Transform<MetricReading, MetricReading> + Send + Sync>>, // applied in order
    pub duplicates: DuplicatePolicy,
    pub sink: K,
}

impl<S, K> Pipeline<S, K>
where
    S: Source<MetricReading>,
    K: Sink<MergedSeries>,
{
    pub fn run(self) -> Result<MergedSeries, PipelineError> {
        let pr = self.accumulate(Metric::Pr, &self.pr_source)?;
        let ghi = self.accumulate(Metric::Ghi, &self.ghi_source)?;

        let series = MergedSeries::outer_join(pr.values(), ghi.values());
        let cov = series.coverage();
        tracing::info!(
            dates = cov.total,
            with_pr = cov.with_pr,
            with_ghi = cov.with_ghi,
            with_both = cov.with_both,
            missing_pr = cov.missing_pr(),
            missing_ghi = cov.missing_ghi(),
            first = ?series.first_date(),
            last = ?series.last_date(),
            "merged PR and GHI series"
        );

        self.sink.write(&series)?;
        Ok(series)
    }

    fn accumulate(&self, metric: Metric, source: &S) -> Result<MetricAccumulator, PipelineError> {
        let mut acc = MetricAccumulator::new(metric, self.duplicates);

        'readings: for mut env in source.read()? {
            for t in &self.transforms {
                env = match t.apply(env) {
                    Ok(env) => env,
                    Err(e) => {
                        tracing::debug!(metric = %metric, error = %e, "reading rejected");
                        metrics::counter!("pr_ingest_rejected_readings_total", "metric" => metric.column())
                            .increment(1);
                        continue 'readings;
                    }
                };
            }
            acc.insert(env)?;
        }

        if acc.is_empty() {
            return Err(DataSourceError::NoRecords {
                metric,
                path: source.origin().to_path_buf(),
            }
            .into());
        }

        tracing::info!(
            metric = %metric,
            dates = acc.len(),
            duplicates = acc.duplicates(),
            "accumulated readings"
        );
        Ok(acc)
    }
}
