use std::collections::{btree_map::Entry, BTreeMap};

use pr_client::domain::{Metric, MetricReading};
use serde::Deserialize;
use time::Date;

use super::{DataSourceError, Envelope};

/// What to do when two readings for the same metric and date disagree.
///
/// Readings arrive in sorted file-path order, rows in file order. A missing
/// value never replaces a present one, and equal values are not a conflict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the reading processed last; each replacement is logged.
    #[default]
    LastWriteWins,
    /// Keep the reading processed first; later ones are logged and ignored.
    FirstWriteWins,
    /// Fail the merge.
    Reject,
}

/// date -> value mapping for one metric.
#[derive(Debug)]
pub struct MetricAccumulator {
    metric: Metric,
    policy: DuplicatePolicy,
    values: BTreeMap<Date, Option<f64>>,
    duplicates: usize,
}

impl MetricAccumulator {
    pub fn new(metric: Metric, policy: DuplicatePolicy) -> Self {
        Self {
            metric,
            policy,
            values: BTreeMap::new(),
            duplicates: 0,
        }
    }

    pub fn values(&self) -> &BTreeMap<Date, Option<f64>> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Conflicting readings seen so far.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn insert(&mut self, env: Envelope<MetricReading>) -> Result<(), DataSourceError> {
        let MetricReading { date, value } = env.payload;
        let mut slot = match self.values.entry(date) {
            Entry::Vacant(v) => {
                v.insert(value);
                return Ok(());
            }
            Entry::Occupied(o) => o,
        };

        let (kept, incoming) = match (*slot.get(), value) {
            (_, None) => return Ok(()),
            (None, Some(v)) => {
                slot.insert(Some(v));
                return Ok(());
            }
            (Some(a), Some(b)) if a == b => return Ok(()),
            (Some(a), Some(b)) => (a, b),
        };

        self.duplicates += 1;
        metrics::counter!("pr_ingest_duplicate_dates_total", "metric" => self.metric.column())
            .increment(1);

        match self.policy {
            DuplicatePolicy::LastWriteWins => {
                tracing::warn!(
                    metric = %self.metric,
                    %date,
                    kept,
                    incoming,
                    origin = %env.origin.display(),
                    "duplicate date, later value replaces earlier"
                );
                slot.insert(Some(incoming));
                Ok(())
            }
            DuplicatePolicy::FirstWriteWins => {
                tracing::warn!(
                    metric = %self.metric,
                    %date,
                    kept,
                    incoming,
                    origin = %env.origin.display(),
                    "duplicate date, later value ignored"
                );
                Ok(())
            }
            DuplicatePolicy::Reject => Err(DataSourceError::ConflictingValues {
                metric: self.metric,
                date,
                kept,
                incoming,
                origin: env.origin,
            }),
        }
    }
}
