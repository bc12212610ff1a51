use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};
use time::Date;

use crate::{pipeline::DuplicatePolicy, sinks::ChartStyle};
use pr_client::{analysis::Analyzer, domain::DateRange, domain::TargetCurve};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Degrading target line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// `initial_value` (default 73.9) and `annual_decay` (default 0.008).
    #[serde(flatten)]
    pub curve: TargetCurve,
    /// First day of plant year 0. Default: latest July 1 on or before the first plotted date.
    #[serde(with = "iso_date::option")]
    pub anchor_date: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub dpi: u32,
    pub width_in: f64,
    pub height_in: f64,
    pub moving_average_days: u16,
    pub font_path: Option<PathBuf>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        let style = ChartStyle::default();
        Self {
            dpi: style.dpi,
            width_in: style.width_in,
            height_in: style.height_in,
            moving_average_days: Analyzer::default().moving_average_days,
            font_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root of the per-day PR files. Default `PR`.
    pub pr_folder: PathBuf,
    /// Root of the per-day GHI files. Default `GHI`.
    pub ghi_folder: PathBuf,
    /// Merged `Date,GHI,PR` table. Default `processed_data.csv`.
    pub output_csv: PathBuf,
    /// Inclusive lower bound of the plotted range. Default: first merged date.
    #[serde(with = "iso_date::option")]
    pub start_date: Option<Date>,
    /// Inclusive upper bound of the plotted range. Default: last merged date.
    #[serde(with = "iso_date::option")]
    pub end_date: Option<Date>,
    /// Rendered chart. Default `pr_performance_graph.png`.
    pub output_file: PathBuf,
    /// Readings dated before this are dropped while merging. Default: no bound.
    #[serde(with = "iso_date::option")]
    pub accept_from: Option<Date>,
    /// Readings dated after this are dropped while merging. Default: no bound.
    #[serde(with = "iso_date::option")]
    pub accept_until: Option<Date>,
    pub duplicates: DuplicatePolicy,
    pub target: TargetConfig,
    pub chart: ChartConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pr_folder: PathBuf::from("PR"),
            ghi_folder: PathBuf::from("GHI"),
            output_csv: PathBuf::from("processed_data.csv"),
            start_date: None,
            end_date: None,
            output_file: PathBuf::from("pr_performance_graph.png"),
            accept_from: None,
            accept_until: None,
            duplicates: DuplicatePolicy::default(),
            target: TargetConfig::default(),
            chart: ChartConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, overlaid with the TOML file at `path` when given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)?;
        let cfg: AppConfig = toml::from_str(&contents)?;
        Ok(cfg)
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// Dates the merge keeps; unbounded unless configured.
    pub fn accepted_dates(&self) -> DateRange {
        DateRange::new(self.accept_from, self.accept_until)
    }

    pub fn analyzer(&self) -> Analyzer {
        Analyzer {
            target: self.target.curve,
            anchor: self.target.anchor_date,
            moving_average_days: self.chart.moving_average_days,
        }
    }

    pub fn chart_style(&self) -> ChartStyle {
        ChartStyle {
            dpi: self.chart.dpi,
            width_in: self.chart.width_in,
            height_in: self.chart.height_in,
            font_path: self.chart.font_path.clone(),
        }
    }
}
