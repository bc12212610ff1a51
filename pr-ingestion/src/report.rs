use std::{path::Path, sync::Arc};

use pr_client::{
    analysis::RenderInstruction,
    domain::{Metric, TrailingWindow},
    MergedSeries,
};

use crate::{
    config::AppConfig,
    pipeline::{Pipeline, PipelineError, Sink},
    sinks::{ChartSink, ProcessedCsvSink},
    sources::{read_processed_table, FolderInventory, MetricCsvDirSource},
    transform::ReadingValidation,
};

/// Loader/Merger over the configured folders; writes the processed table.
pub fn merge(cfg: &AppConfig) -> Result<MergedSeries, PipelineError> {
    let pipeline = Pipeline {
        pr_source: MetricCsvDirSource::new(&cfg.pr_folder, Metric::Pr),
        ghi_source: MetricCsvDirSource::new(&cfg.ghi_folder, Metric::Ghi),
        transforms: vec![Arc::new(ReadingValidation::new(cfg.accepted_dates()))],
        duplicates: cfg.duplicates,
        sink: ProcessedCsvSink::new(&cfg.output_csv),
    };
    pipeline.run()
}

/// Analyzes `series` over the configured range and renders the chart.
pub fn render(cfg: &AppConfig, series: &MergedSeries) -> Result<RenderInstruction, PipelineError> {
    let chart = cfg.analyzer().analyze(series, cfg.range())?;

    tracing::info!(
        from = %chart.first_date,
        to = %chart.last_date,
        points = chart.points.len(),
        above_target = chart.exceedance.above,
        above_target_pct = chart.exceedance.percentage(),
        lifetime_avg = ?chart.average(TrailingWindow::Lifetime),
        "analysis complete"
    );

    ChartSink::new(&cfg.output_file, cfg.chart_style()).write(&chart)?;
    Ok(chart)
}

/// Full run: merge (or reuse a processed table), then render.
pub fn run(cfg: &AppConfig, from_processed: Option<&Path>) -> Result<RenderInstruction, PipelineError> {
    let series = match from_processed {
        Some(path) => read_processed_table(path)?,
        None => merge(cfg)?,
    };
    render(cfg, &series)
}

/// Folder diagnostics for both metric roots.
pub fn check_folders(cfg: &AppConfig) -> std::io::Result<(FolderInventory, FolderInventory)> {
    let pr = FolderInventory::collect(&cfg.pr_folder)?;
    let ghi = FolderInventory::collect(&cfg.ghi_folder)?;
    pr.log(Metric::Pr.column());
    ghi.log(Metric::Ghi.column());
    Ok((pr, ghi))
}
