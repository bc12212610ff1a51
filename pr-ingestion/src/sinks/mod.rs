mod atomic;
pub mod chart;
mod fonts;
pub mod processed_csv;

pub use chart::{ChartSink, ChartStyle};
pub use processed_csv::ProcessedCsvSink;
