mod daily_record;
mod ghi_class;
mod merged_series;
mod metric;
mod target_curve;
mod window;

pub use daily_record::DailyRecord;
pub use ghi_class::GhiClass;
pub use merged_series::{DateRange, MergedSeries, SeriesCoverage};
pub use metric::{Metric, MetricReading};
pub use target_curve::{PlantYears, TargetCurve};
pub use window::TrailingWindow;
