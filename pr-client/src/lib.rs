pub mod analysis;
pub mod domain;

pub use analysis::{AnalysisError, Analyzer, RenderInstruction};
pub use domain::{DailyRecord, MergedSeries};
