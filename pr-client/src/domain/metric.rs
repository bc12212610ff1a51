use std::fmt;

use time::Date;

/// The two daily measurements a plant reports, each from its own folder tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Performance Ratio, percent.
    Pr,
    /// Global Horizontal Irradiance, kWh/m².
    Ghi,
}

impl Metric {
    /// Header name of the value column in source files and in the processed table.
    pub fn column(self) -> &'static str {
        match self {
            Self::Pr => "PR",
            Self::Ghi => "GHI",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One `date,value` row read from a source file. A value that could not be
/// coerced to a number is carried as `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricReading {
    pub date: Date,
    pub value: Option<f64>,
}
