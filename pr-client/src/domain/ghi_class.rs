/// Irradiance bucket used to colour a day on the chart.
///
/// Boundaries are lower-inclusive: 2.0 is `Moderate`, 4.0 is `Good`, 6.0 is
/// `Excellent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GhiClass {
    Low,
    Moderate,
    Good,
    Excellent,
    /// GHI missing for the day. Still plotted, without a bucket colour.
    Unclassified,
}

impl GhiClass {
    pub const BUCKETS: [GhiClass; 4] = [Self::Low, Self::Moderate, Self::Good, Self::Excellent];

    pub fn classify(ghi: Option<f64>) -> Self {
        match ghi {
            Some(v) if v.is_nan() => Self::Unclassified,
            Some(v) if v < 2.0 => Self::Low,
            Some(v) if v < 4.0 => Self::Moderate,
            Some(v) if v < 6.0 => Self::Good,
            Some(_) => Self::Excellent,
            None => Self::Unclassified,
        }
    }

    /// Legend text for the bucket, in kWh/m².
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "< 2",
            Self::Moderate => "2~4",
            Self::Good => "4~6",
            Self::Excellent => "> 6",
            Self::Unclassified => "n/a",
        }
    }
}
