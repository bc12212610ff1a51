use crate::pipeline::{Envelope, PipelineError, Transform};
use pr_client::domain::{DateRange, MetricReading};

/// Rejects readings dated outside `accepted`. Both bounds are inclusive and
/// either may be open; an unbounded range accepts every reading.
pub fn validate_reading(
    env: Envelope<MetricReading>,
    accepted: &DateRange,
) -> Result<Envelope<MetricReading>, PipelineError> {
    let d = env.payload.date;
    if !accepted.contains(d) {
        return Err(PipelineError::Transform(format!(
            "date {d} outside accepted range in {}",
            env.origin.display()
        )));
    }

    Ok(env)
}

#[derive(Clone, Default)]
pub struct ReadingValidation {
    pub accepted: DateRange,
}

impl ReadingValidation {
    pub fn new(accepted: DateRange) -> Self {
        Self { accepted }
    }
}

impl Transform<MetricReading, MetricReading> for ReadingValidation {
    fn apply(&self, input: Envelope<MetricReading>) -> Result<Envelope<MetricReading>, PipelineError> {
        validate_reading(input, &self.accepted)
    }
}
