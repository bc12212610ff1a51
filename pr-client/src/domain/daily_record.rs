use time::Date;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyRecord {
    pub date: Date,
    pub pr: Option<f64>,
    pub ghi: Option<f64>,
}

impl DailyRecord {
    pub fn new(date: Date) -> Self {
        Self {
            date,
            pr: None,
            ghi: None,
        }
    }
}
