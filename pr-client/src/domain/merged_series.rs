use std::collections::BTreeMap;

use time::Date;

use super::DailyRecord;

/// Inclusive date filter. Either bound may be left open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

impl DateRange {
    pub fn new(start: Option<Date>, end: Option<Date>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// Daily records ordered strictly by date, one record per date.
///
/// Built once per run and never mutated; narrowed views are borrowed slices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedSeries {
    records: Vec<DailyRecord>,
}

impl MergedSeries {
    /// Full outer join of the per-metric mappings on date.
    pub fn outer_join(
        pr: &BTreeMap<Date, Option<f64>>,
        ghi: &BTreeMap<Date, Option<f64>>,
    ) -> Self {
        let mut by_date: BTreeMap<Date, DailyRecord> = BTreeMap::new();
        for (&date, &value) in pr {
            by_date.entry(date).or_insert_with(|| DailyRecord::new(date)).pr = value;
        }
        for (&date, &value) in ghi {
            by_date.entry(date).or_insert_with(|| DailyRecord::new(date)).ghi = value;
        }

        Self {
            records: by_date.into_values().collect(),
        }
    }

    /// Sorts and de-duplicates; a later record for the same date replaces an earlier one.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = DailyRecord>,
    {
        let by_date: BTreeMap<Date, DailyRecord> =
            records.into_iter().map(|r| (r.date, r)).collect();
        Self {
            records: by_date.into_values().collect(),
        }
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> Option<Date> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<Date> {
        self.records.last().map(|r| r.date)
    }

    /// Contiguous view of the records whose date falls inside `range`.
    pub fn window(&self, range: DateRange) -> &[DailyRecord] {
        let lo = range
            .start
            .map_or(0, |s| self.records.partition_point(|r| r.date < s));
        let hi = range
            .end
            .map_or(self.records.len(), |e| self.records.partition_point(|r| r.date <= e));
        if lo >= hi {
            &[]
        } else {
            &self.records[lo..hi]
        }
    }

    pub fn coverage(&self) -> SeriesCoverage {
        let mut cov = SeriesCoverage {
            total: self.records.len(),
            ..SeriesCoverage::default()
        };
        for r in &self.records {
            if r.pr.is_some() {
                cov.with_pr += 1;
            }
            if r.ghi.is_some() {
                cov.with_ghi += 1;
            }
            if r.pr.is_some() && r.ghi.is_some() {
                cov.with_both += 1;
            }
        }
        cov
    }
}

/// Per-field presence counts over a merged series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeriesCoverage {
    pub total: usize,
    pub with_pr: usize,
    pub with_ghi: usize,
    pub with_both: usize,
}

impl SeriesCoverage {
    pub fn missing_pr(&self) -> usize {
        self.total - self.with_pr
    }

    pub fn missing_ghi(&self) -> usize {
        self.total - self.with_ghi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn mapping(entries: &[(Date, Option<f64>)]) -> BTreeMap<Date, Option<f64>> {
        entries.iter().copied().collect()
    }

    #[test]
    fn outer_join_keeps_every_date_once() {
        let pr = mapping(&[
            (date!(2024 - 01 - 03), Some(80.0)),
            (date!(2024 - 01 - 01), Some(75.0)),
        ]);
        let ghi = mapping(&[
            (date!(2024 - 01 - 01), Some(4.2)),
            (date!(2024 - 01 - 02), Some(1.1)),
        ]);

        let series = MergedSeries::outer_join(&pr, &ghi);
        let dates: Vec<Date> = series.records().iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![date!(2024 - 01 - 01), date!(2024 - 01 - 02), date!(2024 - 01 - 03)]
        );

        let recs = series.records();
        assert_eq!(recs[0].pr, Some(75.0));
        assert_eq!(recs[0].ghi, Some(4.2));
        assert_eq!(recs[1].pr, None);
        assert_eq!(recs[1].ghi, Some(1.1));
        assert_eq!(recs[2].pr, Some(80.0));
        assert_eq!(recs[2].ghi, None);
    }

    #[test]
    fn outer_join_is_idempotent() {
        let pr = mapping(&[(date!(2024 - 02 - 01), Some(70.0))]);
        let ghi = mapping(&[(date!(2024 - 02 - 02), Some(3.0))]);
        assert_eq!(
            MergedSeries::outer_join(&pr, &ghi),
            MergedSeries::outer_join(&pr, &ghi)
        );
    }

    #[test]
    fn from_records_sorts_and_later_duplicate_wins() {
        let d = date!(2024 - 03 - 10);
        let series = MergedSeries::from_records([
            DailyRecord { date: d, pr: Some(1.0), ghi: None },
            DailyRecord { date: date!(2024 - 03 - 01), pr: Some(2.0), ghi: None },
            DailyRecord { date: d, pr: Some(3.0), ghi: Some(5.0) },
        ]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.first_date(), Some(date!(2024 - 03 - 01)));
        assert_eq!(series.records()[1].pr, Some(3.0));
        assert_eq!(series.records()[1].ghi, Some(5.0));
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let series = MergedSeries::from_records(
            (1..=10).map(|d| DailyRecord::new(date!(2024 - 05 - 01).replace_day(d).unwrap())),
        );

        let view = series.window(DateRange::new(
            Some(date!(2024 - 05 - 03)),
            Some(date!(2024 - 05 - 05)),
        ));
        assert_eq!(view.len(), 3);
        assert_eq!(view[0].date, date!(2024 - 05 - 03));
        assert_eq!(view[2].date, date!(2024 - 05 - 05));

        assert_eq!(series.window(DateRange::default()).len(), 10);
        assert_eq!(
            series.window(DateRange::new(Some(date!(2024 - 05 - 08)), None)).len(),
            3
        );
    }

    #[test]
    fn window_outside_span_or_inverted_is_empty() {
        let series = MergedSeries::from_records([DailyRecord::new(date!(2024 - 05 - 01))]);
        assert!(series
            .window(DateRange::new(Some(date!(2025 - 01 - 01)), None))
            .is_empty());
        assert!(series
            .window(DateRange::new(
                Some(date!(2024 - 06 - 01)),
                Some(date!(2024 - 04 - 01))
            ))
            .is_empty());
    }

    #[test]
    fn coverage_counts_presence() {
        let series = MergedSeries::from_records([
            DailyRecord { date: date!(2024 - 01 - 01), pr: Some(1.0), ghi: Some(1.0) },
            DailyRecord { date: date!(2024 - 01 - 02), pr: Some(1.0), ghi: None },
            DailyRecord { date: date!(2024 - 01 - 03), pr: None, ghi: Some(1.0) },
        ]);
        let cov = series.coverage();
        assert_eq!(cov.total, 3);
        assert_eq!(cov.with_both, 1);
        assert_eq!(cov.missing_pr(), 1);
        assert_eq!(cov.missing_ghi(), 1);
    }
}
