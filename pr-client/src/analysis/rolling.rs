use time::{Date, Duration};

use crate::domain::DailyRecord;

/// First date still inside a calendar window of `days` ending on `end`.
fn window_start(end: Date, days: u16) -> Date {
    let span = Duration::days(i64::from(days.max(1)) - 1);
    end.checked_sub(span).unwrap_or(Date::MIN)
}

/// Calendar-window moving average of PR, one value per record.
///
/// The window for a record covers the `days` calendar days ending on its date,
/// so gaps in the series shrink the sample rather than reaching further back.
/// A record whose window holds no PR value gets `None`.
pub fn moving_average(records: &[DailyRecord], days: u16) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(records.len());
    let mut lo = 0;

    for (i, rec) in records.iter().enumerate() {
        let start = window_start(rec.date, days);
        while lo < i && records[lo].date < start {
            lo += 1;
        }
        // Each window is summed from its own slice.
        out.push(mean(records[lo..=i].iter().filter_map(|r| r.pr)));
    }

    out
}

/// Mean PR over records dated within the `days` calendar days ending on `end`.
/// `None` days means every record.
pub fn trailing_average(records: &[DailyRecord], end: Date, days: Option<u16>) -> Option<f64> {
    let start = days.map(|d| window_start(end, d));
    mean(
        records
            .iter()
            .filter(|r| r.date <= end && start.map_or(true, |s| r.date >= s))
            .filter_map(|r| r.pr),
    )
}

fn mean<I: Iterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn rec(date: Date, pr: Option<f64>) -> DailyRecord {
        DailyRecord { date, pr, ghi: None }
    }

    fn daily(start: Date, values: &[f64]) -> Vec<DailyRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| rec(start + Duration::days(i as i64), Some(*v)))
            .collect()
    }

    #[test]
    fn constant_series_averages_to_constant() {
        let records = daily(date!(2024 - 01 - 01), &[50.0; 100]);
        let last = records.last().unwrap().date;
        assert_eq!(trailing_average(&records, last, Some(30)), Some(50.0));
        assert_eq!(moving_average(&records, 30)[99], Some(50.0));
    }

    #[test]
    fn moving_average_uses_partial_window_at_start() {
        let records = daily(date!(2024 - 01 - 01), &[10.0, 20.0, 30.0]);
        assert_eq!(
            moving_average(&records, 30),
            vec![Some(10.0), Some(15.0), Some(20.0)]
        );
    }

    #[test]
    fn moving_average_window_is_calendar_bounded() {
        let records = vec![
            rec(date!(2024 - 01 - 01), Some(10.0)),
            rec(date!(2024 - 01 - 02), Some(20.0)),
            // 40-day gap: the first two fall out of a 30-day window.
            rec(date!(2024 - 02 - 11), Some(90.0)),
        ];
        let ma = moving_average(&records, 30);
        assert_eq!(ma[2], Some(90.0));
    }

    #[test]
    fn window_boundary_includes_exactly_n_days() {
        let records = daily(date!(2024 - 01 - 01), &[0.0, 10.0, 10.0, 10.0]);
        // 3-day window ending on 01-04 covers 01-02..=01-04.
        assert_eq!(moving_average(&records, 3)[3], Some(10.0));
        assert_eq!(
            trailing_average(&records, date!(2024 - 01 - 04), Some(3)),
            Some(10.0)
        );
    }

    #[test]
    fn missing_pr_is_skipped_and_empty_window_is_none() {
        let records = vec![
            rec(date!(2024 - 01 - 01), None),
            rec(date!(2024 - 01 - 02), Some(60.0)),
            rec(date!(2024 - 01 - 03), None),
        ];
        assert_eq!(
            moving_average(&records, 30),
            vec![None, Some(60.0), Some(60.0)]
        );
        assert_eq!(
            trailing_average(&records[..1], date!(2024 - 01 - 01), Some(7)),
            None
        );
    }

    #[test]
    fn large_value_leaving_window_does_not_skew_later_averages() {
        let records = daily(
            date!(2024 - 01 - 01),
            &[1e17, 50.0, 50.0, 50.0, 50.0, 50.0],
        );
        let ma = moving_average(&records, 3);
        assert_eq!(ma[3], Some(50.0));
        assert_eq!(ma[5], Some(50.0));
    }

    #[test]
    fn lifetime_average_covers_everything() {
        let records = daily(date!(2020 - 01 - 01), &[40.0, 60.0, 80.0]);
        assert_eq!(
            trailing_average(&records, date!(2020 - 01 - 03), None),
            Some(60.0)
        );
    }
}
