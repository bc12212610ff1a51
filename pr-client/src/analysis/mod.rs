mod rolling;

use time::Date;

use crate::domain::{
    DailyRecord, DateRange, GhiClass, MergedSeries, PlantYears, TargetCurve, TrailingWindow,
};

pub use rolling::{moving_average, trailing_average};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("series contains no records")]
    EmptySeries,
    #[error("no records between {} and {}", fmt_bound(.start), fmt_bound(.end))]
    EmptyRange {
        start: Option<Date>,
        end: Option<Date>,
    },
}

fn fmt_bound(d: &Option<Date>) -> String {
    d.map_or_else(|| "open".to_string(), |d| d.to_string())
}

/// One plotted day with everything the chart needs for it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPoint {
    pub date: Date,
    pub pr: Option<f64>,
    pub ghi: Option<f64>,
    pub ghi_class: GhiClass,
    pub moving_average: Option<f64>,
    pub target: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowAverage {
    pub window: TrailingWindow,
    pub average: Option<f64>,
}

/// Days whose PR beat that day's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exceedance {
    pub above: usize,
    pub total: usize,
}

impl Exceedance {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.above as f64 / self.total as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantYearTarget {
    pub index: u32,
    pub starts_on: Date,
    pub target: f64,
}

/// Decorated series handed to the chart renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInstruction {
    pub first_date: Date,
    pub last_date: Date,
    pub moving_average_days: u16,
    pub points: Vec<RenderPoint>,
    pub windows: Vec<WindowAverage>,
    pub exceedance: Exceedance,
    pub plant_years: Vec<PlantYearTarget>,
}

impl RenderInstruction {
    pub fn average(&self, window: TrailingWindow) -> Option<f64> {
        self.windows
            .iter()
            .find(|w| w.window == window)
            .and_then(|w| w.average)
    }
}

/// Metrics engine settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analyzer {
    pub target: TargetCurve,
    /// Start of plant year 0. Defaults to the latest July 1 on or before the
    /// first plotted date.
    pub anchor: Option<Date>,
    pub moving_average_days: u16,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            target: TargetCurve::default(),
            anchor: None,
            moving_average_days: 30,
        }
    }
}

impl Analyzer {
    pub fn plant_years(&self, first_plotted: Date) -> PlantYears {
        self.anchor
            .map(PlantYears::new)
            .unwrap_or_else(|| PlantYears::july_on_or_before(first_plotted))
    }

    pub fn analyze(
        &self,
        series: &MergedSeries,
        range: DateRange,
    ) -> Result<RenderInstruction, AnalysisError> {
        if series.is_empty() {
            return Err(AnalysisError::EmptySeries);
        }
        let records = series.window(range);
        let (first, last) = match (records.first(), records.last()) {
            (Some(f), Some(l)) => (f.date, l.date),
            _ => {
                return Err(AnalysisError::EmptyRange {
                    start: range.start,
                    end: range.end,
                })
            }
        };

        let years = self.plant_years(first);
        let averages = moving_average(records, self.moving_average_days);
        let points: Vec<RenderPoint> = records
            .iter()
            .zip(averages)
            .map(|(rec, ma)| self.point(rec, ma, &years))
            .collect();

        let windows = TrailingWindow::ALL
            .iter()
            .map(|&window| WindowAverage {
                window,
                average: trailing_average(records, last, window.days()),
            })
            .collect();

        let above = points
            .iter()
            .filter(|p| p.pr.is_some_and(|pr| pr > p.target))
            .count();

        Ok(RenderInstruction {
            first_date: first,
            last_date: last,
            moving_average_days: self.moving_average_days,
            exceedance: Exceedance {
                above,
                total: points.len(),
            },
            plant_years: self.schedule(&years, last),
            points,
            windows,
        })
    }

    fn point(&self, rec: &DailyRecord, moving_average: Option<f64>, years: &PlantYears) -> RenderPoint {
        RenderPoint {
            date: rec.date,
            pr: rec.pr,
            ghi: rec.ghi,
            ghi_class: GhiClass::classify(rec.ghi),
            moving_average,
            target: self.target.value(years.index_of(rec.date)),
        }
    }

    /// Target per plant year from the anchor through `last`.
    fn schedule(&self, years: &PlantYears, last: Date) -> Vec<PlantYearTarget> {
        let mut out = Vec::new();
        for index in 0..=years.index_of(last) {
            let Some(starts_on) = years.start_of(index) else {
                break;
            };
            out.push(PlantYearTarget {
                index,
                starts_on,
                target: self.target.value(index),
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::date, Duration};

    fn series(records: impl IntoIterator<Item = DailyRecord>) -> MergedSeries {
        MergedSeries::from_records(records)
    }

    fn rec(date: Date, pr: Option<f64>, ghi: Option<f64>) -> DailyRecord {
        DailyRecord { date, pr, ghi }
    }

    #[test]
    fn exceedance_counts_strictly_greater() {
        let analyzer = Analyzer {
            target: TargetCurve {
                initial_value: 75.0,
                annual_decay: 0.008,
            },
            ..Analyzer::default()
        };
        let s = series([
            rec(date!(2024 - 08 - 01), Some(80.0), Some(3.0)),
            rec(date!(2024 - 08 - 02), Some(70.0), Some(5.0)),
        ]);

        let out = analyzer.analyze(&s, DateRange::default()).unwrap();
        assert_eq!(out.exceedance.above, 1);
        assert_eq!(out.exceedance.total, 2);
        assert_eq!(out.exceedance.percentage(), 50.0);
    }

    #[test]
    fn pr_equal_to_target_does_not_exceed() {
        let analyzer = Analyzer::default();
        let s = series([rec(date!(2024 - 08 - 01), Some(73.9), None)]);
        let out = analyzer.analyze(&s, DateRange::default()).unwrap();
        assert_eq!(out.exceedance.above, 0);
    }

    #[test]
    fn range_outside_series_is_empty_range_error() {
        let s = series([rec(date!(2024 - 01 - 01), Some(70.0), None)]);
        let range = DateRange::new(Some(date!(2030 - 01 - 01)), Some(date!(2030 - 12 - 31)));
        let err = Analyzer::default().analyze(&s, range).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::EmptyRange {
                start: Some(date!(2030 - 01 - 01)),
                end: Some(date!(2030 - 12 - 31)),
            }
        );
    }

    #[test]
    fn empty_series_fails_before_range_check() {
        let err = Analyzer::default()
            .analyze(&MergedSeries::default(), DateRange::default())
            .unwrap_err();
        assert_eq!(err, AnalysisError::EmptySeries);
    }

    #[test]
    fn single_record_still_produces_output() {
        let s = series([rec(date!(2023 - 09 - 15), Some(65.0), None)]);
        let out = Analyzer::default().analyze(&s, DateRange::default()).unwrap();

        assert_eq!(out.points.len(), 1);
        assert_eq!(out.points[0].moving_average, Some(65.0));
        assert_eq!(out.points[0].ghi_class, GhiClass::Unclassified);
        assert_eq!(out.average(TrailingWindow::Days(7)), Some(65.0));
        assert_eq!(out.average(TrailingWindow::Lifetime), Some(65.0));
        assert_eq!(out.first_date, out.last_date);
    }

    #[test]
    fn target_follows_plant_year_of_first_plotted_date() {
        let s = series([
            rec(date!(2021 - 08 - 01), Some(70.0), None),
            rec(date!(2023 - 06 - 30), Some(70.0), None),
            rec(date!(2023 - 07 - 01), Some(70.0), None),
        ]);
        let analyzer = Analyzer::default();
        let curve = analyzer.target;

        // The view starts 2023-06-30, so plant year 0 starts 2022-07-01.
        let range = DateRange::new(Some(date!(2023 - 01 - 01)), None);
        let out = analyzer.analyze(&s, range).unwrap();
        assert_eq!(out.points.len(), 2);
        assert_eq!(out.points[0].target, curve.value(0));
        assert_eq!(out.points[1].target, curve.value(1));

        assert_eq!(out.plant_years.len(), 2);
        assert_eq!(out.plant_years[0].starts_on, date!(2022 - 07 - 01));
        assert_eq!(out.plant_years[1].starts_on, date!(2023 - 07 - 01));

        // Unfiltered, the same dates sit in years 1 and 2.
        let full = analyzer.analyze(&s, DateRange::default()).unwrap();
        assert_eq!(full.points[1].target, curve.value(1));
        assert_eq!(full.points[2].target, curve.value(2));
        assert_eq!(full.plant_years.len(), 3);
    }

    #[test]
    fn configured_anchor_ignores_range_filter() {
        let analyzer = Analyzer {
            anchor: Some(date!(2021 - 07 - 01)),
            ..Analyzer::default()
        };
        let s = series([
            rec(date!(2021 - 08 - 01), Some(70.0), None),
            rec(date!(2023 - 07 - 01), Some(70.0), None),
        ]);
        let range = DateRange::new(Some(date!(2023 - 01 - 01)), None);
        let out = analyzer.analyze(&s, range).unwrap();
        assert_eq!(out.points[0].target, analyzer.target.value(2));
    }

    #[test]
    fn leap_day_anchor_keeps_full_schedule() {
        let analyzer = Analyzer {
            anchor: Some(date!(2024 - 02 - 29)),
            ..Analyzer::default()
        };
        let s = series([rec(date!(2027 - 06 - 01), Some(70.0), None)]);
        let out = analyzer.analyze(&s, DateRange::default()).unwrap();

        let starts: Vec<Date> = out.plant_years.iter().map(|y| y.starts_on).collect();
        assert_eq!(
            starts,
            vec![
                date!(2024 - 02 - 29),
                date!(2025 - 03 - 01),
                date!(2026 - 03 - 01),
                date!(2027 - 03 - 01),
            ]
        );
    }

    #[test]
    fn configured_anchor_overrides_july_default() {
        let analyzer = Analyzer {
            anchor: Some(date!(2022 - 01 - 01)),
            ..Analyzer::default()
        };
        let s = series([rec(date!(2023 - 01 - 01), Some(70.0), None)]);
        let out = analyzer.analyze(&s, DateRange::default()).unwrap();
        assert_eq!(out.points[0].target, analyzer.target.value(1));
    }

    #[test]
    fn trailing_windows_use_last_filtered_date() {
        let start = date!(2024 - 01 - 01);
        let s = series((0..100).map(|i| rec(start + Duration::days(i), Some(50.0), Some(4.0))));
        let out = Analyzer::default().analyze(&s, DateRange::default()).unwrap();

        assert_eq!(out.windows.len(), 6);
        assert_eq!(out.average(TrailingWindow::Days(30)), Some(50.0));
        assert_eq!(out.average(TrailingWindow::Days(365)), Some(50.0));
        assert!(out.points.iter().all(|p| p.ghi_class == GhiClass::Good));
    }
}
