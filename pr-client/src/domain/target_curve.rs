use time::{Date, Month};

/// Degrading PR target: `initial_value * (1 - annual_decay) ^ plant_year`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TargetCurve {
    pub initial_value: f64,
    pub annual_decay: f64,
}

impl Default for TargetCurve {
    fn default() -> Self {
        Self {
            initial_value: 73.9,
            annual_decay: 0.008,
        }
    }
}

impl TargetCurve {
    pub fn value(&self, plant_year: u32) -> f64 {
        let exp = i32::try_from(plant_year).unwrap_or(i32::MAX);
        self.initial_value * (1.0 - self.annual_decay).powi(exp)
    }
}

/// Plant-year calendar. Year 0 starts on the anchor date; every anniversary of
/// the anchor starts the next year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlantYears {
    anchor: Date,
}

impl PlantYears {
    pub fn new(anchor: Date) -> Self {
        Self { anchor }
    }

    /// Anchored on the latest July 1 on or before `date`.
    pub fn july_on_or_before(date: Date) -> Self {
        let year = if u8::from(date.month()) >= 7 {
            date.year()
        } else {
            date.year() - 1
        };
        let anchor = Date::from_calendar_date(year, Month::July, 1).unwrap_or(Date::MIN);
        Self { anchor }
    }

    pub fn anchor(&self) -> Date {
        self.anchor
    }

    /// Number of completed plant years between the anchor and `date`.
    /// Dates before the anchor belong to year 0.
    pub fn index_of(&self, date: Date) -> u32 {
        if date <= self.anchor {
            return 0;
        }
        let mut years = date.year() - self.anchor.year();
        let day_of = |d: Date| (u8::from(d.month()), d.day());
        if day_of(date) < day_of(self.anchor) {
            years -= 1;
        }
        u32::try_from(years).unwrap_or(0)
    }

    /// First day of plant year `index`, if representable. A Feb 29 anchor
    /// starts non-leap years on Mar 1, matching `index_of`.
    pub fn start_of(&self, index: u32) -> Option<Date> {
        let offset = i32::try_from(index).ok()?;
        let year = self.anchor.year().checked_add(offset)?;
        self.anchor
            .replace_year(year)
            .or_else(|_| Date::from_calendar_date(year, Month::March, 1))
            .ok()
    }
}
