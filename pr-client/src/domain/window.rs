/// Trailing windows summarised on the chart, evaluated as of the last date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrailingWindow {
    Days(u16),
    Lifetime,
}

impl TrailingWindow {
    pub const ALL: [TrailingWindow; 6] = [
        Self::Days(7),
        Self::Days(30),
        Self::Days(60),
        Self::Days(90),
        Self::Days(365),
        Self::Lifetime,
    ];

    /// Calendar length in days, `None` for the lifetime window.
    pub fn days(self) -> Option<u16> {
        match self {
            Self::Days(n) => Some(n),
            Self::Lifetime => None,
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::Days(n) => format!("last {n}~d"),
            Self::Lifetime => "Lifetime".to_string(),
        }
    }
}
