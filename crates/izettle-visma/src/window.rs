use chrono::{Days, NaiveDate};

/// Inclusive range of days a reconciliation pass looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        DateWindow { from, to }
    }

    /// Ends `lag_days` before `today`, so days whose reports may still change are left alone.
    pub fn with_lag(from: NaiveDate, today: NaiveDate, lag_days: u32) -> Self {
        let to = today
            .checked_sub_days(Days::new(u64::from(lag_days)))
            .unwrap_or(NaiveDate::MIN);
        DateWindow { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn is_empty(&self) -> bool {
        self.to < self.from
    }
}
