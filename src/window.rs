//! Navigable window of dates
//!
//! Holds an ordered run of consecutive dates and a cursor. Moving near either
//! end grows the run by a week in that direction so there is always a day to
//! move to.

use chrono::{Duration, NaiveDate};

/// Days added when the window grows
pub const EXTEND_DAYS: usize = 7;

/// Days shown on each side of a freshly centered date
const CENTER_RADIUS: i64 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    dates: Vec<NaiveDate>,
    current: usize,
}

impl DateWindow {
    /// Seven dates centered on `date`, with the cursor on `date`
    pub fn centered(date: NaiveDate) -> Self {
        let dates = (-CENTER_RADIUS..=CENTER_RADIUS)
            .map(|offset| date + Duration::days(offset))
            .collect();
        Self {
            dates,
            current: CENTER_RADIUS as usize,
        }
    }

    /// The date under the cursor
    pub fn current(&self) -> NaiveDate {
        self.dates[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Moves one day back, growing the front first when the cursor is near it
    pub fn previous(&mut self) -> NaiveDate {
        if self.current <= 1 {
            self.extend_front();
        }
        self.current -= 1;
        self.current()
    }

    /// Moves one day forward, growing the back first when the cursor is near it
    pub fn next(&mut self) -> NaiveDate {
        if self.current + 2 >= self.dates.len() {
            self.extend_back();
        }
        self.current += 1;
        self.current()
    }

    /// Replaces the window with seven dates centered on `date`
    pub fn jump_to(&mut self, date: NaiveDate) {
        *self = Self::centered(date);
    }

    /// Prepends a week of earlier dates, keeping the cursor on the same date
    fn extend_front(&mut self) {
        let first = self.dates[0];
        let earlier = (1..=EXTEND_DAYS as i64)
            .rev()
            .map(|offset| first - Duration::days(offset));
        self.dates.splice(0..0, earlier);
        self.current += EXTEND_DAYS;
    }

    /// Appends a week of later dates
    fn extend_back(&mut self) {
        let last = self.dates[self.dates.len() - 1];
        self.dates
            .extend((1..=EXTEND_DAYS as i64).map(|offset| last + Duration::days(offset)));
    }
}
