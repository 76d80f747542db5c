//! Clock capability
//!
//! Affiliation recency, custom-year validation and correction stamping all
//! need "today". Components take a `&dyn Clock` instead of reading the
//! system time so tests can pin the date.

use chrono::{Datelike, Local, NaiveDate};

/// Source of the current date
pub trait Clock: Send + Sync {
    /// Current local date
    fn today(&self) -> NaiveDate;

    /// Current calendar year
    fn current_year(&self) -> i32 {
        self.today().year()
    }
}

/// Wall-clock implementation backed by the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a fixed date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    date: NaiveDate,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Pin the clock to January 1st of `year`
    ///
    /// Falls back to the Unix epoch date for years chrono cannot represent.
    pub fn for_year(year: i32) -> Self {
        let date = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or_default();
        Self { date }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_reports_pinned_date() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let clock = FixedClock::new(date);
        assert_eq!(clock.today(), date);
        assert_eq!(clock.current_year(), 2025);
    }

    #[test]
    fn test_fixed_clock_for_year() {
        let clock = FixedClock::for_year(2020);
        assert_eq!(clock.current_year(), 2020);
        assert_eq!(clock.today().month(), 1);
        assert_eq!(clock.today().day(), 1);
    }

    #[test]
    fn test_system_clock_is_recent() {
        let year = SystemClock.current_year();
        // Should be a reasonable year (after 2000, before 2100)
        assert!(year > 2000 && year < 2100);
    }
}
