//! Nepali fiscal years (Shrawan 1 through the last day of Ashadh).

use std::fmt;

use serde::{Serialize, Serializer};

use super::date::BsDate;
use super::error::CalendarError;
use super::table::days_in_month;

/// Month in which the fiscal year opens (Shrawan).
const OPENING_MONTH: u32 = 4;

/// A Nepali fiscal year, identified by the BS year it opens in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FiscalYear {
    start_year: i32,
}

impl FiscalYear {
    /// Fiscal year containing the given BS date.
    #[must_use]
    pub fn containing(date: BsDate) -> Self {
        let start_year = if date.month() >= OPENING_MONTH {
            date.year()
        } else {
            date.year() - 1
        };
        Self { start_year }
    }

    /// BS year in which the fiscal year opens.
    #[must_use]
    pub const fn start_year(&self) -> i32 {
        self.start_year
    }

    /// First day (Shrawan 1).
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` when the opening year precedes the month table,
    /// as for the fiscal year holding the table's first months.
    pub fn first_day(&self) -> Result<BsDate, CalendarError> {
        BsDate::new(self.start_year, OPENING_MONTH, 1)
    }

    /// Last day (end of Ashadh the following year).
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` when the closing year lies past the month table.
    pub fn last_day(&self) -> Result<BsDate, CalendarError> {
        let year = self.start_year + 1;
        let month = OPENING_MONTH - 1;
        let day = days_in_month(year, month)
            .ok_or_else(|| CalendarError::OutOfRange(format!("fiscal year {self}")))?;
        BsDate::new(year, month, day)
    }

    /// True if the date falls inside this fiscal year.
    #[must_use]
    pub fn contains(&self, date: BsDate) -> bool {
        Self::containing(date) == *self
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{:02}",
            self.start_year,
            (self.start_year + 1).rem_euclid(100)
        )
    }
}

impl Serialize for FiscalYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn bs(s: &str) -> BsDate {
        s.parse().unwrap()
    }

    #[rstest]
    #[case("2081-04-01", "2081/82")]
    #[case("2082-03-31", "2081/82")]
    #[case("2082-01-01", "2081/82")]
    #[case("2081-03-32", "2080/81")]
    #[case("2090-04-01", "2090/91")]
    fn test_containing(#[case] date: &str, #[case] expected: &str) {
        assert_eq!(FiscalYear::containing(bs(date)).to_string(), expected);
    }

    #[test]
    fn test_bounds() {
        let fy = FiscalYear::containing(bs("2081-10-10"));
        assert_eq!(fy.first_day().unwrap(), bs("2081-04-01"));
        assert_eq!(fy.last_day().unwrap(), bs("2082-03-31"));
        assert!(fy.contains(bs("2082-03-31")));
        assert!(!fy.contains(bs("2082-04-01")));
    }

    #[test]
    fn test_last_day_beyond_table() {
        let fy = FiscalYear::containing(bs("2090-05-01"));
        assert!(matches!(fy.last_day(), Err(CalendarError::OutOfRange(_))));
    }

    #[test]
    fn test_first_day_before_table() {
        let fy = FiscalYear::containing(bs("2000-01-01"));
        assert_eq!(fy.to_string(), "1999/00");
        assert!(matches!(fy.first_day(), Err(CalendarError::OutOfRange(_))));
        assert_eq!(fy.last_day().unwrap().year(), 2000);
    }

    #[test]
    fn test_serializes_as_label() {
        let fy = FiscalYear::containing(bs("2081-04-01"));
        assert_eq!(serde_json::to_string(&fy).unwrap(), "\"2081/82\"");
    }
}
