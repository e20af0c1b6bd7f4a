//! Bikram Sambat calendar date value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::CalendarError;
use super::table::{FIRST_YEAR, LAST_YEAR, days_in_month};

/// A validated Bikram Sambat date.
///
/// Construction checks the day against the embedded month-length table, so a
/// `BsDate` always names a day that exists. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BsDate {
    year: i32,
    month: u32,
    day: u32,
}

impl BsDate {
    /// Creates a BS date, validating it against the month-length table.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` for years outside the table and `InvalidDate` for a
    /// month outside 1..=12 or a day beyond the month's length.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, CalendarError> {
        if !(FIRST_YEAR..=LAST_YEAR).contains(&year) {
            return Err(CalendarError::OutOfRange(format!(
                "BS year {year} is outside {FIRST_YEAR}..={LAST_YEAR}"
            )));
        }
        let Some(max_day) = days_in_month(year, month) else {
            return Err(CalendarError::InvalidDate(format!(
                "{year:04}-{month:02}-{day:02}: month must be between 1 and 12"
            )));
        };
        if day == 0 || day > max_day {
            return Err(CalendarError::InvalidDate(format!(
                "{year:04}-{month:02}-{day:02}: month has {max_day} days"
            )));
        }
        Ok(Self { year, month, day })
    }

    /// BS year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// BS month, 1 (Baisakh) through 12 (Chaitra).
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Day of month, starting at 1.
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }
}

fn parse_component<T: FromStr>(part: &str, input: &str) -> Result<T, CalendarError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CalendarError::InvalidDate(format!(
            "'{input}' is not a YYYY-MM-DD date"
        )));
    }
    part.parse()
        .map_err(|_| CalendarError::InvalidDate(format!("'{input}' has an oversized component")))
}

impl FromStr for BsDate {
    type Err = CalendarError;

    /// Parses `YYYY-MM-DD`; `/` is accepted as the separator too.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let parts: Vec<&str> = trimmed.split(['-', '/']).collect();
        let [year, month, day] = parts.as_slice() else {
            return Err(CalendarError::InvalidDate(format!(
                "'{trimmed}' is not a YYYY-MM-DD date"
            )));
        };
        Self::new(
            parse_component(year, trimmed)?,
            parse_component(month, trimmed)?,
            parse_component(day, trimmed)?,
        )
    }
}

impl fmt::Display for BsDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl TryFrom<String> for BsDate {
    type Error = CalendarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BsDate> for String {
    fn from(date: BsDate) -> Self {
        date.to_string()
    }
}
