//! Dual-calendar date value object.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::converter::{parse_gregorian, to_bikram_sambat, to_gregorian};
use super::date::BsDate;
use super::error::CalendarError;

/// A calendar day carried in both Gregorian and Bikram Sambat form.
///
/// The two halves always denote the same day; every constructor enforces it,
/// and deserialization goes through [`DualDate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "DualDateParts", into = "DualDateParts")]
pub struct DualDate {
    gregorian: NaiveDate,
    bikram_sambat: BsDate,
}

/// Wire form: `{"gregorian": "2023-04-14", "nepali": "2080-01-01"}`.
#[derive(Serialize, Deserialize)]
struct DualDateParts {
    gregorian: NaiveDate,
    nepali: BsDate,
}

impl DualDate {
    /// Builds the pair from a Gregorian day.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` outside the supported span.
    pub fn from_gregorian(gregorian: NaiveDate) -> Result<Self, CalendarError> {
        Ok(Self {
            gregorian,
            bikram_sambat: to_bikram_sambat(gregorian)?,
        })
    }

    /// Builds the pair from a Bikram Sambat date.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` only if the Gregorian day would overflow
    /// `NaiveDate`. A `BsDate` is already checked against the table, so every
    /// one that exists converts.
    pub fn from_bikram_sambat(bikram_sambat: BsDate) -> Result<Self, CalendarError> {
        Ok(Self {
            gregorian: to_gregorian(bikram_sambat)?,
            bikram_sambat,
        })
    }

    /// Builds the pair from both halves, rejecting pairs that name different days.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDate` when the halves disagree.
    pub fn new(gregorian: NaiveDate, bikram_sambat: BsDate) -> Result<Self, CalendarError> {
        let derived = Self::from_gregorian(gregorian)?;
        if derived.bikram_sambat != bikram_sambat {
            return Err(CalendarError::InvalidDate(format!(
                "{gregorian} is {} BS, not {bikram_sambat}",
                derived.bikram_sambat
            )));
        }
        Ok(derived)
    }

    /// Normalizes raw request input where either or both halves may be given.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDate` when neither half is given, either is malformed, or
    /// they disagree.
    pub fn parse(gregorian: Option<&str>, bikram_sambat: Option<&str>) -> Result<Self, CalendarError> {
        let gregorian = gregorian
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_gregorian)
            .transpose()?;
        let bikram_sambat = bikram_sambat
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<BsDate>)
            .transpose()?;

        match (gregorian, bikram_sambat) {
            (Some(ad), Some(bs)) => Self::new(ad, bs),
            (Some(ad), None) => Self::from_gregorian(ad),
            (None, Some(bs)) => Self::from_bikram_sambat(bs),
            (None, None) => Err(CalendarError::InvalidDate("no date given".to_string())),
        }
    }

    /// The Gregorian day.
    #[must_use]
    pub const fn gregorian(&self) -> NaiveDate {
        self.gregorian
    }

    /// The Bikram Sambat day.
    #[must_use]
    pub const fn bikram_sambat(&self) -> BsDate {
        self.bikram_sambat
    }
}

impl TryFrom<DualDateParts> for DualDate {
    type Error = CalendarError;

    fn try_from(parts: DualDateParts) -> Result<Self, Self::Error> {
        Self::new(parts.gregorian, parts.nepali)
    }
}

impl From<DualDate> for DualDateParts {
    fn from(date: DualDate) -> Self {
        Self {
            gregorian: date.gregorian,
            nepali: date.bikram_sambat,
        }
    }
}
