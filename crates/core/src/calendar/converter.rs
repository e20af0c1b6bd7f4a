//! Conversion between Gregorian and Bikram Sambat dates.

use chrono::{DateTime, Days, NaiveDate};
use chrono_tz::Asia::Kathmandu;

use super::date::BsDate;
use super::error::CalendarError;
use super::table::{self, EPOCH, FIRST_YEAR, LAST_YEAR};

fn out_of_range(date: NaiveDate) -> CalendarError {
    CalendarError::OutOfRange(format!(
        "{date} is outside the supported range {FIRST_YEAR}..={LAST_YEAR} BS"
    ))
}

/// Converts a Gregorian day to Bikram Sambat.
///
/// # Errors
///
/// Returns `OutOfRange` when the day is not covered by the month-length table.
pub fn to_bikram_sambat(date: NaiveDate) -> Result<BsDate, CalendarError> {
    let offset = date.signed_duration_since(EPOCH).num_days();
    if offset < 0 || offset >= table::total_days() {
        return Err(out_of_range(date));
    }

    let mut remaining = offset;
    for year in FIRST_YEAR..=LAST_YEAR {
        let Some(months) = table::row(year) else { break };
        let year_len: i64 = months.iter().map(|days| i64::from(*days)).sum();
        if remaining >= year_len {
            remaining -= year_len;
            continue;
        }
        for (month, len) in (1u32..).zip(months.iter()) {
            let len = i64::from(*len);
            if remaining < len {
                let day = u32::try_from(remaining + 1).map_err(|_| out_of_range(date))?;
                return BsDate::new(year, month, day);
            }
            remaining -= len;
        }
    }
    Err(out_of_range(date))
}

/// Converts a Bikram Sambat date to its Gregorian day.
///
/// # Errors
///
/// Only fails if the Gregorian result would overflow `NaiveDate`, which cannot
/// happen for dates inside the table.
pub fn to_gregorian(date: BsDate) -> Result<NaiveDate, CalendarError> {
    let whole_years: u64 = (FIRST_YEAR..date.year())
        .filter_map(table::days_in_year)
        .map(u64::from)
        .sum();
    let whole_months: u64 = (1..date.month())
        .filter_map(|month| table::days_in_month(date.year(), month))
        .map(u64::from)
        .sum();
    let offset = whole_years + whole_months + u64::from(date.day()) - 1;

    EPOCH
        .checked_add_days(Days::new(offset))
        .ok_or_else(|| CalendarError::OutOfRange(date.to_string()))
}

/// Parses a Gregorian date given as `YYYY-MM-DD` or as an RFC 3339 instant.
///
/// Instants are reduced to the calendar day they fall on in Nepal time, so
/// `2023-04-13T20:00:00Z` is the Nepali day `2023-04-14`.
///
/// # Errors
///
/// Returns `InvalidDate` when neither form parses.
pub fn parse_gregorian(input: &str) -> Result<NaiveDate, CalendarError> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|instant| instant.with_timezone(&Kathmandu).date_naive())
        .map_err(|_| CalendarError::InvalidDate(format!("'{trimmed}' is not a Gregorian date")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ad(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[rstest]
    #[case(ad(1943, 4, 14), "2000-01-01")]
    #[case(ad(2001, 1, 1), "2057-09-17")]
    #[case(ad(2022, 8, 31), "2079-05-15")]
    #[case(ad(2023, 4, 14), "2080-01-01")]
    #[case(ad(2024, 4, 12), "2080-12-30")]
    #[case(ad(2024, 4, 13), "2081-01-01")]
    #[case(ad(2024, 7, 15), "2081-03-32")]
    #[case(ad(2024, 7, 16), "2081-04-01")]
    #[case(ad(2025, 4, 14), "2082-01-01")]
    #[case(ad(2025, 10, 10), "2082-06-24")]
    #[case(ad(2034, 4, 13), "2090-12-30")]
    fn test_known_pairs(#[case] gregorian: NaiveDate, #[case] bs: &str) {
        let expected: BsDate = bs.parse().unwrap();
        assert_eq!(to_bikram_sambat(gregorian).unwrap(), expected);
        assert_eq!(to_gregorian(expected).unwrap(), gregorian);
    }

    #[rstest]
    #[case(ad(1943, 4, 13))]
    #[case(ad(2034, 4, 14))]
    #[case(ad(1900, 1, 1))]
    fn test_out_of_range(#[case] gregorian: NaiveDate) {
        assert!(matches!(
            to_bikram_sambat(gregorian),
            Err(CalendarError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(parse_gregorian("2023-04-14").unwrap(), ad(2023, 4, 14));
    }

    #[test]
    fn test_parse_instant_uses_nepal_day() {
        // 20:00 UTC is 01:45 the next day in Kathmandu (UTC+05:45).
        assert_eq!(
            parse_gregorian("2023-04-13T20:00:00Z").unwrap(),
            ad(2023, 4, 14)
        );
        assert_eq!(
            parse_gregorian("2023-04-13T18:00:00Z").unwrap(),
            ad(2023, 4, 13)
        );
    }

    #[rstest]
    #[case("2023-02-30")]
    #[case("14/04/2023")]
    #[case("yesterday")]
    fn test_parse_rejects_malformed(#[case] input: &str) {
        assert!(matches!(
            parse_gregorian(input),
            Err(CalendarError::InvalidDate(_))
        ));
    }
}
