//! Property-based tests for calendar conversion.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use super::converter::{to_bikram_sambat, to_gregorian};
use super::date::BsDate;
use super::dual::DualDate;
use super::table::{self, EPOCH};

/// Strategy for any Gregorian day inside the supported span.
fn supported_gregorian() -> impl Strategy<Value = NaiveDate> {
    let span = u64::try_from(table::total_days()).unwrap();
    (0..span).prop_map(|offset| EPOCH.checked_add_days(Days::new(offset)).unwrap())
}

/// Strategy for any valid BS date.
fn valid_bs_date() -> impl Strategy<Value = BsDate> {
    (table::FIRST_YEAR..=table::LAST_YEAR, 1u32..=12).prop_flat_map(|(year, month)| {
        let max_day = table::days_in_month(year, month).unwrap();
        (1..=max_day).prop_map(move |day| BsDate::new(year, month, day).unwrap())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Converting to BS and back yields the same Gregorian day.
    #[test]
    fn prop_gregorian_round_trip(date in supported_gregorian()) {
        let bs = to_bikram_sambat(date).unwrap();
        prop_assert_eq!(to_gregorian(bs).unwrap(), date);
    }

    /// Converting to Gregorian and back yields the same BS date.
    #[test]
    fn prop_bikram_sambat_round_trip(bs in valid_bs_date()) {
        let ad = to_gregorian(bs).unwrap();
        prop_assert_eq!(to_bikram_sambat(ad).unwrap(), bs);
    }

    /// Consecutive Gregorian days map to strictly increasing BS dates.
    #[test]
    fn prop_conversion_is_monotonic(date in supported_gregorian()) {
        if let Some(next) = date.succ_opt() {
            if let Ok(next_bs) = to_bikram_sambat(next) {
                prop_assert!(to_bikram_sambat(date).unwrap() < next_bs);
            }
        }
    }

    /// Every constructor of a dual date agrees with the others.
    #[test]
    fn prop_dual_date_constructors_agree(date in supported_gregorian()) {
        let from_ad = DualDate::from_gregorian(date).unwrap();
        let from_bs = DualDate::from_bikram_sambat(from_ad.bikram_sambat()).unwrap();
        prop_assert_eq!(from_ad, from_bs);
        prop_assert!(DualDate::new(date, from_ad.bikram_sambat()).is_ok());
    }
}
