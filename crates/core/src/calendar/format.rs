//! Locale-aware display strings for dates.
//!
//! Formatting is pure presentation and never changes the underlying day.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::date::BsDate;
use super::dual::DualDate;

/// Calendar to render a date in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Calendar {
    /// Gregorian (AD).
    Gregorian,
    /// Bikram Sambat (BS).
    BikramSambat,
}

/// Display language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Latin script month names and digits.
    #[default]
    English,
    /// Devanagari month names and digits.
    Nepali,
}

const BS_MONTHS_EN: [&str; 12] = [
    "Baisakh", "Jestha", "Ashadh", "Shrawan", "Bhadra", "Ashwin", "Kartik", "Mangsir", "Poush",
    "Magh", "Falgun", "Chaitra",
];

const BS_MONTHS_NE: [&str; 12] = [
    "बैशाख", "जेठ", "असार", "साउन", "भदौ", "असोज", "कार्तिक", "मंसिर", "पुस", "माघ", "फागुन", "चैत",
];

const AD_MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

const AD_MONTHS_NE: [&str; 12] = [
    "जनवरी", "फेब्रुअरी", "मार्च", "अप्रिल", "मे", "जुन", "जुलाई", "अगस्ट", "सेप्टेम्बर", "अक्टोबर",
    "नोभेम्बर", "डिसेम्बर",
];

const DEVANAGARI_DIGITS: [char; 10] = ['०', '१', '२', '३', '४', '५', '६', '७', '८', '९'];

fn month_name(names: &'static [&'static str; 12], month: u32) -> &'static str {
    usize::try_from(month)
        .ok()
        .and_then(|m| m.checked_sub(1))
        .and_then(|index| names.get(index))
        .copied()
        .unwrap_or("")
}

/// Replaces ASCII digits with Devanagari digits.
#[must_use]
pub fn to_devanagari_digits(text: &str) -> String {
    text.chars()
        .map(|c| {
            c.to_digit(10)
                .and_then(|d| usize::try_from(d).ok())
                .and_then(|d| DEVANAGARI_DIGITS.get(d).copied())
                .unwrap_or(c)
        })
        .collect()
}

fn localize(text: String, locale: Locale) -> String {
    match locale {
        Locale::English => text,
        Locale::Nepali => to_devanagari_digits(&text),
    }
}

/// Renders a BS date as `Baisakh 01, 2080` (or `बैशाख ०१, २०८०`).
#[must_use]
pub fn format_bikram_sambat(date: BsDate, locale: Locale) -> String {
    let names = match locale {
        Locale::English => &BS_MONTHS_EN,
        Locale::Nepali => &BS_MONTHS_NE,
    };
    let text = format!(
        "{} {:02}, {}",
        month_name(names, date.month()),
        date.day(),
        date.year()
    );
    localize(text, locale)
}

/// Renders a Gregorian date as `April 14, 2023`.
#[must_use]
pub fn format_gregorian(date: NaiveDate, locale: Locale) -> String {
    let names = match locale {
        Locale::English => &AD_MONTHS_EN,
        Locale::Nepali => &AD_MONTHS_NE,
    };
    let text = format!(
        "{} {}, {}",
        month_name(names, date.month()),
        date.day(),
        date.year()
    );
    localize(text, locale)
}

/// Renders one half of a dual date.
#[must_use]
pub fn format(date: &DualDate, calendar: Calendar, locale: Locale) -> String {
    match calendar {
        Calendar::Gregorian => format_gregorian(date.gregorian(), locale),
        Calendar::BikramSambat => format_bikram_sambat(date.bikram_sambat(), locale),
    }
}
