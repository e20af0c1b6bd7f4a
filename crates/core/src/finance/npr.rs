//! Nepali rupee display formatting.

use rust_decimal::Decimal;

use super::calculator::round_money;

/// How to label a rupee amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NprStyle {
    /// `रु 1,13,000.00`: rupee sign with lakh/crore grouping.
    Symbol,
    /// `NPR 113,000.00`: ISO code with thousands grouping.
    Code,
}

/// Groups an integer digit string as thousands then pairs (`12,34,567`).
fn group_south_asian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, last3) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = front;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();
    groups.push(last3);
    groups.join(",")
}

/// Groups an integer digit string in threes (`1,234,567`).
fn group_thousands(digits: &str) -> String {
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = digits;
    while rest.len() > 3 {
        let (front, triple) = rest.split_at(rest.len() - 3);
        groups.push(triple);
        rest = front;
    }
    groups.push(rest);
    groups.reverse();
    groups.join(",")
}

/// Formats an amount as Nepali rupees, rounded to paisa.
///
/// ```
/// use rust_decimal_macros::dec;
/// use khata_core::finance::{NprStyle, format_npr};
///
/// assert_eq!(format_npr(dec!(113000), NprStyle::Symbol), "रु 1,13,000.00");
/// assert_eq!(format_npr(dec!(113000), NprStyle::Code), "NPR 113,000.00");
/// ```
#[must_use]
pub fn format_npr(amount: Decimal, style: NprStyle) -> String {
    let rounded = round_money(amount);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let plain = format!("{:.2}", rounded.abs());
    let (whole, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    match style {
        NprStyle::Symbol => format!("{sign}रु {}.{fraction}", group_south_asian(whole)),
        NprStyle::Code => format!("{sign}NPR {}.{fraction}", group_thousands(whole)),
    }
}
