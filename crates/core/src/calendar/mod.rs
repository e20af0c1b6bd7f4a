//! Dual-calendar (Gregorian / Bikram Sambat) dates.
//!
//! - Embedded month-length table for BS 2000 through 2090
//! - Bidirectional conversion and date parsing
//! - [`DualDate`] value object keeping both forms consistent
//! - Display formatting in English and Nepali
//! - Nepali fiscal years

pub mod converter;
pub mod date;
pub mod dual;
pub mod error;
pub mod fiscal;
pub mod format;
pub mod table;

#[cfg(test)]
mod props;

pub use converter::{parse_gregorian, to_bikram_sambat, to_gregorian};
pub use date::BsDate;
pub use dual::DualDate;
pub use error::CalendarError;
pub use fiscal::FiscalYear;
pub use format::{Calendar, Locale, format, format_bikram_sambat, format_gregorian};
pub use table::{days_in_month, days_in_year};
