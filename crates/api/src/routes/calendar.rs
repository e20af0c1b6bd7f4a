//! Calendar conversion endpoint (public).

use axum::{
    Json, Router,
    extract::{Query, rejection::QueryRejection},
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{ApiError, AppState, Store};
use khata_core::calendar::{Calendar, CalendarError, DualDate, FiscalYear, Locale, days_in_month, format};
use khata_core::posting::PostingError;

/// Creates the calendar routes.
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new().route("/calendar/convert", get(convert))
}

/// Query of the conversion endpoint; give either side, or both to check them.
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    /// Gregorian day, `YYYY-MM-DD`.
    pub ad: Option<String>,
    /// Bikram Sambat day, `YYYY-MM-DD`.
    pub bs: Option<String>,
}

/// Both representations of a day, with display strings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    /// Gregorian day.
    pub gregorian: String,
    /// Bikram Sambat day.
    pub nepali: String,
    /// Rendered forms.
    pub formatted: FormattedDates,
    /// Nepali fiscal year containing the day, e.g. `2080/81`.
    pub fiscal_year: FiscalYear,
    /// Length of the BS month the day falls in.
    pub days_in_month: u32,
}

/// Display strings of a day.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedDates {
    /// `April 14, 2023`.
    pub gregorian: String,
    /// `Baisakh 01, 2080`.
    pub nepali: String,
    /// Devanagari month name and digits.
    pub nepali_devanagari: String,
}

/// GET `/calendar/convert` - Convert a day between AD and BS.
async fn convert(
    query: Result<Query<ConvertQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let ad = query.ad.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let bs = query.bs.as_deref().map(str::trim).filter(|s| !s.is_empty());

    if ad.is_none() && bs.is_none() {
        return Err(PostingError::Validation {
            field: "ad".to_string(),
            message: "either ad or bs is required".to_string(),
        }
        .into());
    }

    let date = DualDate::parse(ad, bs)?;
    let bikram_sambat = date.bikram_sambat();
    let month_length = days_in_month(bikram_sambat.year(), bikram_sambat.month())
        .ok_or_else(|| CalendarError::OutOfRange(bikram_sambat.to_string()))?;

    Ok(Json(ConvertResponse {
        gregorian: date.gregorian().to_string(),
        nepali: bikram_sambat.to_string(),
        formatted: FormattedDates {
            gregorian: format(&date, Calendar::Gregorian, Locale::English),
            nepali: format(&date, Calendar::BikramSambat, Locale::English),
            nepali_devanagari: format(&date, Calendar::BikramSambat, Locale::Nepali),
        },
        fiscal_year: FiscalYear::containing(bikram_sambat),
        days_in_month: month_length,
    }))
}
