use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::LibraryServiceError;

pub mod admin;
pub mod auth;
pub mod borrow;
pub mod card_application;
pub mod catalog;
pub mod contact;
pub mod donation;
pub mod health;

/// Body returned by deletes and logout.
#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

pub fn success() -> Json<Success> {
    Json(Success { success: true })
}

/// Parse an optional client timestamp. Accepts RFC 3339 or a bare
/// `YYYY-MM-DD` date (midnight UTC); blank means absent.
pub fn parse_timestamp(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, LibraryServiceError> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    parse_date(field, Some(value.to_owned()))
        .map(|date| date.and_then(|d| d.and_hms_opt(0, 0, 0)).map(|dt| dt.and_utc()))
}

/// Parse an optional `YYYY-MM-DD` date; blank means absent.
pub fn parse_date(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<NaiveDate>, LibraryServiceError> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|_| LibraryServiceError::InvalidPayload(format!("{field} `{value}` is not a date")))
}
