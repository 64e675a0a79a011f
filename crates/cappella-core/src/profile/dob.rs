//! Date of birth encoding
//!
//! The deployed server stores dates as `YYYY-M-D` without zero padding.
//! Parsing accepts that form and ISO `YYYY-MM-DD` alike.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// How dates of birth are written on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DobFormat {
    /// `2023-5-1`
    #[default]
    Unpadded,
    /// `2023-05-01`
    Iso,
}

/// Format a date for the wire
#[must_use]
pub fn format_dob(date: NaiveDate, format: DobFormat) -> String {
    match format {
        DobFormat::Unpadded => format!("{}-{}-{}", date.year(), date.month(), date.day()),
        DobFormat::Iso => date.format("%Y-%m-%d").to_string(),
    }
}

/// Parse a date in either the unpadded or ISO form
///
/// # Errors
/// Returns an error if the string is not a valid `year-month-day` date
pub fn parse_dob(value: &str) -> Result<NaiveDate, String> {
    let mut parts = value.trim().splitn(3, '-');
    let mut next = |label: &str| -> Result<u32, String> {
        parts
            .next()
            .filter(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| format!("Invalid date of birth '{value}': bad {label}"))
    };

    let year = next("year")?;
    let month = next("month")?;
    let day = next("day")?;
    let year = i32::try_from(year).map_err(|_| format!("Invalid date of birth '{value}'"))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("Invalid date of birth '{value}': no such date"))
}
