//! Loose date parsing for receipt text.
//!
//! Receipt emails carry dates in prose ("March 24, 2025", "Dec 18, 2024")
//! as well as numeric forms. Parsing is best-effort: anything unrecognized
//! resolves to `None`, never an error.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// "March 24, 2025", "Mar 24 2025", "Dec. 18th, 2024"
    static ref DATE_MONTH_NAME: Regex = Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b"
    )
    .unwrap();

    /// MM/DD/YYYY
    static ref DATE_MDY: Regex = Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap();

    /// YYYY-MM-DD
    static ref DATE_YMD: Regex = Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").unwrap();
}

/// Parse a date from free-form receipt text.
pub fn parse_date_loose(text: &str) -> Option<NaiveDate> {
    if let Some(caps) = DATE_MONTH_NAME.captures(text) {
        let month = month_to_number(&caps[1]);
        let day: u32 = caps[2].parse().unwrap_or(0);
        let year: i32 = caps[3].parse().unwrap_or(0);

        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = DATE_MDY.captures(text) {
        let month: u32 = caps[1].parse().unwrap_or(0);
        let day: u32 = caps[2].parse().unwrap_or(0);
        let year: i32 = caps[3].parse().unwrap_or(0);

        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = DATE_YMD.captures(text) {
        let year: i32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        let day: u32 = caps[3].parse().unwrap_or(0);

        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    None
}

fn month_to_number(month: &str) -> u32 {
    match month.to_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_long_month_name() {
        assert_eq!(
            parse_date_loose("March 24, 2025"),
            NaiveDate::from_ymd_opt(2025, 3, 24)
        );
    }

    #[test]
    fn test_parse_abbreviated_month_name() {
        assert_eq!(
            parse_date_loose("Dec 18, 2024"),
            NaiveDate::from_ymd_opt(2024, 12, 18)
        );
    }

    #[test]
    fn test_parse_embedded_in_prose() {
        assert_eq!(
            parse_date_loose("renews march 24, 2025 at the same price"),
            NaiveDate::from_ymd_opt(2025, 3, 24)
        );
    }

    #[test]
    fn test_parse_numeric_mdy() {
        assert_eq!(
            parse_date_loose("12/18/2024"),
            NaiveDate::from_ymd_opt(2024, 12, 18)
        );
    }

    #[test]
    fn test_parse_numeric_ymd() {
        assert_eq!(
            parse_date_loose("2024-12-18"),
            NaiveDate::from_ymd_opt(2024, 12, 18)
        );
    }

    #[test]
    fn test_unparsable_is_none() {
        assert_eq!(parse_date_loose("no date here"), None);
        assert_eq!(parse_date_loose(""), None);
    }

    #[test]
    fn test_invalid_calendar_date_is_none() {
        assert_eq!(parse_date_loose("February 30, 2025"), None);
    }
}
