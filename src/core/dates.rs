//! Lenient date parsing for user input and mailroom reports

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a calendar date (`2024-03-01` or `03/01/2024`)
pub fn parse_date(input: &str) -> Result<NaiveDate, String> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .ok_or_else(|| format!("Invalid date: '{}'. Use YYYY-MM-DD", input))
}

/// Parse a timestamp; a bare date means midnight
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, String> {
    let input = input.trim();
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(input) {
        return Ok(ts.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| parse_date(input).ok().map(|d| d.and_time(NaiveTime::MIN)))
        .ok_or_else(|| {
            format!(
                "Invalid timestamp: '{}'. Use 'YYYY-MM-DD HH:MM[:SS]' or YYYY-MM-DD",
                input
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(parse_date("2024-03-01"), Ok(expected));
        assert_eq!(parse_date(" 03/01/2024 "), Ok(expected));
        assert!(parse_date("March 1st").is_err());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = at(2024, 3, 1, 14, 30);
        assert_eq!(parse_timestamp("2024-03-01 14:30:00"), Ok(expected));
        assert_eq!(parse_timestamp("2024-03-01T14:30"), Ok(expected));
        assert_eq!(parse_timestamp("3/1/2024 2:30 PM"), Ok(expected));
        assert_eq!(parse_timestamp("2024-03-01T14:30:00Z"), Ok(expected));
    }

    #[test]
    fn test_bare_date_is_midnight() {
        assert_eq!(parse_timestamp("2024-03-01"), Ok(at(2024, 3, 1, 0, 0)));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("").is_err());
    }
}
