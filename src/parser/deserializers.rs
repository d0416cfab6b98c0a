use chrono::{NaiveDate, NaiveDateTime};

/// Formats accepted for timestamps in the records-service export.
const DATETIME_FORMATS: &[&str] = &[
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%SZ",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Parse a datetime in one of the export formats ("05-01-2026 16:24", ISO...).
/// Returns None for empty or unparseable strings.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}

/// Parse a date-only string ("2025-09-01", "01/09/2025").
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Parse an amount that may contain (non-breaking) spaces ("45 000" → 45000).
/// A leading minus sign is kept so the classifier can reject it.
pub fn parse_spaced_amount(s: &str) -> Option<i64> {
    let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_french() {
        let dt = parse_datetime("05-01-2026 16:24").unwrap();
        assert_eq!(dt.format("%Y-%m-%dT%H:%M:%S").to_string(), "2026-01-05T16:24:00");
    }

    #[test]
    fn test_parse_datetime_iso() {
        assert!(parse_datetime("2026-01-05T16:24:00").is_some());
        assert!(parse_datetime("2026-01-05 16:24:00").is_some());
        assert!(parse_datetime("2026-01-05T16:24:00Z").is_some());
    }

    #[test]
    fn test_parse_datetime_empty_or_garbage() {
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("   ").is_none());
        assert!(parse_datetime("hier").is_none());
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        assert_eq!(parse_date("2025-09-01"), Some(expected));
        assert_eq!(parse_date("01/09/2025"), Some(expected));
        assert_eq!(parse_date("septembre"), None);
    }

    #[test]
    fn test_parse_spaced_amount() {
        assert_eq!(parse_spaced_amount("45 000"), Some(45_000));
        assert_eq!(parse_spaced_amount("45\u{00A0}000"), Some(45_000));
        assert_eq!(parse_spaced_amount("-100"), Some(-100));
        assert_eq!(parse_spaced_amount(""), None);
        assert_eq!(parse_spaced_amount("12,5"), None);
    }
}
