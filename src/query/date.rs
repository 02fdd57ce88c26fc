//! Article date parsing

use chrono::{Datelike, NaiveDate};

/// Accepted article date layouts
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"];

/// Parse `YYYY-MM-DD`, `YYYY.MM.DD` or `YYYY/MM/DD`
pub fn parse_article_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Render as `November 29 2024`; unparseable input is returned verbatim
pub fn format_long_date(raw: &str) -> String {
    match parse_article_date(raw) {
        Some(date) => date.format("%B %d %Y").to_string(),
        None => raw.to_string(),
    }
}

/// Year of a parseable article date
pub fn target_year(raw: &str) -> Option<i32> {
    parse_article_date(raw).map(|d| d.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats() {
        assert_eq!(format_long_date("2024-11-29"), "November 29 2024");
        assert_eq!(format_long_date("2024.03.05"), "March 05 2024");
        assert_eq!(format_long_date("2024/01/15"), "January 15 2024");
    }

    #[test]
    fn test_unparseable_passes_through() {
        assert_eq!(format_long_date("last Tuesday"), "last Tuesday");
        assert_eq!(format_long_date("2024-13-40"), "2024-13-40");
    }

    #[test]
    fn test_target_year() {
        assert_eq!(target_year(" 2024-11-29 "), Some(2024));
        assert_eq!(target_year("2023/02/01"), Some(2023));
        assert_eq!(target_year("yesterday"), None);
    }
}
