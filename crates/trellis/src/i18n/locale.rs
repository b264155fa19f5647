//! Locale-aware date and currency formatting.
//!
//! Only a handful of locale tags are recognized; anything else falls back to
//! the US-style default rather than failing.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use minijinja::value::ValueKind;
use minijinja::Value;

/// Locales that write dates day-first and put the currency sign after the amount.
const CANADIAN_LOCALES: &[&str] = &["en-CA", "fr-CA"];

fn is_canadian(locale: &str) -> bool {
    CANADIAN_LOCALES.contains(&locale)
}

/// Formats a date without time: `DD-MM-YYYY` for Canadian locales,
/// `MM-DD-YYYY` otherwise.
///
/// ```rust
/// use chrono::NaiveDate;
/// use trellis::i18n::to_date;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(to_date("fr-CA", date), "09-03-2024");
/// assert_eq!(to_date("en-US", date), "03-09-2024");
/// ```
pub fn to_date(locale: &str, date: NaiveDate) -> String {
    let layout = if is_canadian(locale) {
        "%d-%m-%Y"
    } else {
        "%m-%d-%Y"
    };
    date.format(layout).to_string()
}

/// Formats an amount with two decimals and the locale's dollar sign placement.
///
/// ```rust
/// use trellis::i18n::to_currency;
///
/// assert_eq!(to_currency("en-US", 59.99), "$59.99");
/// assert_eq!(to_currency("fr-CA", 59.99), "59.99 $");
/// ```
pub fn to_currency(locale: &str, amount: f64) -> String {
    if is_canadian(locale) {
        format!("{amount:.2} $")
    } else {
        format!("${amount:.2}")
    }
}

/// Interprets a template value as a point in time.
///
/// Accepts RFC 3339 strings, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` (taken as
/// UTC), and integer unix timestamps in seconds. RFC 3339 values keep their
/// own offset, so the calendar day is the one written in the value.
pub fn parse_date(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value.kind() {
        ValueKind::String => parse_date_str(value.as_str()?),
        ValueKind::Number => {
            let secs = i64::try_from(value.clone()).ok()?;
            Some(DateTime::from_timestamp(secs, 0)?.fixed_offset())
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    for layout in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_currency_by_locale() {
        assert_eq!(to_currency("en-US", 59.99), "$59.99");
        assert_eq!(to_currency("en-CA", 59.99), "59.99 $");
        assert_eq!(to_currency("fr-CA", 1234.5), "1234.50 $");
        assert_eq!(to_currency("xx-YY", 3.0), "$3.00");
    }

    #[test]
    fn test_date_ordering() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 25).unwrap();
        assert_eq!(to_date("fr-CA", date), "25-12-2023");
        assert_eq!(to_date("en-CA", date), "25-12-2023");
        assert_eq!(to_date("de-DE", date), "12-25-2023");
        assert_eq!(to_date("", date), "12-25-2023");
    }

    #[test]
    fn test_parse_date_formats() {
        let rfc = parse_date(&Value::from("2024-05-01T10:30:00+02:00")).unwrap();
        assert_eq!((rfc.year(), rfc.month(), rfc.day()), (2024, 5, 1));

        let plain = parse_date(&Value::from("2024-05-01")).unwrap();
        assert_eq!(plain.day(), 1);

        let spaced = parse_date(&Value::from("2024-05-01 23:59:59")).unwrap();
        assert_eq!(spaced.day(), 1);

        let ts = parse_date(&Value::from(0)).unwrap();
        assert_eq!(ts.year(), 1970);
    }

    #[test]
    fn test_parse_date_keeps_offset() {
        let early = parse_date(&Value::from("2024-05-01T00:30:00+02:00")).unwrap();
        assert_eq!(early.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(to_date("fr-CA", early.date_naive()), "01-05-2024");

        let late = parse_date(&Value::from("2024-04-30T23:30:00-05:00")).unwrap();
        assert_eq!(to_date("en-US", late.date_naive()), "04-30-2024");
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date(&Value::from("yesterday")).is_none());
        assert!(parse_date(&Value::from(true)).is_none());
        assert!(parse_date(&Value::UNDEFINED).is_none());
    }
}
