//! Small stateless helpers exposed to templates.
//!
//! Each helper is a plain Rust function; [`crate::template::Namespace`] wraps
//! them as template functions.

use chrono::{DateTime, Utc};
use deunicode::deunicode;
use minijinja::value::ValueKind;
use minijinja::Value;

/// Error raised by helpers that validate their arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HelperError {
    /// `map` needs key/value pairs.
    #[error("map expects an even number of arguments, got {0}")]
    OddArguments(usize),

    /// `map` keys must be strings.
    #[error("map keys must be strings, argument #{index} is {kind}")]
    NonStringKey { index: usize, kind: String },
}

/// Builds an ordered map from alternating keys and values.
///
/// ```rust
/// use trellis::helpers::build_map;
/// use trellis::Value;
///
/// let map = build_map(&[Value::from("name"), Value::from("Ana"), Value::from("age"), Value::from(7)]).unwrap();
/// assert_eq!(map.get_attr("name").unwrap().as_str(), Some("Ana"));
///
/// assert!(build_map(&[Value::from("lonely")]).is_err());
/// ```
pub fn build_map(args: &[Value]) -> Result<Value, HelperError> {
    if args.len() % 2 != 0 {
        return Err(HelperError::OddArguments(args.len()));
    }

    let mut pairs = Vec::with_capacity(args.len() / 2);
    for (i, pair) in args.chunks_exact(2).enumerate() {
        let key = pair[0].as_str().ok_or_else(|| HelperError::NonStringKey {
            index: i * 2,
            kind: pair[0].kind().to_string(),
        })?;
        pairs.push((key.to_string(), pair[1].clone()));
    }

    Ok(Value::from_iter(pairs))
}

/// Returns `[0, 1, ..., n-1]`; empty when `n <= 0`.
pub fn iterate(n: i64) -> Vec<i64> {
    (0..n.max(0)).collect()
}

/// Renders the hidden form field carrying an anti-forgery token.
pub fn xsrf_field(token: &str) -> String {
    format!(
        r#"<input type="hidden" name="xsrf-token" value="{}">"#,
        minijinja::HtmlEscape(token)
    )
}

/// Removes every occurrence of `needle` from `text`.
pub fn strip(text: &str, needle: &str) -> String {
    if needle.is_empty() {
        return text.to_string();
    }
    text.replace(needle, "")
}

/// Whether a value counts as absent for [`fallback`].
///
/// | Kind | Absent when |
/// |------|-------------|
/// | undefined, none | always |
/// | bool | `false` |
/// | number | zero |
/// | string, bytes | empty |
/// | sequence, map | empty |
///
/// Other kinds (iterables, objects) are never absent.
pub fn is_zero(value: &Value) -> bool {
    match value.kind() {
        ValueKind::Undefined | ValueKind::None => true,
        ValueKind::Bool => !value.is_true(),
        ValueKind::Number => f64::try_from(value.clone()).map_or(false, |n| n == 0.0),
        ValueKind::String => value.as_str().map_or(true, str::is_empty),
        ValueKind::Bytes => value.as_bytes().map_or(true, <[u8]>::is_empty),
        ValueKind::Seq | ValueKind::Map => value.len() == Some(0),
        _ => false,
    }
}

/// Returns `default` when `value` is absent (see [`is_zero`]), else `value`.
pub fn fallback(value: Value, default: Value) -> Value {
    if is_zero(&value) {
        default
    } else {
        value
    }
}

const SIZE_UNITS: &[&str] = &["KB", "MB", "GB", "TB", "PB"];

/// Humanizes a byte count using base-1024 units.
///
/// ```rust
/// use trellis::helpers::filesize;
///
/// assert_eq!(filesize(512), "512 B");
/// assert_eq!(filesize(1536), "1.5 KB");
/// assert_eq!(filesize(5 * 1024 * 1024), "5.0 MB");
/// ```
pub fn filesize(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", SIZE_UNITS[unit])
}

/// Turns text into a URL-friendly slug.
///
/// ```rust
/// use trellis::helpers::slugify;
///
/// assert_eq!(slugify("Crème Brûlée: the Recipe!"), "creme-brulee-the-recipe");
/// ```
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Inserts thousands separators into a number's textual form.
///
/// The sign and any fractional part are preserved. Text that isn't a plain
/// decimal number is returned unchanged.
///
/// ```rust
/// use trellis::helpers::thousands;
///
/// assert_eq!(thousands("1234567"), "1,234,567");
/// assert_eq!(thousands("-9876.5"), "-9,876.5");
/// ```
pub fn thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return number.to_string();
    }

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Describes `then` relative to `now`: `3 hours ago`, `in 1 day`, `just now`.
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use trellis::helpers::time_ago;
///
/// let now = Utc::now();
/// assert_eq!(time_ago(now - Duration::minutes(5), now), "5 minutes ago");
/// assert_eq!(time_ago(now + Duration::days(1), now), "in 1 day");
/// ```
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(then).num_seconds();
    let future = delta < 0;
    let secs = delta.abs();

    let (count, unit) = if secs < MINUTE {
        return "just now".to_string();
    } else if secs < HOUR {
        (secs / MINUTE, "minute")
    } else if secs < DAY {
        (secs / HOUR, "hour")
    } else if secs < MONTH {
        (secs / DAY, "day")
    } else if secs < YEAR {
        (secs / MONTH, "month")
    } else {
        (secs / YEAR, "year")
    };

    let suffix = if count == 1 { "" } else { "s" };
    if future {
        format!("in {count} {unit}{suffix}")
    } else {
        format!("{count} {unit}{suffix} ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    #[test]
    fn test_build_map_preserves_order() {
        let map = build_map(&[
            Value::from("b"),
            Value::from(1),
            Value::from("a"),
            Value::from(2),
        ])
        .unwrap();
        let keys: Vec<String> = map.try_iter().unwrap().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(map.get_attr("a").unwrap(), Value::from(2));
    }

    #[test]
    fn test_build_map_errors() {
        assert_eq!(
            build_map(&[Value::from("a"), Value::from(1), Value::from("b")]),
            Err(HelperError::OddArguments(3))
        );
        assert!(matches!(
            build_map(&[Value::from(1), Value::from(2)]),
            Err(HelperError::NonStringKey { index: 0, .. })
        ));
        assert_eq!(build_map(&[]).unwrap().len(), Some(0));
    }

    #[test]
    fn test_iterate() {
        assert_eq!(iterate(3), [0, 1, 2]);
        assert!(iterate(0).is_empty());
        assert!(iterate(-4).is_empty());
    }

    #[test]
    fn test_xsrf_field_escapes_token() {
        assert_eq!(
            xsrf_field("abc123"),
            r#"<input type="hidden" name="xsrf-token" value="abc123">"#
        );
        assert!(xsrf_field(r#""><script>"#).contains("&quot;&gt;&lt;script&gt;"));
    }

    #[test]
    fn test_strip() {
        assert_eq!(strip("a-b-c", "-"), "abc");
        assert_eq!(strip("abc", ""), "abc");
    }

    #[test]
    fn test_is_zero_table() {
        assert!(is_zero(&Value::UNDEFINED));
        assert!(is_zero(&Value::from(())));
        assert!(is_zero(&Value::from(false)));
        assert!(is_zero(&Value::from(0)));
        assert!(is_zero(&Value::from(0.0)));
        assert!(is_zero(&Value::from("")));
        assert!(is_zero(&Value::from(Vec::<i32>::new())));

        assert!(!is_zero(&Value::from(true)));
        assert!(!is_zero(&Value::from(-1)));
        assert!(!is_zero(&Value::from("x")));
        assert!(!is_zero(&Value::from(vec![1])));
    }

    #[test]
    fn test_fallback() {
        assert_eq!(fallback(Value::from(""), Value::from("n/a")), Value::from("n/a"));
        assert_eq!(fallback(Value::from("ok"), Value::from("n/a")), Value::from("ok"));
    }

    #[test]
    fn test_filesize() {
        assert_eq!(filesize(0), "0 B");
        assert_eq!(filesize(1023), "1023 B");
        assert_eq!(filesize(1024), "1.0 KB");
        assert_eq!(filesize(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World"), "hello-world");
        assert_eq!(slugify("  --leading and trailing--  "), "leading-and-trailing");
        assert_eq!(slugify("Ünïcödé"), "unicode");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands("0"), "0");
        assert_eq!(thousands("999"), "999");
        assert_eq!(thousands("1000"), "1,000");
        assert_eq!(thousands("1234567.891"), "1,234,567.891");
        assert_eq!(thousands("abc"), "abc");
    }

    #[test]
    fn test_time_ago_granularity() {
        let now = Utc::now();
        assert_eq!(time_ago(now, now), "just now");
        assert_eq!(time_ago(now - Duration::seconds(59), now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(time_ago(now - Duration::hours(2), now), "2 hours ago");
        assert_eq!(time_ago(now - Duration::days(3), now), "3 days ago");
        assert_eq!(time_ago(now - Duration::days(65), now), "2 months ago");
        assert_eq!(time_ago(now - Duration::days(800), now), "2 years ago");
        assert_eq!(time_ago(now + Duration::minutes(10), now), "in 10 minutes");
        assert_eq!(time_ago(now + Duration::days(365), now), "in 1 year");
    }

    proptest! {
        #[test]
        fn prop_slug_is_url_safe(text in ".{0,40}") {
            let slug = slugify(&text);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        #[test]
        fn prop_thousands_keeps_digits(n in any::<i64>()) {
            let formatted = thousands(&n.to_string());
            prop_assert_eq!(formatted.replace(',', ""), n.to_string());
        }
    }
}
