//! Positional interpolation for translated strings.
//!
//! Translation values use printf-style verbs so existing translation files keep
//! working:
//!
//! | Verb | Meaning |
//! |------|---------|
//! | `%s`, `%v` | the argument's display form |
//! | `%d` | an integer |
//! | `%f`, `%.2f` | a number, with optional precision (default 6) |
//! | `%q` | the display form, double-quoted |
//! | `%%` | a literal `%` |
//!
//! A verb may carry a width (`%5d`), left-aligned with `-` (`%-10s`) or
//! zero-padded with `0` (`%03d`). The number of verbs must match the number
//! of arguments exactly.

use minijinja::value::ValueKind;
use minijinja::Value;

/// Error raised when a pattern and its arguments don't line up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The pattern has more verbs than arguments were given.
    #[error("missing argument for verb #{0}")]
    MissingArgument(usize),

    /// More arguments were given than the pattern consumes.
    #[error("pattern uses {expected} argument(s) but {given} were given")]
    ExtraArguments { expected: usize, given: usize },

    /// The argument can't be rendered with the requested verb.
    #[error("argument #{index} cannot be formatted with %{verb}")]
    BadArgument { verb: char, index: usize },

    /// The pattern contains a verb this formatter doesn't know.
    #[error("unknown format verb %{0}")]
    UnknownVerb(char),
}

/// Interpolates `args` into `pattern`.
///
/// ```rust
/// use trellis::i18n::sprintf;
/// use trellis::Value;
///
/// let out = sprintf("%s has %d items (%.1f%%)", &[
///     Value::from("cart"),
///     Value::from(3),
///     Value::from(42.26),
/// ]).unwrap();
/// assert_eq!(out, "cart has 3 items (42.3%)");
/// ```
pub fn sprintf(pattern: &str, args: &[Value]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut next = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut left = false;
        let mut zero = false;
        while let Some(flag) = chars.next_if(|f| *f == '-' || *f == '0') {
            if flag == '-' {
                left = true;
            } else {
                zero = true;
            }
        }

        let mut width: usize = 0;
        while let Some(d) = chars.next_if(|d| d.is_ascii_digit()) {
            width = width.saturating_mul(10).saturating_add(d as usize - '0' as usize);
        }

        let mut precision = None;
        if chars.next_if_eq(&'.').is_some() {
            let mut digits: usize = 0;
            while let Some(d) = chars.next_if(|d| d.is_ascii_digit()) {
                digits = digits.saturating_mul(10).saturating_add(d as usize - '0' as usize);
            }
            precision = Some(digits);
        }

        let verb = chars.next().ok_or(FormatError::UnknownVerb('%'))?;
        if verb == '%' {
            out.push('%');
            continue;
        }

        let arg = args.get(next).ok_or(FormatError::MissingArgument(next))?;
        let bad = FormatError::BadArgument { verb, index: next };
        let piece = match verb {
            's' | 'v' => arg.to_string(),
            'q' => format!("{:?}", arg.to_string()),
            'd' => {
                if arg.kind() != ValueKind::Number {
                    return Err(bad);
                }
                i64::try_from(arg.clone()).map_err(|_| bad)?.to_string()
            }
            'f' => {
                if arg.kind() != ValueKind::Number {
                    return Err(bad);
                }
                let n = f64::try_from(arg.clone()).map_err(|_| bad)?;
                format!("{:.*}", precision.unwrap_or(6), n)
            }
            other => return Err(FormatError::UnknownVerb(other)),
        };
        pad(&mut out, &piece, width, left, zero && matches!(verb, 'd' | 'f'));
        next += 1;
    }

    if next < args.len() {
        return Err(FormatError::ExtraArguments {
            expected: next,
            given: args.len(),
        });
    }

    Ok(out)
}

/// Appends `piece` to `out`, padded to `width` characters. Zero padding goes
/// after a leading minus sign and is ignored when left-aligning.
fn pad(out: &mut String, piece: &str, width: usize, left: bool, zero: bool) {
    let fill = width.saturating_sub(piece.chars().count());
    if left {
        out.push_str(piece);
        out.extend(std::iter::repeat(' ').take(fill));
    } else if zero {
        let digits = match piece.strip_prefix('-') {
            Some(rest) => {
                out.push('-');
                rest
            }
            None => piece,
        };
        out.extend(std::iter::repeat('0').take(fill));
        out.push_str(digits);
    } else {
        out.extend(std::iter::repeat(' ').take(fill));
        out.push_str(piece);
    }
}
