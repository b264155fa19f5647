//! Translations and locale formatting.
//!
//! - [`Catalog`]: per-language translation records, loaded from
//!   `<root>/translations/<lang>.json`
//! - [`sprintf`]: positional interpolation used by the `tf`/`tfp` functions
//! - [`to_date`], [`to_currency`]: locale-aware formatting used by the
//!   `shortdate`/`currency` functions
//!
//! In templates these are exposed as:
//!
//! ```jinja
//! {{ t(lang, "a unique key") }}
//! {{ tp(lang, "single or plural", 2) }}
//! {{ tf(lang, "a formatted %s", data.name) }}
//! {{ tfp(lang, "formatted and pluralized %d", 2, 2) }}
//! {{ shortdate(locale, data.created_at) }}
//! {{ currency(locale, data.amount) }}
//! ```

mod catalog;
mod format;
mod locale;

pub use catalog::{Catalog, Message, NOT_FOUND};
pub use format::{sprintf, FormatError};
pub use locale::{parse_date, to_currency, to_date};
