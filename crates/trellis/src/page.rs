//! A conventional payload for rendering views.
//!
//! Nothing requires views to receive a [`PageData`]; any `Serialize` value can
//! be rendered. It exists so every page of an application gets the same
//! top-level names (`lang`, `locale`, `xsrf_token`, `data`, ...).
//!
//! ```rust
//! use trellis::{Notification, PageData};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Dashboard { projects: usize }
//!
//! let mut page = PageData::new(Dashboard { projects: 3 });
//! page.lang = "fr".into();
//! page.alert = Some(Notification::success("Saved", "Your <b>project</b> was created."));
//!
//! let json = serde_json::to_value(&page).unwrap();
//! assert_eq!(json["data"]["projects"], 3);
//! assert_eq!(json["alert"]["is_success"], true);
//! ```

use std::fmt;

use minijinja::Value;
use serde::{Serialize, Serializer};

/// Trusted HTML that templates print without escaping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Markup {
    fn from(html: &str) -> Self {
        Self::new(html)
    }
}

impl From<String> for Markup {
    fn from(html: String) -> Self {
        Self(html)
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Serialized through minijinja this becomes a safe string; through any other
// serializer it is a plain string.
impl Serialize for Markup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::from_safe_string(self.0.clone()).serialize(serializer)
    }
}

/// A flash message shown at the top of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: Markup,
    pub message: Markup,
    pub is_success: bool,
    pub is_error: bool,
    pub is_warning: bool,
}

impl Notification {
    pub fn success(title: impl Into<Markup>, message: impl Into<Markup>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            is_success: true,
            ..Self::default()
        }
    }

    pub fn error(title: impl Into<Markup>, message: impl Into<Markup>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            is_error: true,
            ..Self::default()
        }
    }

    pub fn warning(title: impl Into<Markup>, message: impl Into<Markup>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            is_warning: true,
            ..Self::default()
        }
    }
}

/// Page-level values shared by every view, wrapping the page's own `data`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageData<D> {
    /// Language code used for translation lookups, e.g. `fr`.
    pub lang: String,
    /// Locale tag used for dates and amounts, e.g. `fr-CA`.
    pub locale: String,
    pub timezone: String,
    pub xsrf_token: String,
    pub title: String,
    pub current_user: Option<serde_json::Value>,
    pub alert: Option<Notification>,
    pub data: D,
    pub extra: Option<serde_json::Value>,
    /// Deployment environment, e.g. `dev` or `prod`.
    pub env: String,
}

impl<D> PageData<D> {
    /// Wraps `data` with empty page values.
    pub fn new(data: D) -> Self {
        Self {
            lang: String::new(),
            locale: String::new(),
            timezone: String::new(),
            xsrf_token: String::new(),
            title: String::new(),
            current_user: None,
            alert: None,
            data,
            extra: None,
            env: String::new(),
        }
    }
}
