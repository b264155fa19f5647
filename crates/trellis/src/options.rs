//! Parse-time configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Name of the template root used when none is configured.
pub const DEFAULT_ROOT: &str = "templates";

/// Options for [`Assembler`](crate::Assembler).
///
/// Options are owned by the bundle they produced, so two bundles built with
/// different options never interfere.
///
/// ```rust
/// use trellis::Options;
///
/// let options = Options::from_yaml("root: testdata\nstrict_undefined: true\n").unwrap();
/// assert_eq!(options.root, "testdata");
/// assert!(options.strict_undefined);
/// assert!(!options.static_analysis);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Directory, inside the file tree, under which every convention is resolved.
    pub root: String,

    /// Treat every undefined variable as a render error instead of printing
    /// nothing.
    pub strict_undefined: bool,

    /// Write a summary of the fields each view references to
    /// [`static_analysis_file`](Self::static_analysis_file) during parsing.
    pub static_analysis: bool,

    /// Destination of the static analysis summary.
    pub static_analysis_file: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
            strict_undefined: false,
            static_analysis: false,
            static_analysis_file: None,
        }
    }
}

impl Options {
    /// Same as [`Options::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the template root.
    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    /// Enables or disables strict undefined handling.
    pub fn strict_undefined(mut self, strict: bool) -> Self {
        self.strict_undefined = strict;
        self
    }

    /// Enables static analysis, written to `path`.
    pub fn static_analysis(mut self, path: impl Into<PathBuf>) -> Self {
        self.static_analysis = true;
        self.static_analysis_file = Some(path.into());
        self
    }

    /// Parses options from YAML. Missing fields take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ParseError> {
        let options: Self =
            serde_yaml::from_str(yaml).map_err(|e| ParseError::Options(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Checks that the options are consistent.
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.static_analysis && self.static_analysis_file.is_none() {
            return Err(ParseError::Options(
                "static_analysis is enabled but static_analysis_file is not set".into(),
            ));
        }
        Ok(())
    }
}
