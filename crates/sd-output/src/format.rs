use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Shape of a generated output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// The canonical structured document.
    #[default]
    Json,
    /// Standalone page with the data, stylesheet and library inlined.
    Html,
    /// Script that loads the data, stylesheet and library into a page.
    Js,
}

/// Error returned for an unknown format name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown output format: {0} (expected json, html or js)")]
pub struct ParseFormatError(pub String);

impl OutputFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Html => "html",
            Self::Js => "js",
        }
    }

    /// Format implied by a file extension, without the dot.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            "js" => Some(Self::Js),
            _ => None,
        }
    }

    /// Format implied by the extension of `path`.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| ParseFormatError(s.to_owned()))
    }
}
