//! Documentation text rendering for smalldoc.
//!
//! Drivers extract raw documentation text from their sources and hand it to
//! a [`Markup`], which turns it into the HTML stored in element
//! documentation. The transform is opaque to the model.

mod text;

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use pulldown_cmark::{Options, Parser, html};
use regex::Regex;
use serde::Deserialize;

pub use text::{dedent, escape_html, slugify};

static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n\s*").expect("valid regex"));

/// Error returned for an unknown markup name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown markup: {0} (expected none or markdown)")]
pub struct MarkupError(pub String);

/// Markup language of raw documentation text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Markup {
    /// Plain text: escaped, blank lines become line breaks.
    None,
    /// `CommonMark` with tables, strikethrough and task lists.
    #[default]
    #[serde(alias = "md")]
    Markdown,
}

impl Markup {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Markdown => "markdown",
        }
    }

    /// Render raw text to an HTML fragment with surrounding whitespace trimmed.
    #[must_use]
    pub fn render(self, text: &str) -> String {
        match self {
            Self::None => {
                let escaped = escape_html(text.trim());
                BLANK_LINES_RE.replace_all(&escaped, "<br />").into_owned()
            }
            Self::Markdown => {
                let options =
                    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
                let parser = Parser::new_ext(text, options);
                let mut out = String::with_capacity(text.len() + text.len() / 2);
                html::push_html(&mut out, parser);
                out.trim().to_owned()
            }
        }
    }

    /// Dedent and render optional documentation text.
    ///
    /// Missing or blank text yields `None`, never a placeholder string.
    #[must_use]
    pub fn render_doc(self, raw: Option<&str>) -> Option<String> {
        let text = dedent(raw?);
        if text.is_empty() {
            return None;
        }
        Some(self.render(&text))
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Markup {
    type Err = MarkupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "text" => Ok(Self::None),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(MarkupError(s.to_owned())),
        }
    }
}
