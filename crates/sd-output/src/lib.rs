//! Output generation for smalldoc.
//!
//! The model is written as the canonical JSON document, as a standalone HTML
//! page that renders it with the bundled client library, or as a script that
//! loads the same data into an existing page.

mod format;
mod outline;
mod render;

pub use format::{OutputFormat, ParseFormatError};
pub use render::{DEFAULT_TITLE, OutputError, RenderOptions, render, write_to};
