//! Run status lines on stderr.
//!
//! Standard output carries the generated document when no destination is
//! given, so every human-facing line goes to the terminal's error stream.

use std::path::Path;

use console::{Style, Term};

/// Reports the progress of a documentation run.
pub(crate) struct Output {
    term: Term,
    done: Style,
    partial: Style,
    failed: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            done: Style::new().green(),
            partial: Style::new().yellow(),
            failed: Style::new().red().bold(),
        }
    }

    fn line(&self, style: &Style, text: &str) {
        let _ = self.term.write_line(&style.apply_to(text).to_string());
    }

    /// A destination was written.
    pub(crate) fn wrote(&self, path: &Path) {
        self.line(&self.done, &format!("Wrote {}", path.display()));
    }

    /// A destination could not be produced.
    pub(crate) fn write_failed(&self, path: &Path, reason: &dyn std::fmt::Display) {
        self.line(&self.failed, &format!("Failed {}: {reason}", path.display()));
    }

    /// Some inputs were skipped because their driver reported an error.
    pub(crate) fn skipped_inputs(&self, skipped: usize, total: usize) {
        self.line(&self.partial, &format!("Skipped {skipped} of {total} inputs"));
    }

    /// Summary after every destination was written.
    pub(crate) fn documented(&self, inputs: usize) {
        let noun = if inputs == 1 { "input" } else { "inputs" };
        let _ = self.term.write_line(&format!("Documented {inputs} {noun}"));
    }

    /// The run stopped.
    pub(crate) fn aborted(&self, reason: &dyn std::fmt::Display) {
        self.line(&self.failed, &format!("Error: {reason}"));
    }
}
