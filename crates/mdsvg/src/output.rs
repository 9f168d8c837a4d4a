//! Colored terminal output utilities.

use std::fmt::Display;
use std::path::Path;

use console::{Style, Term};

/// Terminal output formatter.
///
/// All messages go to stderr so rendered HTML piped from stdout stays clean.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a per-file warning (yellow), prefixed with the file path.
    pub(crate) fn file_warning(&self, path: &Path, message: &impl Display) {
        let line = format!("{}: {message}", path.display());
        let _ = self.term.write_line(&self.yellow.apply_to(line).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }
}
