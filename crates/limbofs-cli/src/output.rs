//! CLI output rendering.
//!
//! Human mode tells the story line by line: one checkmarked line per
//! exercise step or validation result, with indented detail beneath.
//! JSON mode stays silent until the command emits its complete result
//! document, so stdout is always a single parseable value.

use serde_json::Value;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    /// True when structured output was requested with `--json`.
    #[must_use]
    pub fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Renders command results in the selected format.
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// A passed step or successful result.
    pub fn pass(&self, message: &str) {
        if !self.format.is_json() {
            println!("{}", status_line(true, message));
        }
    }

    /// A failed step or error. Goes to stderr in human mode.
    pub fn fail(&self, message: &str) {
        if !self.format.is_json() {
            eprintln!("{}", status_line(false, message));
        }
    }

    /// Indented supporting detail under the previous line.
    pub fn detail(&self, message: &str) {
        if !self.format.is_json() {
            println!("  {}", message);
        }
    }

    /// Emit the command's complete result document. Human mode ignores
    /// it: the per-line methods have already told the story.
    pub fn document(&self, value: &Value) {
        if self.format.is_json() {
            println!(
                "{}",
                serde_json::to_string_pretty(value).unwrap_or_default()
            );
        }
    }
}

/// One result line with its pass/fail marker.
fn status_line(passed: bool, message: &str) -> String {
    if passed {
        format!("\u{2713} {message}")
    } else {
        format!("\u{2717} {message}")
    }
}
