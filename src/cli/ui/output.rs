use std::fmt::Display;

use console::style;

/// Styled terminal output for command results. Logging goes through
/// `tracing`; this is the user-facing report.
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    /// Suppress everything except errors and warnings
    pub fn quiet(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn header(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold().underlined());
        }
    }

    pub fn section(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold());
            println!("{}", "─".repeat(40));
        }
    }

    /// `  label: value` with the label dimmed
    pub fn field(&self, label: &str, value: impl Display) {
        if !self.quiet {
            println!("  {} {}", style(format!("{}:", label)).dim(), value);
        }
    }

    pub fn item(&self, message: impl Display) {
        if !self.quiet {
            println!("  • {}", message);
        }
    }

    /// Plain line, for machine-readable output
    pub fn raw(&self, message: &str) {
        println!("{}", message);
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
