use std::time::Duration;

use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};

pub mod icons {
    use super::*;

    pub fn success() -> ColoredString {
        "✓".green()
    }

    pub fn error() -> ColoredString {
        "✗".red()
    }

    pub fn skipped() -> ColoredString {
        "-".dimmed()
    }
}

/// A single-line spinner on stderr, hidden when stderr is not a terminal.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn start(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    /// Clear the spinner without printing anything.
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }

    pub fn success(self, message: impl AsRef<str>) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", icons::success(), message.as_ref());
    }

    pub fn error(self, message: impl AsRef<str>) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", icons::error(), message.as_ref().red());
    }
}
