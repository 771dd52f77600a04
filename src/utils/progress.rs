//! Spinner helpers using indicatif

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner for an indeterminate training step
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let spinner_style = ProgressStyle::default_spinner()
        .template("    {spinner:.cyan} {msg} {elapsed:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    pb.set_style(spinner_style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Finish a spinner with a success message
pub fn finish_with_success(pb: &ProgressBar, message: &str) {
    pb.set_style(done_style());
    pb.finish_with_message(format!("{} {}", style("✓").green().bold(), message));
}

/// Finish a spinner after a failed step
pub fn finish_with_failure(pb: &ProgressBar, message: &str) {
    pb.set_style(done_style());
    pb.finish_with_message(format!("{} {}", style("✗").red().bold(), message));
}

fn done_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("    {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}
