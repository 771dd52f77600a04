//! Terminal styling for the training and serving commands

use std::path::Path;
use std::time::Duration;

use console::{style, Emoji};

use crate::model::ModelKind;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static LINK: Emoji<'_, '_> = Emoji("🔗 ", "");

const RULE_WIDTH: usize = 50;

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("credit-risk").cyan().bold(),
        style(format!("v{}", version)).dim()
    );
    println!(
        "    {}",
        style("German credit classifier: train, register, serve").dim()
    );
    println!("    {}", style("━".repeat(RULE_WIDTH)).dim());
    println!();
}

/// Settings shown before a training run
pub struct TrainCard<'a> {
    pub data: &'a Path,
    pub label_column: &'a str,
    pub model: ModelKind,
    pub tracking_dir: &'a Path,
    pub model_name: &'a str,
    pub test_size: f64,
    pub seed: u64,
}

/// Print the training configuration card
pub fn print_config(card: &TrainCard<'_>) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!("    │  {} Data:     {:<37}│", FOLDER, truncate_path(card.data, 36));
    println!(
        "    │  {} Label:    {:<37}│",
        TARGET,
        truncate_string(card.label_column, 36)
    );
    println!(
        "    │  {} Store:    {:<37}│",
        SAVE,
        truncate_path(card.tracking_dir, 36)
    );
    println!(
        "    │  {} Register: {:<37}│",
        LINK,
        truncate_string(card.model_name, 36)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Model:     {:<36}│",
        CHART,
        style(card.model.display_name()).yellow()
    );
    println!(
        "    │  {} Test size: {:<36}│",
        CHART,
        style(format!("{:.0}% (seed {})", card.test_size * 100.0, card.seed)).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(RULE_WIDTH)).dim());
}

pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a labelled value, e.g. `Train rows: 800`
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    match detail {
        Some(info) => println!(
            "      {} {} {}",
            description,
            style(count).yellow().bold(),
            style(info).dim()
        ),
        None => println!("      {} {}", description, style(count).yellow().bold()),
    }
}

pub fn print_step_time(elapsed: Duration) {
    println!(
        "      {}",
        style(format!("took {:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print the final completion message
pub fn print_completion(message: &str) {
    println!();
    println!("    {} {}", ROCKET, style(message).green().bold());
    println!();
}

fn truncate_path(path: &Path, max_len: usize) -> String {
    truncate_string(&path.display().to_string(), max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string_keeps_tail() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("data/german_credit_data.csv", 12), "..._data.csv");
    }
}
