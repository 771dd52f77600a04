//! Evaluation summary tables

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::predict::RiskLabel;
use crate::train::Evaluation;

/// Display names of the two classes, indexed by label
const CLASS_NAMES: [RiskLabel; 2] = [RiskLabel::Low, RiskLabel::High];

fn score_color(value: f64) -> Color {
    if value >= 0.75 {
        Color::Green
    } else if value >= 0.6 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn print_section(title: &str, icon: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

/// Headline metrics table
pub fn metrics_table(evaluation: &Evaluation) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    table.add_row(vec![
        Cell::new("🎯 Accuracy"),
        Cell::new(format!("{:.4}", evaluation.accuracy)).fg(score_color(evaluation.accuracy)),
    ]);
    table.add_row(vec![
        Cell::new("📈 ROC-AUC"),
        match evaluation.roc_auc {
            Some(auc) => Cell::new(format!("{:.4}", auc)).fg(score_color(auc)),
            None => Cell::new("n/a").fg(Color::DarkGrey),
        },
    ]);
    table.add_row(vec![
        Cell::new("⚖️  F1 (High Risk)"),
        Cell::new(format!("{:.4}", evaluation.f1_score))
            .fg(score_color(evaluation.f1_score))
            .add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("🧪 Test rows"),
        Cell::new(evaluation.test_rows),
    ]);
    table
}

/// Confusion matrix, truth in rows
pub fn confusion_table(evaluation: &Evaluation) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);

    let mut header = vec![Cell::new("Actual \\ Predicted").add_attribute(Attribute::Bold)];
    header.extend(
        CLASS_NAMES
            .iter()
            .map(|c| Cell::new(c).add_attribute(Attribute::Bold)),
    );
    table.set_header(header);

    for (truth, row) in evaluation.confusion_matrix.rows().iter().enumerate() {
        let mut cells = vec![Cell::new(CLASS_NAMES[truth])];
        cells.extend(row.iter().enumerate().map(|(predicted, count)| {
            let color = if predicted == truth { Color::Green } else { Color::Red };
            Cell::new(count).fg(color).set_alignment(CellAlignment::Right)
        }));
        table.add_row(cells);
    }
    table
}

/// Per-class precision / recall / F1 with the averaged rows
pub fn report_table(evaluation: &Evaluation) -> Table {
    let report = &evaluation.report;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        ["Class", "Precision", "Recall", "F1", "Support"]
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    let class_rows = report
        .classes
        .iter()
        .enumerate()
        .map(|(i, c)| (CLASS_NAMES[i].to_string(), c));
    let avg_rows = [&report.macro_avg, &report.weighted_avg]
        .into_iter()
        .map(|c| (c.label.clone(), c));

    for (label, c) in class_rows.chain(avg_rows) {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(format!("{:.2}", c.precision)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", c.recall)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", c.f1)).set_alignment(CellAlignment::Right),
            Cell::new(c.support).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Print all evaluation tables
pub fn display_evaluation(evaluation: &Evaluation) {
    print_section("EVALUATION SUMMARY", "📋");
    print_indented(&metrics_table(evaluation));

    print_section("CONFUSION MATRIX", "🧮");
    print_indented(&confusion_table(evaluation));

    print_section("CLASSIFICATION REPORT", "📝");
    print_indented(&report_table(evaluation));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::metrics::{classification_report, ConfusionMatrix};

    fn evaluation() -> Evaluation {
        let y_true = [0, 0, 0, 1, 1];
        let y_pred = [0, 0, 1, 1, 0];
        Evaluation {
            accuracy: 0.6,
            roc_auc: None,
            f1_score: 0.5,
            confusion_matrix: ConfusionMatrix::from_predictions(&y_true, &y_pred),
            report: classification_report(&y_true, &y_pred),
            test_rows: 5,
        }
    }

    #[test]
    fn test_metrics_table_contents() {
        let text = metrics_table(&evaluation()).to_string();
        assert!(text.contains("0.6000"));
        assert!(text.contains("n/a"));
    }

    #[test]
    fn test_confusion_table_labels() {
        let text = confusion_table(&evaluation()).to_string();
        assert!(text.contains("High Risk"));
        assert!(text.contains("Low Risk"));
    }

    #[test]
    fn test_report_table_has_average_rows() {
        let text = report_table(&evaluation()).to_string();
        assert!(text.contains("macro avg"));
        assert!(text.contains("weighted avg"));
    }
}
