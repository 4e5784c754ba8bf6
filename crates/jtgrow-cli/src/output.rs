//! Colored output formatting for the jtgrow CLI

use colored::*;
use jtgrow::{InferenceReport, TreeSummary};

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

pub fn print_header(title: &str) {
    println!("\n{}", title.cyan().bold());
    println!("{}", "=".repeat(title.len()).cyan());
}

pub fn format_tree_summary(summary: &TreeSummary) -> String {
    format!(
        "Tree: {} vertices, {} edges, treewidth {}, largest separator {}, {} factors",
        summary.vertices.to_string().green(),
        summary.edges.to_string().cyan(),
        summary.treewidth.to_string().yellow(),
        summary.max_separator_size.to_string().magenta(),
        summary.factors.to_string().blue()
    )
}

pub fn print_growth(summary: &TreeSummary, accepted: usize, rejected: usize) {
    println!("  {}", format_tree_summary(summary));
    println!(
        "  Variables: {} accepted, {} rejected",
        accepted.to_string().green(),
        rejected.to_string().red()
    );
}

pub fn print_report(report: &InferenceReport, visits: usize) {
    print_success(&format!("Sampled tree rooted at variable {}", report.root));
    print_growth(&report.tree, report.accepted.len(), report.rejected.len());
    println!("  Engine: {} vertex visits", visits.to_string().cyan());
}

pub fn enable_colors(enabled: bool) {
    colored::control::set_override(enabled);
}
