//! Console output
//!
//! Report text goes to stdout; logging goes to stderr through tracing.

use crate::commands::DirectorySummary;
use colored::Colorize;
use ha_automation::ConversionReport;

const RULE_WIDTH: usize = 60;

pub fn heading(text: &str) {
    println!("{}", text.bold());
}

pub fn note(text: &str) {
    println!("{}", text.cyan());
}

pub fn success(text: &str) {
    println!("{}", text.green());
}

pub fn warning(text: &str) {
    println!("{} {}", "!".yellow().bold(), text);
}

pub fn failure(text: &str) {
    println!("{} {}", "✗".red().bold(), text);
}

pub fn rule() {
    println!("{}", "=".repeat(RULE_WIDTH));
}

/// Full report for a single document
pub fn print_report(report: &ConversionReport) {
    if report.automations().is_empty() {
        println!("No automations found, nothing to change.");
        return;
    }

    heading("Conversion report:");

    let converted: Vec<_> = report.converted().collect();
    if !converted.is_empty() {
        println!();
        println!("Converted automations ({}):", converted.len());
        for automation in converted {
            println!("  {} {}: {}", "✓".green(), automation.name, automation.summary());
        }
    }

    let up_to_date: Vec<_> = report.up_to_date().collect();
    if !up_to_date.is_empty() {
        println!();
        println!("Automations already up to date ({}):", up_to_date.len());
        for automation in up_to_date {
            println!("  {} {}", "•".dimmed(), automation.name);
        }
    }

    print_conflicts(report, "  ");

    println!();
    println!("Total processed: {}", report.stats().total);
}

/// Indented change lines for one file of a directory run
pub fn print_file_changes(report: &ConversionReport) {
    if !report.has_changes() {
        println!("   {} No changes needed", "•".dimmed());
    }
    for automation in report.automations() {
        if automation.is_converted() {
            println!("   {} {}: {}", "✓".green(), automation.name, automation.summary());
        } else {
            println!("   {} {}: {}", "•".dimmed(), automation.name, automation.summary());
        }
    }
    print_conflicts(report, "   ");
}

fn print_conflicts(report: &ConversionReport, indent: &str) {
    for automation in report.automations() {
        for conflict in &automation.conflicts {
            println!("{}{} {}: {}", indent, "!".yellow(), automation.name, conflict);
        }
    }
    if report.fell_back() {
        println!(
            "{}{} Comments and formatting could not be kept for this file",
            indent,
            "!".yellow()
        );
    }
}

/// Final summary of a directory run
pub fn print_directory_summary(summary: &DirectorySummary, files: usize) {
    heading("Conversion finished:");
    println!(
        "   Files converted successfully: {}/{}",
        summary.succeeded, files
    );

    if summary.succeeded > 0 {
        println!("   Automations converted: {}", summary.stats.converted);
        println!(
            "   Automations already up to date: {}",
            summary.stats.up_to_date
        );
        println!(
            "   Total automations processed: {}",
            summary.stats.total
        );
    }

    if !summary.failed.is_empty() {
        println!();
        println!("{}", "Files with errors:".red());
        for (path, message) in &summary.failed {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            println!("   • {}: {}", name, message);
        }
    }
}
