//! The three conversion modes: string, single file and directory

use crate::cli::Cli;
use crate::output;
use anyhow::{bail, Context, Result};
use ha_automation::{ConvertOptions, Converter, Stats};
use ha_config::{find_yaml_files, output_path_for};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};

/// Outcome of a directory run
#[derive(Debug, Default)]
pub struct DirectorySummary {
    /// Files converted without error
    pub succeeded: usize,
    /// Files that failed, with the error message
    pub failed: Vec<(PathBuf, String)>,
    /// Automation counts across all converted files
    pub stats: Stats,
}

pub fn run(cli: &Cli) -> Result<ExitCode> {
    let converter = Converter::new(ConvertOptions {
        preserve_comments: !cli.no_comments,
    });
    debug!("Options: {:?}", converter.options());

    if let Some(source) = &cli.string {
        return convert_string(&converter, source);
    }

    let Some(input) = cli.input.as_deref() else {
        bail!("no input given; pass a file, a directory with -d, or --string");
    };

    if cli.directory {
        convert_directory(&converter, input, cli)
    } else {
        convert_single(&converter, input, cli)
    }
}

fn convert_string(converter: &Converter, source: &str) -> Result<ExitCode> {
    let conversion = converter
        .convert_str(source)
        .context("failed to convert YAML string")?;

    output::heading("Conversion result:");
    print!("{}", conversion.output);
    if !conversion.output.ends_with('\n') {
        println!();
    }
    println!();
    output::print_report(&conversion.report);
    Ok(ExitCode::SUCCESS)
}

fn convert_single(converter: &Converter, input: &Path, cli: &Cli) -> Result<ExitCode> {
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| output_path_for(input));

    println!("Converting {}...", input.display());
    if cli.dry_run {
        output::note("DRY RUN: no file will be written");
    }

    let conversion = converter
        .convert_file(input, &output_path, cli.dry_run)
        .with_context(|| format!("failed to convert {}", input.display()))?;

    if cli.dry_run {
        println!();
        output::heading("Preview:");
        output::print_report(&conversion.report);
        if conversion.report.has_changes() {
            println!();
            println!("Would write: {}", output_path.display());
        }
    } else {
        output::success(&format!("Conversion complete: {}", output_path.display()));
        println!();
        output::print_report(&conversion.report);
    }

    Ok(ExitCode::SUCCESS)
}

fn convert_directory(converter: &Converter, dir: &Path, cli: &Cli) -> Result<ExitCode> {
    if cli.output.is_some() {
        warn!("-o/--output is ignored in directory mode");
    }

    println!("Converting directory: {}", dir.display());
    println!("Pattern: {}", cli.pattern);
    if cli.dry_run {
        output::note("DRY RUN: no file will be written");
    }

    let files = find_yaml_files(dir, &cli.pattern)
        .with_context(|| format!("failed to list {}", dir.display()))?;

    if files.is_empty() {
        output::warning(&format!("No YAML files found in {}", dir.display()));
        return Ok(ExitCode::FAILURE);
    }

    println!("Found {} YAML files", files.len());
    output::rule();

    let mut summary = DirectorySummary::default();

    for file in &files {
        let name = file_name(file);
        let target = output_path_for(file);
        println!();
        println!("Processing {}...", name);

        match converter.convert_file(file, &target, cli.dry_run) {
            Ok(conversion) => {
                if cli.dry_run {
                    if conversion.report.has_changes() {
                        println!("   Would write {}", file_name(&target));
                    }
                } else {
                    output::success(&format!("   Converted into {}", file_name(&target)));
                }
                output::print_file_changes(&conversion.report);
                summary.succeeded += 1;
                summary.stats += conversion.report.stats();
            }
            Err(e) => {
                let message = e.to_string();
                output::failure(&format!("   {}", message));
                summary.failed.push((file.clone(), message));
            }
        }
    }

    println!();
    output::rule();
    output::print_directory_summary(&summary, files.len());

    Ok(if summary.failed.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
