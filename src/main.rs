//! gofmt-import: group and sort the import blocks of Go source files.
//!
//! Works like gofmt on the import section only. Each input is formatted in
//! memory; depending on the flags the result is printed, listed, diffed or
//! written back with a backup.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use colored::Colorize;
use dialoguer::Confirm;
use gofmt_import::transform::{BlockReport, BlockTransformer, SkipReason, format_source};
use gofmt_import::{RuleSet, SyntaxError, diff, rewriter, scanner};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const STDIN_LABEL: &str = "<standard input>";

/// Outcome for one input, as printed by `--json`.
#[derive(Debug, Serialize)]
struct FileReport {
    path: String,
    changed: bool,
    blocks: Vec<BlockReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl FileReport {
    fn failed(path: String, message: String) -> Self {
        Self {
            path,
            changed: false,
            blocks: Vec::new(),
            error: Some(message),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::from(2)
        }
    }
}

/// Formats every input. Returns `false` if any input failed.
fn run(args: &Args) -> Result<bool> {
    let config = args.config()?;
    let rules = RuleSet::new(&config);
    let transformer = BlockTransformer::new(&rules).with_sort(config.sort);

    if args.verbose {
        eprintln!(
            "{} Grouping with {} rules: {}",
            "info:".blue().bold(),
            rules.len(),
            rules
                .rules()
                .iter()
                .map(|rule| rule.label.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let mut reports = Vec::new();

    if args.paths.is_empty() {
        if args.write {
            anyhow::bail!("cannot use -w with standard input");
        }
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read standard input")?;
        let report = process_source(STDIN_LABEL, &source, None, args, &transformer)
            .unwrap_or_else(|err| report_failure(STDIN_LABEL.to_string(), err, args));
        reports.push(report);
    } else {
        for file in collect_inputs(args, &config, &mut reports) {
            let label = file.display().to_string();
            let report = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))
                .and_then(|source| {
                    process_source(&label, &source, Some(file.as_path()), args, &transformer)
                })
                .unwrap_or_else(|err| report_failure(label, err, args));
            reports.push(report);
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else if !args.write
        && (args.list || args.diff)
        && reports.iter().any(|report| report.changed)
    {
        eprintln!("\n{} Use -w to rewrite files", "hint:".cyan().bold());
    }

    Ok(reports.iter().all(|report| report.error.is_none()))
}

/// Expands the path arguments into Go files. Paths that cannot be walked are
/// recorded as failed reports.
fn collect_inputs(
    args: &Args,
    config: &gofmt_import::Config,
    reports: &mut Vec<FileReport>,
) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in &args.paths {
        match scanner::collect_go_files(
            std::slice::from_ref(path),
            &config.exclude,
            config.default_excludes,
        ) {
            Ok(found) => files.extend(found),
            Err(err) => reports.push(report_failure(path.display().to_string(), err, args)),
        }
    }

    if args.verbose {
        eprintln!(
            "{} Found {} .go files to format",
            "info:".blue().bold(),
            files.len()
        );
    }

    files
}

fn report_failure(path: String, err: anyhow::Error, args: &Args) -> FileReport {
    let message = match err.downcast_ref::<SyntaxError>() {
        Some(syntax) => syntax.report(args.all_errors),
        None => format!("{:#}", err),
    };
    for line in message.lines() {
        eprintln!("{} {}: {}", "error:".red().bold(), path, line);
    }
    FileReport::failed(path, message)
}

/// Formats one input and performs the output action the flags select.
fn process_source(
    label: &str,
    source: &str,
    file: Option<&Path>,
    args: &Args,
    transformer: &BlockTransformer<'_>,
) -> Result<FileReport> {
    let formatted = format_source(source, transformer)?;
    log_blocks(label, &formatted.blocks, args.verbose);

    let changed = formatted.is_changed(source);
    let quiet = args.json;

    if changed {
        if args.list && !quiet {
            println!("{}", label);
        }
        if args.write
            && let Some(file) = file
            && confirm(label, source, &formatted.text, args.interactive)?
        {
            rewriter::write_with_backup(file, source, &formatted.text)?;
            if args.verbose {
                eprintln!("{} Rewrote {}", "info:".blue().bold(), label);
            }
        }
        if args.diff && !quiet {
            print!("{}", diff::diff_command(label));
            print!("{}", diff::unified_diff(label, source, &formatted.text));
        }
    }

    if !args.list && !args.write && !args.diff && !quiet {
        print!("{}", formatted.text);
    }

    Ok(FileReport {
        path: label.to_string(),
        changed,
        blocks: formatted.blocks,
        error: None,
    })
}

/// Shows the pending change and asks before writing, when interactive.
fn confirm(label: &str, original: &str, formatted: &str, interactive: bool) -> Result<bool> {
    if !interactive {
        return Ok(true);
    }

    println!("\n{} {}", "Would update:".yellow().bold(), label);
    print!("{}", diff::unified_diff(label, original, formatted));

    let apply = Confirm::new()
        .with_prompt(format!("Rewrite {}?", label))
        .default(false)
        .interact()
        .context("Failed to read confirmation")?;
    Ok(apply)
}

fn log_blocks(label: &str, blocks: &[BlockReport], verbose: bool) {
    for block in blocks {
        let reason = match block.skipped {
            Some(SkipReason::UnplaceableComments) => Some("its comments cannot be moved"),
            Some(SkipReason::LayoutOverflow) => Some("blank lines between groups do not fit"),
            _ => None,
        };
        if let Some(reason) = reason {
            eprintln!(
                "{} {}:{}: import block left as is, {}",
                "warn:".yellow().bold(),
                label,
                block.line,
                reason
            );
        } else if verbose {
            let groups = block
                .groups
                .iter()
                .map(|group| format!("{} {}", group.len, group.label))
                .collect::<Vec<_>>()
                .join(", ");
            eprintln!(
                "{} {}:{}: {} ({} imports{}{})",
                "info:".blue().bold(),
                label,
                block.line,
                block.status,
                block.entries,
                if groups.is_empty() { "" } else { ": " },
                groups
            );
        }
    }
}
