//! Command-line interface definitions.
//!
//! Defines the argument parser using clap's derive API. The flags follow
//! gofmt's (`-l`, `-d`, `-w`) and add the grouping policy on top.

use clap::Parser;
use gofmt_import::config::Config;
use gofmt_import::error::ConfigError;
use std::path::PathBuf;

/// Group and sort the import blocks of Go source files.
///
/// Without paths, reads Go source from standard input and writes the result
/// to standard output.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Files or directories to format. Directories are walked recursively.
    pub paths: Vec<PathBuf>,

    /// List files whose import grouping differs.
    #[arg(short, long)]
    pub list: bool,

    /// Display diffs instead of rewriting files.
    #[arg(short, long)]
    pub diff: bool,

    /// Write the result back to the source file instead of stdout.
    #[arg(short, long)]
    pub write: bool,

    /// Confirm each file's changes before writing.
    #[arg(short, long, requires = "write")]
    pub interactive: bool,

    /// Ordered regex rules, one group each, matched against the quoted path
    /// (e.g. '^"github.*"$'). Space-separated or repeated.
    #[arg(
        short,
        long = "rule",
        value_delimiter = ' ',
        conflicts_with_all = ["local", "ecosystem"]
    )]
    pub rules: Vec<String>,

    /// Module path prefix of the project; its imports form the last group.
    #[arg(long)]
    pub local: Option<String>,

    /// Shared first path segment (e.g. "k8s.io") grouped after external imports.
    #[arg(long)]
    pub ecosystem: Option<String>,

    /// Keep imports in their original order inside each group.
    #[arg(long)]
    pub no_sort: bool,

    /// Glob patterns for directories/files to exclude (e.g., "vendor", "*_gen.go").
    /// By default, entries starting with `.` or `_` are excluded.
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Disable default exclusion of `.` and `_` prefixed entries.
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Report all syntax errors, not just the first.
    #[arg(short = 'e', long)]
    pub all_errors: bool,

    /// Emit a JSON report instead of source text.
    #[arg(long)]
    pub json: bool,

    /// Print additional diagnostics to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Builds the grouping configuration, compiling every pattern.
    pub fn config(&self) -> Result<Config, ConfigError> {
        let config = if self.rules.is_empty() {
            Config::buckets(self.local.clone(), self.ecosystem.clone())
        } else {
            Config::patterns(&self.rules)?
        };
        config
            .with_sort(!self.no_sort)
            .with_default_excludes(!self.no_default_excludes)
            .with_excludes(&self.exclude)
    }
}
