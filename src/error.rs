//! Error types for configuration, parsing and block transformation.
//!
//! Configuration errors surface while flags are turned into a [`Config`],
//! before any file is read. Transform errors are internal faults of the
//! classification/layout pipeline and fail the whole file; a block is never
//! left half-rewritten.
//!
//! [`Config`]: crate::config::Config

use std::fmt;
use thiserror::Error;

/// A rule or exclude pattern that could not be compiled.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid order rule '{pattern}': {source}")]
    InvalidRule {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid exclude pattern '{pattern}': {source}")]
    InvalidExclude {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Failure while regrouping or laying out one import block.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// No rule matched. Unreachable while the rule set ends in a catch-all.
    #[error("import {path} matched no classification rule")]
    Unclassified { path: String },

    /// Grouping lost or duplicated entries.
    #[error("grouping produced {found} entries from {expected}")]
    EntryCountMismatch { expected: usize, found: usize },

    /// The synthesized lines do not fit before the line after `)`.
    #[error("regrouped block needs offset {needed} but the next line starts at {available}")]
    LayoutOverflow { needed: usize, available: usize },

    /// A rendered block does not fit the source it replaces.
    #[error("replacement {start}..{end} is outside the {len} byte source")]
    ReplacementOutOfBounds { start: usize, end: usize, len: usize },

    #[error("synthesized line table is not increasing at line {line}")]
    NonMonotonic { line: usize },
}

/// 1-based line and column in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Every parse error of a file, in source order.
///
/// Displays the first error only; [`SyntaxError::report`] lists all of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at {first}")]
pub struct SyntaxError {
    pub first: Position,
    pub rest: Vec<Position>,
}

impl SyntaxError {
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        std::iter::once(self.first).chain(self.rest.iter().copied())
    }

    /// The first error, or one line per error with `all_errors`.
    pub fn report(&self, all_errors: bool) -> String {
        if !all_errors {
            return self.to_string();
        }
        self.positions()
            .map(|position| format!("syntax error at {}", position))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
