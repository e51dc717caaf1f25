//! Import block data model.
//!
//! An [`ImportBlock`] is one top-level `import` declaration as found by the
//! scanner. Entries carry the byte span they occupied in the source; the
//! layout pass overwrites that span with a synthetic position once the block
//! has been regrouped.

use serde::Serialize;

/// Half-open byte range `[start, end)` into the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// One import spec inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportEntry {
    /// Path literal including its quote characters, e.g. `"net/http"`.
    pub path: String,
    /// Package name, `.` or `_` written before the path.
    pub alias: Option<String>,
    /// Comment lines directly above the entry, verbatim.
    pub leading_comments: Vec<String>,
    /// Comment following the path on the same line.
    pub trailing_comment: Option<String>,
    /// Byte range of `alias path`, excluding comments.
    pub span: Span,
}

impl ImportEntry {
    pub fn new(path: impl Into<String>, span: Span) -> Self {
        Self {
            path: path.into(),
            alias: None,
            leading_comments: Vec::new(),
            trailing_comment: None,
            span,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_leading_comment(mut self, comment: impl Into<String>) -> Self {
        self.leading_comments.push(comment.into());
        self
    }

    pub fn with_trailing_comment(mut self, comment: impl Into<String>) -> Self {
        self.trailing_comment = Some(comment.into());
        self
    }

    /// The path with its surrounding `"` or `` ` `` stripped.
    pub fn unquoted_path(&self) -> &str {
        unquote(&self.path)
    }

    /// Source text emitted for this entry, without comments.
    pub fn text(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} {}", alias, self.path),
            None => self.path.clone(),
        }
    }
}

/// Strips one layer of Go string quotes from a path literal.
pub fn unquote(literal: &str) -> &str {
    literal.trim_matches(|c| c == '"' || c == '`')
}

/// A top-level `import` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBlock {
    /// Byte offset of the `import` keyword.
    pub start: usize,
    /// Byte offset of `(`, absent for the single-spec form `import "fmt"`.
    pub lparen: Option<usize>,
    /// Byte offset of `)`.
    pub rparen: Option<usize>,
    pub entries: Vec<ImportEntry>,
    /// Set when the block holds comments that cannot be attached to an entry.
    pub unplaceable_comments: bool,
}

impl ImportBlock {
    /// Both delimiter offsets, when the block uses `import ( ... )` syntax.
    pub fn delimiters(&self) -> Option<(usize, usize)> {
        self.lparen.zip(self.rparen)
    }

    pub fn is_grouped(&self) -> bool {
        self.delimiters().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_text_includes_alias() {
        let entry = ImportEntry::new("\"k8s.io/foo\"", Span::new(10, 29)).with_alias("k8sfoo");
        assert_eq!(entry.text(), "k8sfoo \"k8s.io/foo\"");
        assert_eq!(entry.unquoted_path(), "k8s.io/foo");
        assert_eq!(entry.span.width(), 19);
    }

    #[test]
    fn unquote_handles_raw_strings() {
        assert_eq!(unquote("`net/http`"), "net/http");
        assert_eq!(unquote("\"fmt\""), "fmt");
    }

    #[test]
    fn single_spec_form_is_not_grouped() {
        let block = ImportBlock {
            start: 14,
            lparen: None,
            rparen: None,
            entries: vec![ImportEntry::new("\"fmt\"", Span::new(21, 26))],
            unplaceable_comments: false,
        };
        assert!(!block.is_grouped());
        assert_eq!(block.delimiters(), None);
    }
}
