//! Rendering of regrouped import blocks and file rewriting.
//!
//! A rewritten block is rendered from its entries and the file's line table
//! alone: each entry goes on its own line, and a blank line appears wherever
//! the table leaves a gap between consecutive entries. The rendered text
//! replaces everything between the block's parentheses. Replacements are
//! applied in reverse offset order so earlier offsets stay valid.

use crate::error::TransformError;
use crate::import::{ImportBlock, ImportEntry};
use crate::layout::LineTable;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// A single text replacement with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub start: usize,
    pub end: usize,
    pub new_text: String,
}

/// Replacement for the text strictly between a block's parentheses.
///
/// Returns `None` for blocks without parentheses.
pub fn block_replacement(block: &ImportBlock, table: &LineTable) -> Option<Replacement> {
    let (lparen, rparen) = block.delimiters()?;
    Some(Replacement {
        start: lparen + 1,
        end: rparen,
        new_text: render_block(&block.entries, table),
    })
}

/// Renders entries as the body of an `import ( ... )` block.
///
/// The output starts with the newline after `(` and ends with the newline
/// before `)`. Lines are taken from `table`: an entry whose first line is
/// more than one line below the previous entry gets a single blank line in
/// front of it. Trailing comments are aligned across consecutive commented
/// lines, the way gofmt aligns them.
pub fn render_block(entries: &[ImportEntry], table: &LineTable) -> String {
    let lines: Vec<usize> = entries
        .iter()
        .map(|entry| table.line_of(entry.span.start))
        .collect();
    let columns = comment_columns(entries, &lines);

    let mut out = String::from("\n");
    let mut previous: Option<usize> = None;

    for ((entry, &line), column) in entries.iter().zip(&lines).zip(columns) {
        let first = line.saturating_sub(entry.leading_comments.len());
        if previous.is_some_and(|p| first > p + 1) {
            out.push('\n');
        }
        for comment in &entry.leading_comments {
            out.push('\t');
            out.push_str(comment);
            out.push('\n');
        }

        let text = entry.text();
        out.push('\t');
        out.push_str(&text);
        if let Some(comment) = &entry.trailing_comment {
            let padding = column.saturating_sub(text.chars().count()) + 1;
            out.push_str(&" ".repeat(padding));
            out.push_str(comment);
        }
        out.push('\n');

        previous = Some(line);
    }

    out
}

/// Width each entry's text is padded to before its trailing comment.
///
/// Consecutive lines that all carry a trailing comment share the width of
/// the longest entry text among them. A blank line, a leading comment or an
/// uncommented entry ends the run.
fn comment_columns(entries: &[ImportEntry], lines: &[usize]) -> Vec<usize> {
    let mut columns = vec![0; entries.len()];
    let mut run_start = 0;

    for i in 0..=entries.len() {
        let continues = i < entries.len()
            && i > run_start
            && entries[i].trailing_comment.is_some()
            && entries[i - 1].trailing_comment.is_some()
            && entries[i].leading_comments.is_empty()
            && lines[i] == lines[i - 1] + 1;
        if continues {
            continue;
        }
        if i > run_start {
            let width = entries[run_start..i]
                .iter()
                .map(|e| e.text().chars().count())
                .max()
                .unwrap_or(0);
            columns[run_start..i].fill(width);
        }
        run_start = i;
    }

    columns
}

/// Applies replacements to source content, returning the modified string.
///
/// Sorts replacements by start offset (descending) and applies each in turn.
/// This ensures earlier replacements don't invalidate later offsets. A range
/// outside the content, or not on character boundaries, fails the whole call.
pub fn apply_replacements(
    content: &str,
    mut replacements: Vec<Replacement>,
) -> Result<String, TransformError> {
    replacements.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = content.to_string();
    for rep in replacements {
        let fits = rep.start <= rep.end
            && rep.end <= result.len()
            && result.is_char_boundary(rep.start)
            && result.is_char_boundary(rep.end);
        if !fits {
            return Err(TransformError::ReplacementOutOfBounds {
                start: rep.start,
                end: rep.end,
                len: result.len(),
            });
        }
        result.replace_range(rep.start..rep.end, &rep.new_text);
    }

    Ok(result)
}

/// Overwrites `file` with `formatted`, keeping a backup until the write
/// succeeds.
///
/// The backup is a temporary file next to `file` with the same permissions.
/// If writing fails, the backup is moved back into place.
pub fn write_with_backup(file: &Path, original: &str, formatted: &str) -> Result<()> {
    let dir = file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid file name {}", file.display()))?;
    let permissions = std::fs::metadata(file)
        .with_context(|| format!("Failed to stat {}", file.display()))?
        .permissions();

    let mut backup = tempfile::Builder::new()
        .prefix(&format!("{}.", name))
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create backup for {}", file.display()))?;
    backup.write_all(original.as_bytes())?;
    backup.as_file().set_permissions(permissions)?;

    if let Err(err) = std::fs::write(file, formatted) {
        backup
            .persist(file)
            .with_context(|| format!("Failed to restore {} from backup", file.display()))?;
        return Err(err).with_context(|| format!("Failed to write {}", file.display()));
    }

    backup
        .close()
        .with_context(|| format!("Failed to remove backup for {}", file.display()))
}
