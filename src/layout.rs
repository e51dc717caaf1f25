//! Line tables and synthetic layout for regrouped import blocks.
//!
//! The renderer places line breaks, blank lines and comments purely from a
//! [`LineTable`]: an entry's line is the line whose start offset is the last
//! one at or before the entry's span start. After regrouping, the entries no
//! longer sit at their original offsets, so [`synthesize`] fabricates a
//! compact, strictly increasing set of offsets for the block and splices
//! them into the file's table.
//!
//! Layout of the synthesized slice, starting one byte after `(`:
//!
//! ```text
//! slot  leading comment        (one per comment line, width + 1)
//! slot  entry                  (span width + 1)
//! ...
//! slot  separator              (1, after every group)
//! ```
//!
//! The separator recorded after the last group becomes the start of the line
//! holding `)`, so the table keeps exactly one line per rendered line.

use crate::classifier::Group;
use crate::error::TransformError;
use crate::import::Span;

/// Byte offset of the first character of every line, in line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTable {
    starts: Vec<usize>,
}

impl LineTable {
    pub fn from_source(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(i, b)| b == b'\n' && i + 1 < source.len())
                .map(|(i, _)| i + 1),
        );
        Self { starts }
    }

    pub fn from_starts(starts: Vec<usize>) -> Self {
        Self { starts }
    }

    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Start offset of a 1-based line.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1).and_then(|i| self.starts.get(i).copied())
    }

    /// 1-based line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset).max(1)
    }

    /// First 1-based line whose start does not exceed the previous line's.
    pub fn first_non_increasing(&self) -> Option<usize> {
        self.starts
            .windows(2)
            .position(|pair| pair[0] >= pair[1])
            .map(|i| i + 2)
    }

    pub fn is_strictly_increasing(&self) -> bool {
        self.first_non_increasing().is_none()
    }

    /// Replaces lines `first..=last` (1-based) with `slots`.
    ///
    /// Starts before and after the range are copied by value.
    pub fn splice(&self, first: usize, last: usize, slots: &[usize]) -> Result<Self, TransformError> {
        let head = first.saturating_sub(1).min(self.starts.len());
        let tail = last.min(self.starts.len()).max(head);

        let mut starts = Vec::with_capacity(head + slots.len() + self.starts.len() - tail);
        starts.extend_from_slice(&self.starts[..head]);
        starts.extend_from_slice(slots);
        starts.extend_from_slice(&self.starts[tail..]);

        let table = Self { starts };
        match table.first_non_increasing() {
            Some(line) => Err(TransformError::NonMonotonic { line }),
            None => Ok(table),
        }
    }
}

/// Assigns synthetic spans to every entry of `groups` and returns the file's
/// line table with the block's lines replaced.
///
/// `lparen` and `rparen` are the offsets of the block delimiters in the
/// original source; `table` must be the current table for that source.
/// Entries keep their span width. The synthesized lines must end before the
/// line following `)` starts, otherwise [`TransformError::LayoutOverflow`] is
/// returned. Nothing in `groups` is touched when an error is returned.
pub fn synthesize(
    groups: &mut [Group],
    lparen: usize,
    rparen: usize,
    table: &LineTable,
) -> Result<LineTable, TransformError> {
    let mut slots = Vec::new();
    let mut spans = Vec::new();
    let mut offset = lparen + 1;

    for group in groups.iter() {
        for entry in &group.entries {
            for comment in &entry.leading_comments {
                slots.push(offset);
                offset += comment.len() + 1;
            }
            let span = Span::new(offset, offset + entry.span.width());
            slots.push(span.start);
            spans.push(span);
            offset = span.end + 1;
        }
        slots.push(offset);
        offset += 1;
    }

    // The last separator slot is the line holding `)`. Lines after it keep
    // their original starts, so it must stay below the next one.
    let closing = slots.last().copied().unwrap_or(offset);
    let closing_line = table.line_of(rparen);
    if let Some(next) = table.line_start(closing_line + 1)
        && closing >= next
    {
        return Err(TransformError::LayoutOverflow {
            needed: closing,
            available: next,
        });
    }

    let spliced = table.splice(table.line_of(lparen) + 1, closing_line, &slots)?;

    let entries = groups.iter_mut().flat_map(|group| group.entries.iter_mut());
    for (entry, span) in entries.zip(spans) {
        entry.span = span;
    }

    Ok(spliced)
}
