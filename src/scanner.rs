//! Go file scanner.
//!
//! Recursively walks directories to collect `.go` files, skipping entries
//! whose names start with `.` or `_` and anything matching an exclude glob.
//! Uses tree-sitter's Go grammar to parse each file and extract the leading
//! `import` declarations with their byte spans and attached comments.

use crate::error::{Position, SyntaxError};
use crate::import::{ImportBlock, ImportEntry, Span};
use anyhow::{Context, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser};
use walkdir::WalkDir;

/// Collects all `.go` files under `paths`.
///
/// With `default_excludes`, entries whose names start with `.` or `_` are
/// skipped. Entries matching any of `exclude` (by name or full path) are
/// always skipped. The walk roots themselves are never excluded.
pub fn collect_go_files(
    paths: &[PathBuf],
    exclude: &[Pattern],
    default_excludes: bool,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_excluded(e, exclude, default_excludes))
        {
            let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
            if entry.file_type().is_file() && is_go_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }

    Ok(files)
}

/// A regular Go source file name: `.go` suffix, not hidden.
pub fn is_go_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| !name.starts_with('.') && name.ends_with(".go"))
}

fn is_excluded(entry: &walkdir::DirEntry, exclude: &[Pattern], default_excludes: bool) -> bool {
    let name = entry.file_name().to_str().unwrap_or_default();
    if default_excludes && (name.starts_with('.') || name.starts_with('_')) {
        return true;
    }
    exclude
        .iter()
        .any(|pattern| pattern.matches(name) || pattern.matches_path(entry.path()))
}

/// Parses Go source and returns its import declarations in file order.
///
/// Only declarations before the first non-import declaration are returned,
/// since Go requires imports to come first. Any syntax error fails the whole
/// file with a [`SyntaxError`] carrying every error position.
pub fn parse_imports(source: &str) -> Result<Vec<ImportBlock>> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| anyhow::anyhow!("Failed to set Go language: {e}"))?;

    let tree = parser
        .parse(source, None)
        .context("Go parser produced no syntax tree")?;
    let root = tree.root_node();

    if root.has_error() {
        let mut errors = Vec::new();
        collect_errors(root, &mut errors);
        let mut positions = errors.into_iter().map(position_of);
        let first = positions.next().unwrap_or_else(|| position_of(root));
        return Err(SyntaxError {
            first,
            rest: positions.collect(),
        }
        .into());
    }

    let mut blocks = Vec::new();
    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        match node.kind() {
            "package_clause" | "comment" => continue,
            "import_declaration" => blocks.push(read_declaration(node, source)?),
            _ => break,
        }
    }

    Ok(blocks)
}

/// ERROR and MISSING nodes in source order, outermost only.
fn collect_errors<'t>(node: Node<'t>, errors: &mut Vec<Node<'t>>) {
    if node.is_error() || node.is_missing() {
        errors.push(node);
        return;
    }
    for child in node.children(&mut node.walk()) {
        if child.has_error() {
            collect_errors(child, errors);
        }
    }
}

fn position_of(node: Node) -> Position {
    let point = node.start_position();
    Position {
        line: point.row + 1,
        column: point.column + 1,
    }
}

/// Reads `import "x"` or `import ( ... )`.
fn read_declaration(node: Node, source: &str) -> Result<ImportBlock> {
    let mut block = ImportBlock {
        start: node.start_byte(),
        lparen: None,
        rparen: None,
        entries: Vec::new(),
        unplaceable_comments: false,
    };

    for child in node.children(&mut node.walk()) {
        match child.kind() {
            "import_spec" => block.entries.push(read_spec(child, source)?),
            "import_spec_list" => read_spec_list(child, source, &mut block)?,
            _ => {}
        }
    }

    Ok(block)
}

/// Reads a parenthesized spec list and attaches its comments to entries.
///
/// A comment on the same line as the preceding spec trails that spec; any
/// other comment leads the next spec. Comments that fit neither role mark
/// the block as unplaceable.
fn read_spec_list(list: Node, source: &str, block: &mut ImportBlock) -> Result<()> {
    let mut pending: Vec<String> = Vec::new();
    let mut lparen_row = None;
    let mut last_spec_row = None;

    for child in list.children(&mut list.walk()) {
        match child.kind() {
            "(" => {
                block.lparen = Some(child.start_byte());
                lparen_row = Some(child.start_position().row);
            }
            ")" => block.rparen = Some(child.start_byte()),
            "import_spec" => {
                let mut entry = read_spec(child, source)?;
                entry.leading_comments = std::mem::take(&mut pending);
                last_spec_row = Some(child.end_position().row);
                block.entries.push(entry);
            }
            "comment" => {
                let text = source[child.byte_range()].to_string();
                let row = child.start_position().row;
                if text.contains('\n') || lparen_row == Some(row) {
                    block.unplaceable_comments = true;
                } else if last_spec_row == Some(row) && pending.is_empty() {
                    match block.entries.last_mut() {
                        Some(entry) if entry.trailing_comment.is_none() => {
                            entry.trailing_comment = Some(text);
                        }
                        _ => block.unplaceable_comments = true,
                    }
                } else {
                    pending.push(text);
                }
            }
            _ => {}
        }
    }

    if !pending.is_empty() {
        block.unplaceable_comments = true;
    }

    Ok(())
}

/// Reads one `import_spec`: optional name followed by the path literal.
fn read_spec(node: Node, source: &str) -> Result<ImportEntry> {
    let mut path = None;
    let mut alias = None;

    for child in node.children(&mut node.walk()) {
        match child.kind() {
            "interpreted_string_literal" | "raw_string_literal" => {
                path = Some(source[child.byte_range()].to_string());
            }
            "package_identifier" | "dot" | "blank_identifier" => {
                alias = Some(source[child.byte_range()].to_string());
            }
            _ => {}
        }
    }

    let path = path.with_context(|| {
        format!(
            "import spec without a path at line {}",
            node.start_position().row + 1
        )
    })?;
    let entry = ImportEntry::new(path, Span::new(node.start_byte(), node.end_byte()));
    Ok(match alias {
        Some(alias) => entry.with_alias(alias),
        None => entry,
    })
}
