//! Block transformation pipeline.
//!
//! [`BlockTransformer`] runs classification, sorting and layout synthesis on
//! one import block. [`format_source`] drives it over every import block of
//! a file and hands the result to the renderer.

use crate::classifier::{GroupSummary, classify, sort_group};
use crate::error::TransformError;
use crate::import::ImportBlock;
use crate::layout::{LineTable, synthesize};
use crate::rewriter::{self, Replacement};
use crate::rules::RuleSet;
use crate::scanner;
use anyhow::Result;
use serde::Serialize;

/// Why a block was left exactly as parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// `import "fmt"` without parentheses.
    NotGrouped,
    /// Zero or one entry.
    TooFewEntries,
    /// `(` and `)` on the same line.
    SingleLine,
    /// Comments that cannot follow their entry to a new position.
    UnplaceableComments,
    /// Blank lines between groups do not fit into the block's lines.
    LayoutOverflow,
}

/// New line table and group shape of a rewritten block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub table: LineTable,
    pub groups: Vec<GroupSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    /// A single group already in final order.
    Unchanged,
    Rewritten(Rewrite),
}

/// Regroups a single import block.
#[derive(Debug, Clone, Copy)]
pub struct BlockTransformer<'a> {
    rules: &'a RuleSet,
    sort: bool,
}

impl<'a> BlockTransformer<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules, sort: true }
    }

    pub fn with_sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    /// Classifies, sorts and lays out `block` against `table`.
    ///
    /// On [`Outcome::Rewritten`] the block's entries are replaced by the
    /// regrouped entries carrying synthetic spans, and the returned table must
    /// be used for rendering and for any later block of the same file. On
    /// every other outcome, and on error, `block` is left untouched. A block
    /// whose regrouped lines would run into the next line is skipped.
    pub fn transform(
        &self,
        block: &mut ImportBlock,
        table: &LineTable,
    ) -> Result<Outcome, TransformError> {
        let Some((lparen, rparen)) = block.delimiters() else {
            return Ok(Outcome::Skipped(SkipReason::NotGrouped));
        };
        if block.entries.len() <= 1 {
            return Ok(Outcome::Skipped(SkipReason::TooFewEntries));
        }
        if table.line_of(lparen) == table.line_of(rparen) {
            return Ok(Outcome::Skipped(SkipReason::SingleLine));
        }
        if block.unplaceable_comments {
            return Ok(Outcome::Skipped(SkipReason::UnplaceableComments));
        }

        let mut groups = classify(&block.entries, self.rules)?;
        if self.sort {
            groups.iter_mut().for_each(sort_group);
        }

        let found: usize = groups.iter().map(|g| g.entries.len()).sum();
        if found != block.entries.len() {
            return Err(TransformError::EntryCountMismatch {
                expected: block.entries.len(),
                found,
            });
        }

        if let [only] = groups.as_slice()
            && only.entries == block.entries
        {
            return Ok(Outcome::Unchanged);
        }

        let table = match synthesize(&mut groups, lparen, rparen, table) {
            Ok(table) => table,
            Err(TransformError::LayoutOverflow { .. }) => {
                return Ok(Outcome::Skipped(SkipReason::LayoutOverflow));
            }
            Err(err) => return Err(err),
        };
        let summaries = groups.iter().map(GroupSummary::from).collect();
        block.entries = groups.into_iter().flat_map(|g| g.entries).collect();

        Ok(Outcome::Rewritten(Rewrite {
            table,
            groups: summaries,
        }))
    }
}

/// What happened to one import declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockReport {
    /// 1-based line of the `import` keyword in the formatted text.
    pub line: usize,
    pub entries: usize,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupSummary>,
}

/// Formatted source plus a report per import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    pub text: String,
    pub blocks: Vec<BlockReport>,
}

impl Formatted {
    pub fn is_changed(&self, original: &str) -> bool {
        self.text != original
    }
}

/// Regroups every import block of a Go source file.
///
/// Text outside rewritten blocks is copied unchanged. Parse errors and
/// transform errors fail the whole file; nothing is partially rewritten.
pub fn format_source(source: &str, transformer: &BlockTransformer<'_>) -> Result<Formatted> {
    let mut blocks = scanner::parse_imports(source)?;
    let mut table = LineTable::from_source(source);
    let mut reports = Vec::with_capacity(blocks.len());
    let mut rewritten = Vec::new();

    for (index, block) in blocks.iter_mut().enumerate() {
        let mut report = BlockReport {
            line: table.line_of(block.start),
            entries: block.entries.len(),
            status: "unchanged",
            skipped: None,
            groups: Vec::new(),
        };
        match transformer.transform(block, &table)? {
            Outcome::Skipped(reason) => {
                report.status = "skipped";
                report.skipped = Some(reason);
            }
            Outcome::Unchanged => {}
            Outcome::Rewritten(rewrite) => {
                report.status = "rewritten";
                report.groups = rewrite.groups;
                table = rewrite.table;
                rewritten.push(index);
            }
        }
        reports.push(report);
    }

    let replacements: Vec<Replacement> = rewritten
        .into_iter()
        .filter_map(|index| rewriter::block_replacement(&blocks[index], &table))
        .collect();

    Ok(Formatted {
        text: rewriter::apply_replacements(source, replacements)?,
        blocks: reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    const SCENARIO_A: &str = "package main\n\nimport (\n\t\"fmt\"\n\t\"github.com/foo\"\n\t\"github.com/bar\"\n\tk8sfoo \"k8s.io/foo\"\n)\n\nfunc main() {}\n";

    const SCENARIO_A_FORMATTED: &str = "package main\n\nimport (\n\t\"fmt\"\n\n\t\"github.com/bar\"\n\t\"github.com/foo\"\n\n\tk8sfoo \"k8s.io/foo\"\n)\n\nfunc main() {}\n";

    fn ecosystem_rules() -> RuleSet {
        RuleSet::new(&Config::buckets(None, Some("k8s.io".to_string())))
    }

    fn parsed(source: &str) -> ImportBlock {
        scanner::parse_imports(source).unwrap().remove(0)
    }

    #[test]
    fn scenario_a_fixed_buckets() {
        let rules = ecosystem_rules();
        let formatted = format_source(SCENARIO_A, &BlockTransformer::new(&rules)).unwrap();
        assert_eq!(formatted.text, SCENARIO_A_FORMATTED);

        let report = &formatted.blocks[0];
        assert_eq!(report.status, "rewritten");
        let labels: Vec<_> = report.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["standard", "external", "ecosystem"]);
    }

    #[test]
    fn formatting_is_idempotent() {
        let rules = ecosystem_rules();
        let transformer = BlockTransformer::new(&rules);
        let once = format_source(SCENARIO_A, &transformer).unwrap();
        let twice = format_source(&once.text, &transformer).unwrap();
        assert_eq!(twice.text, once.text);
    }

    #[test]
    fn formatting_is_deterministic() {
        let rules = ecosystem_rules();
        let transformer = BlockTransformer::new(&rules);
        let a = format_source(SCENARIO_A, &transformer).unwrap();
        let b = format_source(SCENARIO_A, &transformer).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn scenario_b_single_entry_is_untouched() {
        let source = "package main\n\nimport (\n\t\"fmt\"\n)\n";
        let rules = RuleSet::default();
        let mut block = parsed(source);
        let original = block.clone();
        let table = LineTable::from_source(source);

        let outcome = BlockTransformer::new(&rules)
            .transform(&mut block, &table)
            .unwrap();

        assert_eq!(outcome, Outcome::Skipped(SkipReason::TooFewEntries));
        assert_eq!(block, original);
    }

    #[test]
    fn ungrouped_import_is_untouched() {
        let source = "package main\n\nimport \"os\"\n";
        let rules = RuleSet::default();
        let formatted = format_source(source, &BlockTransformer::new(&rules)).unwrap();
        assert_eq!(formatted.text, source);
        assert_eq!(formatted.blocks[0].skipped, Some(SkipReason::NotGrouped));
    }

    #[test]
    fn single_line_block_is_untouched() {
        let source = "package main\n\nimport (\"os\"; \"fmt\")\n";
        let rules = RuleSet::default();
        let formatted = format_source(source, &BlockTransformer::new(&rules)).unwrap();
        assert_eq!(formatted.text, source);
        assert_eq!(formatted.blocks[0].skipped, Some(SkipReason::SingleLine));
    }

    #[test]
    fn sorted_single_group_takes_fast_path() {
        let source = "package main\n\nimport (\n\t\"fmt\"\n\n\t\"os\"\n)\n";
        let rules = RuleSet::default();
        let mut block = parsed(source);
        let original = block.clone();
        let table = LineTable::from_source(source);

        let outcome = BlockTransformer::new(&rules)
            .transform(&mut block, &table)
            .unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(block, original);
    }

    #[test]
    fn unsorted_single_group_is_rewritten() {
        let source = "package main\n\nimport (\n\t\"os\"\n\t\"fmt\"\n)\n";
        let rules = RuleSet::default();
        let formatted = format_source(source, &BlockTransformer::new(&rules)).unwrap();
        assert_eq!(
            formatted.text,
            "package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n"
        );
    }

    #[test]
    fn no_sort_keeps_visit_order_inside_groups() {
        let source = "package main\n\nimport (\n\t\"os\"\n\t\"github.com/b/b\"\n\t\"fmt\"\n\t\"github.com/a/a\"\n)\n";
        let rules = RuleSet::default();
        let transformer = BlockTransformer::new(&rules).with_sort(false);
        let formatted = format_source(source, &transformer).unwrap();
        assert_eq!(
            formatted.text,
            "package main\n\nimport (\n\t\"os\"\n\t\"fmt\"\n\n\t\"github.com/b/b\"\n\t\"github.com/a/a\"\n)\n"
        );
    }

    #[test]
    fn scenario_c_custom_rules() {
        let source = "package main\n\nimport (\n\tk8sbar \"k8s.io/bar\"\n\t\"github.com/foo\"\n\t\"fmt\"\n\t\"github.com/bar\"\n)\n";
        let config = Config::patterns(&["^\"github.*\"$", "^\"k8s.*\"$"]).unwrap();
        let rules = RuleSet::new(&config);
        let formatted = format_source(source, &BlockTransformer::new(&rules)).unwrap();

        assert_eq!(
            formatted.text,
            "package main\n\nimport (\n\t\"fmt\"\n\n\t\"github.com/bar\"\n\t\"github.com/foo\"\n\n\tk8sbar \"k8s.io/bar\"\n)\n"
        );
        let labels: Vec<_> = formatted.blocks[0]
            .groups
            .iter()
            .map(|g| g.label.as_str())
            .collect();
        assert_eq!(labels, vec!["standard", "^\"github.*\"$", "^\"k8s.*\"$"]);
    }

    #[test]
    fn scenario_d_duplicates_stay_in_order() {
        let source = "package main\n\nimport (\n\t\"os\"\n\tf \"fmt\"\n\t\"fmt\"\n)\n";
        let rules = RuleSet::default();
        let formatted = format_source(source, &BlockTransformer::new(&rules)).unwrap();
        assert_eq!(
            formatted.text,
            "package main\n\nimport (\n\tf \"fmt\"\n\t\"fmt\"\n\t\"os\"\n)\n"
        );
    }

    #[test]
    fn rewritten_table_is_strictly_increasing() {
        let rules = ecosystem_rules();
        let mut block = parsed(SCENARIO_A);
        let table = LineTable::from_source(SCENARIO_A);

        let outcome = BlockTransformer::new(&rules)
            .transform(&mut block, &table)
            .unwrap();

        match outcome {
            Outcome::Rewritten(rewrite) => {
                assert!(rewrite.table.is_strictly_increasing());
                assert_eq!(rewrite.table.line_count(), table.line_count() + 2);
                let mut previous = 0;
                for entry in &block.entries {
                    let line = rewrite.table.line_of(entry.span.start);
                    assert!(line > previous);
                    previous = line;
                }
            }
            other => panic!("expected rewrite, got {:?}", other),
        }
    }

    #[test]
    fn overflowing_block_is_skipped_untouched() {
        // Unindented with four groups: no room for three blank lines.
        let source = "package p\nimport (\n\"a\"\n\"b.c/d\"\n\"k8s.io/x\"\n\"x.y/z\"\n)\n\nvar v = 1\n";
        let rules = RuleSet::new(&Config::buckets(
            Some("b.c".to_string()),
            Some("k8s.io".to_string()),
        ));
        let mut block = parsed(source);
        let original = block.clone();
        let table = LineTable::from_source(source);

        let outcome = BlockTransformer::new(&rules)
            .transform(&mut block, &table)
            .unwrap();

        assert_eq!(outcome, Outcome::Skipped(SkipReason::LayoutOverflow));
        assert_eq!(block, original);

        let formatted = format_source(source, &BlockTransformer::new(&rules)).unwrap();
        assert_eq!(formatted.text, source);
        assert_eq!(formatted.blocks[0].skipped, Some(SkipReason::LayoutOverflow));
    }

    #[test]
    fn unindented_block_uses_room_up_to_next_line() {
        let source = "package p\nimport (\n\"os\"\n\"github.com/x/y\"\n\"k8s.io/api\"\n)\n\nfunc main() {}\n";
        let rules = ecosystem_rules();
        let formatted = format_source(source, &BlockTransformer::new(&rules)).unwrap();
        assert_eq!(
            formatted.text,
            "package p\nimport (\n\t\"os\"\n\n\t\"github.com/x/y\"\n\n\t\"k8s.io/api\"\n)\n\nfunc main() {}\n"
        );
    }

    #[test]
    fn dotless_module_gets_its_own_pattern_group() {
        let source = "package main\n\nimport (\n\t\"myapp/internal/db\"\n\t\"fmt\"\n)\n";
        let config = Config::patterns(&["^\"myapp/.*\"$"]).unwrap();
        let rules = RuleSet::new(&config);
        let formatted = format_source(source, &BlockTransformer::new(&rules)).unwrap();
        assert_eq!(
            formatted.text,
            "package main\n\nimport (\n\t\"fmt\"\n\n\t\"myapp/internal/db\"\n)\n"
        );
    }

    #[test]
    fn every_block_of_a_file_is_regrouped() {
        let source = "package main\n\nimport (\n\t\"github.com/x/y\"\n\t\"os\"\n)\n\nimport (\n\t\"k8s.io/api\"\n\t\"io\"\n)\n\nfunc main() {}\n";
        let rules = ecosystem_rules();
        let formatted = format_source(source, &BlockTransformer::new(&rules)).unwrap();
        assert_eq!(
            formatted.text,
            "package main\n\nimport (\n\t\"os\"\n\n\t\"github.com/x/y\"\n)\n\nimport (\n\t\"io\"\n\n\t\"k8s.io/api\"\n)\n\nfunc main() {}\n"
        );
        let lines: Vec<_> = formatted.blocks.iter().map(|b| b.line).collect();
        assert_eq!(lines, vec![3, 9]);
    }
}
