//! Grouping and ordering of import entries.
//!
//! [`classify`] partitions a block's entries by the first matching rule and
//! returns the non-empty groups in rule order. [`sort_group`] then orders
//! each group by path literal.

use crate::error::TransformError;
use crate::import::ImportEntry;
use crate::rules::RuleSet;
use serde::Serialize;

/// Entries that matched the same rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Position of the rule in the rule set; groups are emitted by rank.
    pub rank: usize,
    pub label: String,
    pub entries: Vec<ImportEntry>,
}

/// Label and size of one emitted group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub label: String,
    pub len: usize,
}

impl From<&Group> for GroupSummary {
    fn from(group: &Group) -> Self {
        Self {
            label: group.label.clone(),
            len: group.entries.len(),
        }
    }
}

/// Assigns each entry to the first rule that matches it.
///
/// Entries keep their visit order inside a group. Rules that matched nothing
/// produce no group at all. An entry that matches no rule is an error rather
/// than being dropped.
pub fn classify(entries: &[ImportEntry], rules: &RuleSet) -> Result<Vec<Group>, TransformError> {
    let mut buckets: Vec<Vec<ImportEntry>> = vec![Vec::new(); rules.len()];

    for entry in entries {
        let rank = rules
            .rank_of(&entry.path)
            .ok_or_else(|| TransformError::Unclassified {
                path: entry.path.clone(),
            })?;
        buckets[rank].push(entry.clone());
    }

    let groups = buckets
        .into_iter()
        .zip(rules.rules())
        .enumerate()
        .filter(|(_, (bucket, _))| !bucket.is_empty())
        .map(|(rank, (entries, rule))| Group {
            rank,
            label: rule.label.clone(),
            entries,
        })
        .collect();

    Ok(groups)
}

/// Sorts a group by path literal, quotes included.
///
/// The sort is stable: entries with identical paths keep their relative
/// order. Spans are not touched.
pub fn sort_group(group: &mut Group) {
    group.entries.sort_by(|a, b| a.path.cmp(&b.path));
}
