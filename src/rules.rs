//! Import classification rules.
//!
//! A [`RuleSet`] is an ordered list of labelled matchers over an import path
//! literal. It always starts with the standard-library rule and always ends
//! with a catch-all, so every import matches at least one rule. The rank of
//! the first matching rule decides the import's group, and groups are emitted
//! in rank order.
//!
//! The set is immutable once built and can be shared between threads that
//! format different files.

use crate::config::{Config, Policy};
use crate::import::unquote;
use regex::Regex;

/// Predicate over an import path literal (quotes included).
#[derive(Debug, Clone)]
pub enum Matcher {
    /// First path segment has no `.`, e.g. `"fmt"` or `"net/http"`.
    Standard(Scope),
    /// A single bare segment of word characters, e.g. `"fmt"` but not
    /// `"net/http"`. Leaves multi-segment paths to the user's patterns.
    Builtin,
    /// Any domain-qualified path that is neither ecosystem nor local.
    External(Scope),
    /// First segment equals the ecosystem domain, outside the local root.
    Ecosystem(Scope),
    /// Under the local root prefix.
    Local(Scope),
    /// User pattern, matched against the quoted literal.
    Pattern(Regex),
    Any,
}

/// Project coordinates used by the fixed bucket matchers.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub local_root: Option<String>,
    pub ecosystem: Option<String>,
}

impl Scope {
    fn is_local(&self, path: &str) -> bool {
        self.local_root.as_deref().is_some_and(|root| {
            path == root
                || path
                    .strip_prefix(root)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    fn is_ecosystem(&self, path: &str) -> bool {
        self.ecosystem
            .as_deref()
            .is_some_and(|domain| first_segment(path) == domain)
    }
}

fn first_segment(path: &str) -> &str {
    path.split('/').next().unwrap_or(path)
}

/// Standard library paths have no domain-like first segment.
fn is_standard(path: &str) -> bool {
    !path.is_empty() && !first_segment(path).contains('.')
}

fn is_builtin(path: &str) -> bool {
    !path.is_empty() && path.chars().all(|c| c.is_alphanumeric() || c == '_')
}

impl Matcher {
    pub fn matches(&self, literal: &str) -> bool {
        let path = unquote(literal);
        match self {
            Matcher::Standard(scope) => {
                is_standard(path) && !scope.is_local(path) && !scope.is_ecosystem(path)
            }
            Matcher::Builtin => is_builtin(path),
            Matcher::External(scope) => !scope.is_local(path) && !scope.is_ecosystem(path),
            Matcher::Ecosystem(scope) => scope.is_ecosystem(path) && !scope.is_local(path),
            Matcher::Local(scope) => scope.is_local(path),
            Matcher::Pattern(regex) => regex.is_match(literal),
            Matcher::Any => true,
        }
    }
}

/// A labelled matcher. The label only shows up in reports.
#[derive(Debug, Clone)]
pub struct Rule {
    pub label: String,
    pub matcher: Matcher,
}

impl Rule {
    pub fn new(label: impl Into<String>, matcher: Matcher) -> Self {
        Self {
            label: label.into(),
            matcher,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Builds the ordered rule list for `config`. Patterns were validated when
    /// the config was built, so this cannot fail.
    pub fn new(config: &Config) -> Self {
        let mut rules = Vec::new();
        match &config.policy {
            Policy::Buckets {
                local_root,
                ecosystem,
            } => {
                let scope = Scope {
                    local_root: local_root.clone(),
                    ecosystem: ecosystem.clone(),
                };
                rules.push(Rule::new("standard", Matcher::Standard(scope.clone())));
                rules.push(Rule::new("external", Matcher::External(scope.clone())));
                rules.push(Rule::new("ecosystem", Matcher::Ecosystem(scope.clone())));
                rules.push(Rule::new("local", Matcher::Local(scope)));
            }
            Policy::Patterns(patterns) => {
                rules.push(Rule::new("standard", Matcher::Builtin));
                for pattern in patterns {
                    rules.push(Rule::new(pattern.as_str(), Matcher::Pattern(pattern.clone())));
                }
            }
        }
        rules.push(Rule::new("other", Matcher::Any));
        Self { rules }
    }

    /// A rule set without the trailing catch-all.
    #[cfg(test)]
    pub(crate) fn without_catch_all(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rank of the first rule matching `literal`.
    pub fn rank_of(&self, literal: &str) -> Option<usize> {
        self.rules.iter().position(|rule| rule.matcher.matches(literal))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
