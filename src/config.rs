//! Per-invocation configuration.
//!
//! Everything that influences grouping is collected into a [`Config`] value
//! before the first file is read. Patterns are compiled here so a bad rule is
//! reported up front instead of halfway through a directory walk.

use crate::error::ConfigError;
use glob::Pattern;
use regex::Regex;

/// How import paths are assigned to groups.
#[derive(Debug, Clone)]
pub enum Policy {
    /// Standard library, external, ecosystem, local, in that order.
    Buckets {
        /// Module path prefix of the project being formatted.
        local_root: Option<String>,
        /// First path segment shared by an organisation's modules, e.g. `k8s.io`.
        ecosystem: Option<String>,
    },
    /// Standard library, then one group per pattern, then everything else.
    Patterns(Vec<Regex>),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub policy: Policy,
    /// Sort entries by path inside each group.
    pub sort: bool,
    /// Globs excluded from directory walks.
    pub exclude: Vec<Pattern>,
    /// Skip `.` and `_` prefixed entries during directory walks.
    pub default_excludes: bool,
}

impl Config {
    pub fn buckets(local_root: Option<String>, ecosystem: Option<String>) -> Self {
        Self::with_policy(Policy::Buckets {
            local_root: local_root
                .map(|root| root.trim_end_matches('/').to_string())
                .filter(|root| !root.is_empty()),
            ecosystem: ecosystem.filter(|domain| !domain.is_empty()),
        })
    }

    /// Compiles `patterns` in order. Blank patterns are ignored.
    pub fn patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let mut compiled = Vec::new();
        for pattern in patterns.iter().map(AsRef::as_ref) {
            if pattern.trim().is_empty() {
                continue;
            }
            let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidRule {
                pattern: pattern.to_string(),
                source,
            })?;
            compiled.push(regex);
        }
        Ok(Self::with_policy(Policy::Patterns(compiled)))
    }

    fn with_policy(policy: Policy) -> Self {
        Self {
            policy,
            sort: true,
            exclude: Vec::new(),
            default_excludes: true,
        }
    }

    pub fn with_sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_default_excludes(mut self, enabled: bool) -> Self {
        self.default_excludes = enabled;
        self
    }

    /// Compiles exclude globs such as `vendor` or `*_gen.go`.
    pub fn with_excludes<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self, ConfigError> {
        for pattern in patterns.iter().map(AsRef::as_ref) {
            let glob = Pattern::new(pattern).map_err(|source| ConfigError::InvalidExclude {
                pattern: pattern.to_string(),
                source,
            })?;
            self.exclude.push(glob);
        }
        Ok(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::buckets(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_compile_in_order() {
        let config = Config::patterns(&["^\"github.*\"$", "^\"k8s.*\"$"]).unwrap();
        match config.policy {
            Policy::Patterns(rules) => {
                let sources: Vec<_> = rules.iter().map(|r| r.as_str()).collect();
                assert_eq!(sources, vec!["^\"github.*\"$", "^\"k8s.*\"$"]);
            }
            other => panic!("expected pattern policy, got {:?}", other),
        }
        assert!(config.sort);
    }

    #[test]
    fn blank_patterns_are_ignored() {
        let config = Config::patterns(&["", "  ", "^\"a\"$"]).unwrap();
        match config.policy {
            Policy::Patterns(rules) => assert_eq!(rules.len(), 1),
            other => panic!("expected pattern policy, got {:?}", other),
        }
    }

    #[test]
    fn malformed_pattern_is_reported() {
        let err = Config::patterns(&["^\"github.*\"$", "^(unclosed"]).unwrap_err();
        match &err {
            ConfigError::InvalidRule { pattern, .. } => assert_eq!(pattern, "^(unclosed"),
            other => panic!("expected InvalidRule, got {:?}", other),
        }
        assert!(err.to_string().contains("invalid order rule '^(unclosed'"));
    }

    #[test]
    fn malformed_exclude_is_reported() {
        let err = Config::default().with_excludes(&["vendor**"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidExclude { .. }));
    }

    #[test]
    fn local_root_trailing_slash_is_trimmed() {
        let config = Config::buckets(Some("example.com/app/".to_string()), Some(String::new()));
        match config.policy {
            Policy::Buckets {
                local_root,
                ecosystem,
            } => {
                assert_eq!(local_root.as_deref(), Some("example.com/app"));
                assert_eq!(ecosystem, None);
            }
            other => panic!("expected bucket policy, got {:?}", other),
        }
    }
}
