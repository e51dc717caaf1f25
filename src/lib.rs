//! gofmt-import library for grouping and sorting Go import blocks.
//!
//! This library provides programmatic access to the import formatter. The
//! core workflow for one file involves four phases:
//!
//! 1. **Scanning**: Parse the source with tree-sitter and extract each import
//!    declaration with byte spans and attached comments
//! 2. **Classification**: Assign every import to the first matching rule and
//!    sort each resulting group by path
//! 3. **Layout**: Synthesize a strictly increasing line table that puts one
//!    blank line between groups
//! 4. **Rewriting**: Render the regrouped blocks from that table and splice
//!    them back into the source
//!
//! # Example
//!
//! ```no_run
//! use gofmt_import::{BlockTransformer, Config, RuleSet, format_source};
//!
//! let config = Config::buckets(Some("example.com/app".to_string()), Some("k8s.io".to_string()));
//! let rules = RuleSet::new(&config);
//! let transformer = BlockTransformer::new(&rules).with_sort(config.sort);
//!
//! let source = std::fs::read_to_string("main.go").unwrap();
//! let formatted = format_source(&source, &transformer).unwrap();
//!
//! if formatted.is_changed(&source) {
//!     print!("{}", formatted.text);
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod diff;
pub mod error;
pub mod import;
pub mod layout;
pub mod rewriter;
pub mod rules;
pub mod scanner;
pub mod transform;

// Re-export commonly used types at crate root
pub use config::{Config, Policy};
pub use error::{ConfigError, SyntaxError, TransformError};
pub use import::{ImportBlock, ImportEntry, Span};
pub use layout::LineTable;
pub use rules::RuleSet;
pub use transform::{BlockTransformer, Formatted, Outcome, format_source};
