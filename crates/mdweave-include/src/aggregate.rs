//! Codeblock aggregation: verbatim multi-file listings.

use std::fs;
use std::path::PathBuf;

use mdweave_ast::Node;
use mdweave_filter::{Context, Filter, FilterAction, FilterError};

use crate::AGGREGATE_INCLUDE;

/// Fills `codeblock-include` blocks with the concatenated text of the
/// listed files.
///
/// The block keeps its other tags, so the first remaining tag still names
/// the listing language. Lines starting with `#` are comments. Unreadable
/// files are skipped with a warning.
pub struct AggregateFilter {
    root: PathBuf,
    warnings: Vec<String>,
}

impl AggregateFilter {
    /// Resolve listed paths against `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            warnings: Vec::new(),
        }
    }

    fn concatenate(&mut self, listing: &str) -> String {
        let mut text = String::new();
        for path in listing.lines().map(str::trim) {
            if path.is_empty() || path.starts_with('#') {
                continue;
            }
            let full = self.root.join(path);
            match fs::read_to_string(&full) {
                Ok(content) => text.push_str(&content),
                Err(e) => {
                    let message = format!("skipping codeblock include {}: {e}", full.display());
                    tracing::warn!("{message}");
                    self.warnings.push(message);
                }
            }
        }
        text
    }
}

impl Filter for AggregateFilter {
    fn name(&self) -> &'static str {
        "aggregate"
    }

    fn apply(&mut self, node: &mut Node, _ctx: &Context<'_>) -> Result<FilterAction, FilterError> {
        if let Node::CodeBlock(block) = node
            && block.remove_tag(AGGREGATE_INCLUDE)
        {
            block.text = self.concatenate(&block.text);
        }
        Ok(FilterAction::Unchanged)
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
