//! Filter trait for extensible node transformation.
//!
//! Filters are registered with a [`FilterChain`](crate::FilterChain) and
//! applied one at a time across the whole tree. A filter inspects one node
//! at a time and answers with a [`FilterAction`].
//!
//! # Example
//!
//! ```
//! use mdweave_ast::Node;
//! use mdweave_filter::{Context, Filter, FilterAction, FilterError};
//!
//! /// Drops every raw block.
//! struct StripRaw;
//!
//! impl Filter for StripRaw {
//!     fn name(&self) -> &'static str {
//!         "strip-raw"
//!     }
//!
//!     fn apply(&mut self, node: &mut Node, _ctx: &Context<'_>) -> Result<FilterAction, FilterError> {
//!         match node {
//!             Node::RawBlock { .. } => Ok(FilterAction::Splice(Vec::new())),
//!             _ => Ok(FilterAction::Unchanged),
//!         }
//!     }
//! }
//! ```

use std::error::Error;

use mdweave_ast::{Metadata, Node, TargetFormat};

/// Read-only view of the document handed to filters.
#[derive(Clone, Copy, Debug)]
pub struct Context<'a> {
    /// Output family the document is prepared for.
    pub format: TargetFormat,
    /// Document metadata.
    pub metadata: &'a Metadata,
}

/// Result of offering a node to a filter.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterAction {
    /// Keep the node (possibly updated in place) and descend into its children.
    Unchanged,
    /// Replace the node. The replacement is offered to the same filter again.
    Replace(Node),
    /// Replace the node with zero or more nodes at the same position.
    ///
    /// Every spliced node is offered to the same filter again. An empty
    /// splice deletes the node.
    Splice(Vec<Node>),
    /// Keep the node and insert siblings after it.
    ///
    /// The kept node is not offered again; the inserted nodes are offered as
    /// the walk reaches them.
    InsertAfter(Vec<Node>),
}

/// A node transformer.
pub trait Filter {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Offer a node to the filter.
    ///
    /// Returns `Err` only for failures that must abort the whole build.
    /// Recoverable problems should be recorded as [`warnings`](Self::warnings)
    /// and answered with [`FilterAction::Unchanged`].
    fn apply(&mut self, node: &mut Node, ctx: &Context<'_>) -> Result<FilterAction, FilterError>;

    /// Non-fatal diagnostics collected so far.
    ///
    /// Default implementation returns an empty slice.
    fn warnings(&self) -> &[String] {
        &[]
    }
}

/// Fatal filter failure.
#[derive(Debug, thiserror::Error)]
#[error("{filter}: {source}")]
pub struct FilterError {
    filter: &'static str,
    #[source]
    source: Box<dyn Error + Send + Sync + 'static>,
}

impl FilterError {
    /// Wrap an error raised by the named filter.
    pub fn new(filter: &'static str, source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self {
            filter,
            source: source.into(),
        }
    }

    /// Name of the filter that failed.
    #[must_use]
    pub fn filter(&self) -> &'static str {
        self.filter
    }

    /// Underlying error, for downcasting.
    #[must_use]
    pub fn inner(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.source.as_ref()
    }
}
