//! Include directives for mdweave.
//!
//! Two directive kinds are supported, both written as tagged code blocks
//! listing one file per line:
//!
//! - `mdinclude` ([`IncludeFilter`]): the listed markdown files are parsed
//!   and spliced into the document in place of the block, recursively, with
//!   relative image and include paths rewritten and optional header
//!   promotion
//! - `codeblock-include` ([`AggregateFilter`]): the listed files' raw text
//!   becomes the block's text, for verbatim listings
//!
//! ````markdown
//! ```mdinclude
//! # Chapters are promoted one level below the book title
//! increase_headers=true
//! chapters/intro.md
//! chapters/usage.md
//! ```
//! ````

mod aggregate;
mod directive;
mod error;
mod resolver;
mod uri;

/// Tag of a virtual include directive.
pub const VIRTUAL_INCLUDE: &str = "mdinclude";

/// Tag of an aggregate include directive.
pub const AGGREGATE_INCLUDE: &str = "codeblock-include";

pub use aggregate::AggregateFilter;
pub use directive::{DirectiveEntry, IncludeDirective};
pub use error::IncludeError;
pub use resolver::{DEFAULT_MAX_DEPTH, IncludeFilter, IncludeResolver};
pub use uri::{base_dir, is_absolute, rewrite_uris, rewrite_url};
