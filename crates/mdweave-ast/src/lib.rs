//! Document tree for mdweave.
//!
//! This crate provides the in-memory representation every filter operates on:
//!
//! - [`Node`]: closed sum type over headers, paragraphs, code blocks, images,
//!   raw blocks and opaque constructs
//! - [`Document`]: target format, metadata and the top-level block sequence
//! - [`DocumentParser`] / [`MarkdownParser`]: markdown to tree conversion via
//!   pulldown-cmark
//!
//! # Example
//!
//! ```
//! use mdweave_ast::{DocumentParser, MarkdownParser};
//!
//! let doc = MarkdownParser::new().parse("# Title\n\n```mdinclude\nchapter.md\n```\n");
//! assert!(doc.blocks[1].is_code_block_tagged("mdinclude"));
//! ```

mod document;
mod fence;
mod node;
mod parser;

pub use document::{Document, MetaValue, Metadata, TargetFormat};
pub use node::{CodeBlock, MAX_HEADER_LEVEL, Node, Opaque, any_node, walk_all_mut};
pub use parser::{DocumentParser, MarkdownParser};
