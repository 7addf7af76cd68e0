//! Document tree nodes.
//!
//! [`Node`] is a closed sum type: filters dispatch on it with exhaustive
//! `match`, so adding a variant is a compile-time-checked change across the
//! workspace.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fence::parse_fence_info;

/// Deepest header level a document can express.
pub const MAX_HEADER_LEVEL: u8 = 6;

/// A node of the document tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum Node {
    /// Section header with inline children.
    Header { level: u8, children: Vec<Node> },
    /// Paragraph with inline children.
    Paragraph(Vec<Node>),
    /// Fenced or indented code block.
    CodeBlock(CodeBlock),
    /// Image reference. `alt` holds the inline alt-text nodes.
    Image {
        url: String,
        title: String,
        alt: Vec<Node>,
    },
    /// Output-format-specific content passed through verbatim.
    RawBlock { format: String, text: String },
    /// Any construct the core does not inspect.
    Other(Opaque),
}

/// A code block: ordered set of tags plus its literal text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Tags from the fence info string, in order, without duplicates.
    ///
    /// The first tag is treated as the block's language.
    pub tags: Vec<String>,
    /// `key=value` attributes from the fence info string.
    pub attrs: BTreeMap<String, String>,
    /// Literal content.
    pub text: String,
}

/// Opaque node: a kind label, optional literal text and children.
///
/// Used for text runs, emphasis, lists, links, tables and the like. The
/// `text` field carries the payload of leaf kinds (the characters of a
/// `text` run, the destination of a `link`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Opaque {
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Opaque {
    /// Leaf opaque node carrying only text.
    #[must_use]
    pub fn leaf(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
            children: Vec::new(),
        }
    }
}

impl CodeBlock {
    /// Create a code block with the given tags and text.
    ///
    /// Duplicate tags are dropped, keeping the first occurrence.
    #[must_use]
    pub fn new<I, S>(tags: I, text: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut block = Self {
            tags: Vec::new(),
            attrs: BTreeMap::new(),
            text: text.into(),
        };
        for tag in tags {
            block.add_tag(tag);
        }
        block
    }

    /// Create a code block from a fence info string.
    ///
    /// Accepts both `lang key=value` and the attribute form `{.lang key=value}`.
    #[must_use]
    pub fn from_info(info: &str, text: impl Into<String>) -> Self {
        let (tags, attrs) = parse_fence_info(info);
        let mut block = Self::new(tags, text);
        block.attrs = attrs;
        block
    }

    /// Whether the block carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Add a tag unless already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.has_tag(&tag) {
            self.tags.push(tag);
        }
    }

    /// Remove a tag. Returns whether it was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    /// The block's language: its first tag.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }
}

impl Node {
    /// Header node.
    #[must_use]
    pub fn header(level: u8, children: Vec<Node>) -> Self {
        Self::Header { level, children }
    }

    /// Image node with empty title and alt text.
    #[must_use]
    pub fn image(url: impl Into<String>) -> Self {
        Self::Image {
            url: url.into(),
            title: String::new(),
            alt: Vec::new(),
        }
    }

    /// Raw block in the given output format.
    #[must_use]
    pub fn raw(format: impl Into<String>, text: impl Into<String>) -> Self {
        Self::RawBlock {
            format: format.into(),
            text: text.into(),
        }
    }

    /// Plain text run.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Other(Opaque::leaf("text", text))
    }

    /// Code block with the given tags.
    #[must_use]
    pub fn code_block<I, S>(tags: I, text: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::CodeBlock(CodeBlock::new(tags, text))
    }

    /// The code block payload, if this is a code block.
    #[must_use]
    pub fn as_code_block(&self) -> Option<&CodeBlock> {
        match self {
            Self::CodeBlock(block) => Some(block),
            _ => None,
        }
    }

    /// Whether this is a code block carrying `tag`.
    #[must_use]
    pub fn is_code_block_tagged(&self, tag: &str) -> bool {
        self.as_code_block().is_some_and(|block| block.has_tag(tag))
    }

    /// Child nodes, for variants that have them.
    #[must_use]
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Self::Header { children, .. } | Self::Paragraph(children) => Some(children),
            Self::Image { alt, .. } => Some(alt),
            Self::Other(opaque) => Some(&opaque.children),
            Self::CodeBlock(_) | Self::RawBlock { .. } => None,
        }
    }

    /// Mutable child nodes, for variants that have them.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Self::Header { children, .. } | Self::Paragraph(children) => Some(children),
            Self::Image { alt, .. } => Some(alt),
            Self::Other(opaque) => Some(&mut opaque.children),
            Self::CodeBlock(_) | Self::RawBlock { .. } => None,
        }
    }

    /// Visit this node and all descendants, parent before children.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        if let Some(children) = self.children_mut() {
            walk_all_mut(children, f);
        }
    }

    /// Visit this node and all descendants, parent before children.
    pub fn walk(&self, f: &mut impl FnMut(&Node)) {
        f(self);
        if let Some(children) = self.children() {
            for child in children {
                child.walk(f);
            }
        }
    }
}

/// Visit every node of a sequence and their descendants, pre-order.
pub fn walk_all_mut(nodes: &mut [Node], f: &mut impl FnMut(&mut Node)) {
    for node in nodes {
        node.walk_mut(f);
    }
}

/// Whether any node of the sequence, at any depth, satisfies `pred`.
pub fn any_node(nodes: &[Node], pred: &mut impl FnMut(&Node) -> bool) -> bool {
    let mut found = false;
    for node in nodes {
        node.walk(&mut |n| found = found || pred(n));
        if found {
            break;
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_code_block_tags_are_deduplicated() {
        let block = CodeBlock::new(["rust", "mdinclude", "rust"], "");
        assert_eq!(block.tags, vec!["rust".to_owned(), "mdinclude".to_owned()]);
        assert_eq!(block.language(), Some("rust"));
    }

    #[test]
    fn test_code_block_remove_tag() {
        let mut block = CodeBlock::new(["codeblock-include", "python"], "");
        assert!(block.remove_tag("codeblock-include"));
        assert!(!block.remove_tag("codeblock-include"));
        assert_eq!(block.language(), Some("python"));
    }

    #[test]
    fn test_code_block_from_attribute_info() {
        let block = CodeBlock::from_info("{.mdinclude #intro caption=x}", "a.md");
        assert!(block.has_tag("mdinclude"));
        assert_eq!(block.attrs.get("caption").map(String::as_str), Some("x"));
    }

    #[test]
    fn test_walk_mut_visits_nested_images() {
        let mut node = Node::Other(Opaque {
            kind: "blockquote".to_owned(),
            text: String::new(),
            children: vec![Node::Paragraph(vec![
                Node::text("see"),
                Node::image("a.png"),
            ])],
        });

        node.walk_mut(&mut |n| {
            if let Node::Image { url, .. } = n {
                url.insert_str(0, "img/");
            }
        });

        let mut urls = Vec::new();
        node.walk(&mut |n| {
            if let Node::Image { url, .. } = n {
                urls.push(url.clone());
            }
        });
        assert_eq!(urls, vec!["img/a.png".to_owned()]);
    }

    #[test]
    fn test_leaf_variants_have_no_children() {
        assert!(Node::raw("latex", "x").children().is_none());
        assert!(Node::code_block(["rust"], "x").children().is_none());
        assert!(Node::Paragraph(Vec::new()).children().is_some());
    }

    #[test]
    fn test_any_node_finds_nested_match() {
        let nodes = vec![
            Node::Paragraph(vec![Node::text("x")]),
            Node::Other(Opaque {
                kind: "item".to_owned(),
                text: String::new(),
                children: vec![Node::code_block(["mdinclude"], "a.md")],
            }),
        ];
        assert!(any_node(&nodes, &mut |n| n.is_code_block_tagged("mdinclude")));
        assert!(!any_node(&nodes, &mut |n| n.is_code_block_tagged("plantuml")));
    }

    #[test]
    fn test_opaque_compares_children() {
        let list = |url: &str| Opaque {
            kind: "list".to_owned(),
            text: String::new(),
            children: vec![Node::Paragraph(vec![Node::image(url)])],
        };
        assert_eq!(list("a.png"), list("a.png"));
        assert_ne!(list("a.png"), list("b.png"));
    }

    #[test]
    fn test_node_json_is_adjacently_tagged() {
        let json = serde_json::to_value(Node::image("a.png")).unwrap();
        assert_eq!(json["t"], "Image");
        assert_eq!(json["c"]["url"], "a.png");
    }
}
