//! Markdown parsing into the document tree.
//!
//! [`MarkdownParser`] folds the pulldown-cmark event stream into [`Node`]s
//! using a stack of open containers. The same parser instance is used for the
//! top-level document and for every included file.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::document::{Document, Metadata, TargetFormat};
use crate::node::{CodeBlock, Node, Opaque};

/// Parses source text into a [`Document`].
pub trait DocumentParser {
    /// Parse `text`. Parsing never fails; malformed input yields best-effort nodes.
    fn parse(&self, text: &str) -> Document;
}

/// pulldown-cmark backed [`DocumentParser`].
///
/// GFM tables, strikethrough, task lists and footnotes are enabled, as are
/// YAML front matter blocks, which populate [`Document::metadata`].
#[derive(Clone, Debug)]
pub struct MarkdownParser {
    options: Options,
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_GFM
                | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS,
        }
    }
}

impl DocumentParser for MarkdownParser {
    fn parse(&self, text: &str) -> Document {
        let mut builder = TreeBuilder::default();
        for event in Parser::new_ext(text, self.options) {
            builder.event(event);
        }
        builder.finish()
    }
}

/// Open container on the builder stack.
enum Frame {
    Node(Node),
    Metadata(String),
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Frame>,
    blocks: Vec<Node>,
    metadata: Metadata,
}

impl TreeBuilder {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(&tag),
            Event::Text(text) => self.text(&text),
            Event::Html(html) => {
                if let Some(Frame::Node(Node::RawBlock { text, .. })) = self.stack.last_mut() {
                    text.push_str(&html);
                } else {
                    self.leaf(Node::raw("html", html.into_string()));
                }
            }
            Event::InlineHtml(html) => {
                self.leaf(Node::Other(Opaque::leaf("inline-html", html.into_string())));
            }
            Event::Code(code) => self.leaf(Node::Other(Opaque::leaf("code", code.into_string()))),
            Event::SoftBreak => self.leaf(Node::Other(Opaque::leaf("softbreak", ""))),
            Event::HardBreak => self.leaf(Node::Other(Opaque::leaf("hardbreak", ""))),
            Event::Rule => self.leaf(Node::Other(Opaque::leaf("rule", ""))),
            Event::TaskListMarker(checked) => {
                let mark = if checked { "x" } else { "" };
                self.leaf(Node::Other(Opaque::leaf("task", mark)));
            }
            Event::FootnoteReference(label) => {
                self.leaf(Node::Other(Opaque::leaf("footnote-ref", label.into_string())));
            }
            Event::InlineMath(math) => {
                self.leaf(Node::Other(Opaque::leaf("math", math.into_string())));
            }
            Event::DisplayMath(math) => {
                self.leaf(Node::Other(Opaque::leaf("display-math", math.into_string())));
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let node = match tag {
            Tag::Paragraph => Node::Paragraph(Vec::new()),
            Tag::Heading { level, .. } => Node::header(heading_level_to_num(level), Vec::new()),
            Tag::CodeBlock(kind) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) => info.into_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                Node::CodeBlock(CodeBlock::from_info(&info, String::new()))
            }
            Tag::Image { dest_url, title, .. } => Node::Image {
                url: dest_url.into_string(),
                title: title.into_string(),
                alt: Vec::new(),
            },
            Tag::HtmlBlock => Node::raw("html", String::new()),
            Tag::MetadataBlock(_) => {
                self.stack.push(Frame::Metadata(String::new()));
                return;
            }
            Tag::Link { dest_url, .. } => container("link", dest_url.into_string()),
            Tag::List(Some(start)) => container("ordered-list", start.to_string()),
            Tag::List(None) => container("bullet-list", String::new()),
            Tag::FootnoteDefinition(label) => container("footnote", label.into_string()),
            Tag::BlockQuote(_) => container("blockquote", String::new()),
            Tag::Item => container("item", String::new()),
            Tag::DefinitionList => container("definition-list", String::new()),
            Tag::DefinitionListTitle => container("definition-title", String::new()),
            Tag::DefinitionListDefinition => container("definition", String::new()),
            Tag::Table(_) => container("table", String::new()),
            Tag::TableHead => container("table-head", String::new()),
            Tag::TableRow => container("table-row", String::new()),
            Tag::TableCell => container("table-cell", String::new()),
            Tag::Emphasis => container("emphasis", String::new()),
            Tag::Strong => container("strong", String::new()),
            Tag::Strikethrough => container("strikethrough", String::new()),
            Tag::Superscript => container("superscript", String::new()),
            Tag::Subscript => container("subscript", String::new()),
        };
        self.stack.push(Frame::Node(node));
    }

    fn end(&mut self, _tag: &TagEnd) {
        match self.stack.pop() {
            Some(Frame::Node(node)) => self.leaf(node),
            Some(Frame::Metadata(yaml)) => match serde_yaml::from_str::<Metadata>(&yaml) {
                Ok(metadata) => self.metadata.extend(metadata),
                Err(e) => tracing::warn!("ignoring malformed front matter: {e}"),
            },
            None => {}
        }
    }

    fn text(&mut self, text: &str) {
        match self.stack.last_mut() {
            Some(Frame::Node(Node::CodeBlock(block))) => block.text.push_str(text),
            Some(Frame::Node(Node::RawBlock { text: raw, .. })) => raw.push_str(text),
            Some(Frame::Metadata(yaml)) => yaml.push_str(text),
            _ => self.leaf(Node::text(text)),
        }
    }

    /// Attach a finished node to the innermost open container.
    fn leaf(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(Frame::Node(parent)) => {
                if let Some(children) = parent.children_mut() {
                    children.push(node);
                }
            }
            Some(Frame::Metadata(_)) => {}
            None => self.blocks.push(node),
        }
    }

    fn finish(mut self) -> Document {
        // Unbalanced streams do not occur with pulldown-cmark, but close anything left open.
        while !self.stack.is_empty() {
            self.end(&TagEnd::Paragraph);
        }
        Document::new(TargetFormat::Generic, self.metadata, self.blocks)
    }
}

fn container(kind: &str, text: String) -> Node {
    Node::Other(Opaque {
        kind: kind.to_owned(),
        text,
        children: Vec::new(),
    })
}

/// Convert heading level enum to number (1-6).
#[must_use]
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
