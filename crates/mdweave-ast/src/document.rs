//! Document, target format and metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::node::Node;

/// Output family the document is being prepared for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetFormat {
    /// Paginated output (LaTeX, PDF).
    Paper,
    /// Web output (HTML and HTML slide formats).
    Hypertext,
    /// Anything else.
    #[default]
    Generic,
}

impl TargetFormat {
    /// Classify a writer name such as `latex` or `html5`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "latex" | "pdf" | "beamer" => Self::Paper,
            "html" | "html4" | "html5" | "revealjs" | "slidy" => Self::Hypertext,
            _ => Self::Generic,
        }
    }

    /// Whether the target is paginated output.
    #[must_use]
    pub fn is_paper(self) -> bool {
        self == Self::Paper
    }
}

/// A metadata value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Structural content, e.g. raw preamble blocks.
    ///
    /// Listed before `List` so serialized blocks read back as blocks.
    Blocks(Vec<Node>),
    List(Vec<MetaValue>),
    Map(BTreeMap<String, MetaValue>),
}

/// Document metadata, keyed by field name.
pub type Metadata = BTreeMap<String, MetaValue>;

/// A parsed document flowing through the filter chain.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Output family the document is prepared for.
    pub format: TargetFormat,
    /// Document metadata (front matter plus injected fields).
    pub metadata: Metadata,
    /// Top-level block sequence.
    pub blocks: Vec<Node>,
}

impl Document {
    /// Create a document from its parts.
    #[must_use]
    pub fn new(format: TargetFormat, metadata: Metadata, blocks: Vec<Node>) -> Self {
        Self {
            format,
            metadata,
            blocks,
        }
    }

    /// Set the target format.
    #[must_use]
    pub fn with_format(mut self, format: TargetFormat) -> Self {
        self.format = format;
        self
    }
}
