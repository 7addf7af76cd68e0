//! Diagram cache key computation.

use mdweave_cache::ContentKey;

use crate::kind::RendererKind;

/// Cache key of a diagram: its renderer kind plus the hash of its source.
///
/// The hash covers the exact source text as written in the document, before
/// any staging transformation, so whitespace changes are cache misses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagramKey {
    kind: RendererKind,
    content: ContentKey,
}

impl DiagramKey {
    #[must_use]
    pub fn new(kind: RendererKind, source: &str) -> Self {
        Self {
            kind,
            content: ContentKey::of(source),
        }
    }

    /// Renderer the artifact is produced by.
    #[must_use]
    pub fn kind(&self) -> RendererKind {
        self.kind
    }

    /// Content hash, the artifact's file stem.
    #[must_use]
    pub fn content(&self) -> &ContentKey {
        &self.content
    }
}
