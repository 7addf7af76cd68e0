//! Diagram filter.
//!
//! This module provides [`DiagramFilter`], which replaces diagram code
//! blocks of one [`RendererKind`] with a reference to the rendered artifact.

use std::fs;
use std::path::{Path, PathBuf};

use mdweave_ast::{Node, TargetFormat};
use mdweave_cache::{ArtifactBucket, ArtifactCache};
use mdweave_filter::{Context, Filter, FilterAction, FilterError};

use crate::embed::embed;
use crate::error::{DiagramError, RenderError};
use crate::key::DiagramKey;
use crate::kind::RendererKind;
use crate::renderer::{DiagramRenderer, RenderRequest};
use crate::stage::staged_source;

/// Filter rendering diagram code blocks through a content-addressed store.
///
/// A block whose artifact already exists is embedded without invoking the
/// renderer. A failed render leaves the block unchanged and records a
/// warning.
///
/// # Example
///
/// ```
/// use mdweave_cache::NullCache;
/// use mdweave_diagrams::{CommandRenderer, DiagramFilter, RendererKind};
///
/// let cache = NullCache::new("build");
/// let filter = DiagramFilter::new(
///     RendererKind::FlowChart,
///     &cache,
///     CommandRenderer::mermaid("mmdc"),
/// );
/// ```
pub struct DiagramFilter {
    kind: RendererKind,
    bucket: Box<dyn ArtifactBucket>,
    renderer: Box<dyn DiagramRenderer>,
    link_root: Option<PathBuf>,
    warnings: Vec<String>,
}

impl DiagramFilter {
    /// Filter for `kind` storing artifacts in the kind's bucket of `cache`.
    #[must_use]
    pub fn new(
        kind: RendererKind,
        cache: &dyn ArtifactCache,
        renderer: impl DiagramRenderer + 'static,
    ) -> Self {
        Self {
            kind,
            bucket: cache.bucket(kind.store_dir()),
            renderer: Box::new(renderer),
            link_root: None,
            warnings: Vec::new(),
        }
    }

    /// Embed artifacts under `root` by their path relative to it.
    ///
    /// Artifacts outside `root` keep the store path.
    #[must_use]
    pub fn link_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.link_root = Some(root.into());
        self
    }

    fn link<'p>(&self, path: &'p Path) -> &'p Path {
        self.link_root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path)
    }

    /// Path of the artifact for `source`, rendering it on a miss.
    pub fn artifact(&self, source: &str, target: TargetFormat) -> Result<PathBuf, DiagramError> {
        let key = DiagramKey::new(self.kind, source);
        let format = key.kind().artifact_format(target);
        let ext = format.as_str();

        if let Some(path) = self.bucket.lookup(key.content(), ext) {
            return Ok(path);
        }

        self.bucket.prepare()?;
        let staging = self.bucket.staging_dir()?;
        let staged = staging
            .path()
            .join(format!("{}.{}", key.content(), self.kind.source_extension()));
        fs::write(&staged, staged_source(self.kind, source).as_bytes())?;

        let output = staged.with_extension(ext);
        self.renderer.render(&RenderRequest {
            source: &staged,
            output: &output,
            format,
        })?;
        if !output.is_file() {
            return Err(RenderError::MissingOutput(output).into());
        }

        Ok(self.bucket.store(key.content(), ext, &output)?)
    }
}

impl Filter for DiagramFilter {
    fn name(&self) -> &'static str {
        self.kind.tag()
    }

    fn apply(&mut self, node: &mut Node, ctx: &Context<'_>) -> Result<FilterAction, FilterError> {
        let Some(block) = node.as_code_block().filter(|b| b.has_tag(self.kind.tag())) else {
            return Ok(FilterAction::Unchanged);
        };

        match self.artifact(&block.text, ctx.format) {
            Ok(path) => {
                let link = self.link(&path).to_string_lossy();
                Ok(FilterAction::Replace(embed(self.kind, &link, ctx.format)))
            }
            Err(e) => {
                let message = format!("{} diagram left as code: {e}", self.kind.tag());
                tracing::warn!("{message}");
                self.warnings.push(message);
                Ok(FilterAction::Unchanged)
            }
        }
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
