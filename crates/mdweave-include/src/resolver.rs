//! Recursive virtual include resolution.

use std::fs;
use std::path::PathBuf;

use mdweave_ast::{DocumentParser, MAX_HEADER_LEVEL, MarkdownParser, Node, walk_all_mut};
use mdweave_filter::{Context, Filter, FilterAction, FilterError};

use crate::VIRTUAL_INCLUDE;
use crate::directive::IncludeDirective;
use crate::error::IncludeError;
use crate::uri::{base_dir, rewrite_uris};

/// Default bound on include nesting.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Expands include directives into the parsed content of the listed files.
///
/// Paths are resolved against the include root. Each included file's
/// images and nested include paths are rewritten relative to that root when
/// the file is loaded, so expansion at any nesting level reads the right
/// files.
pub struct IncludeResolver<P = MarkdownParser> {
    root: PathBuf,
    parser: P,
    max_depth: usize,
    warnings: Vec<String>,
}

impl IncludeResolver<MarkdownParser> {
    /// Resolver rooted at `root` using the markdown parser.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_parser(root, MarkdownParser::new())
    }
}

impl<P: DocumentParser> IncludeResolver<P> {
    /// Resolver rooted at `root` parsing included files with `parser`.
    #[must_use]
    pub fn with_parser(root: impl Into<PathBuf>, parser: P) -> Self {
        Self {
            root: root.into(),
            parser,
            max_depth: DEFAULT_MAX_DEPTH,
            warnings: Vec::new(),
        }
    }

    /// Set the nesting bound. Values below 1 are raised to 1.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    /// Files that could not be read, with the cause.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Expand directive text into a flat node sequence with no include
    /// directives left in it.
    pub fn resolve(&mut self, directive: &str) -> Result<Vec<Node>, IncludeError> {
        self.expand(&IncludeDirective::parse(directive), 0)
    }

    fn expand(
        &mut self,
        directive: &IncludeDirective,
        depth: usize,
    ) -> Result<Vec<Node>, IncludeError> {
        if depth >= self.max_depth {
            return Err(IncludeError::CyclicInclude {
                depth: self.max_depth,
                files: directive.paths().map(str::to_owned).collect(),
            });
        }

        let promote = directive.increase_headers();
        let mut nodes = Vec::new();
        for path in directive.paths() {
            let Some(mut loaded) = self.load(path) else {
                continue;
            };
            if promote {
                promote_headers(&mut loaded);
            }
            nodes.extend(loaded);
        }

        self.expand_nested(nodes, depth + 1)
    }

    /// Replace every include directive in `nodes`, at any depth.
    fn expand_nested(
        &mut self,
        nodes: Vec<Node>,
        depth: usize,
    ) -> Result<Vec<Node>, IncludeError> {
        let mut out = Vec::with_capacity(nodes.len());
        for mut node in nodes {
            if let Node::CodeBlock(block) = &node
                && block.has_tag(VIRTUAL_INCLUDE)
            {
                let directive = IncludeDirective::parse(&block.text);
                out.extend(self.expand(&directive, depth)?);
                continue;
            }
            if let Some(children) = node.children_mut() {
                let taken = std::mem::take(children);
                *children = self.expand_nested(taken, depth)?;
            }
            out.push(node);
        }
        Ok(out)
    }

    /// Read and parse one file, rewriting its references. `None` if unreadable.
    fn load(&mut self, path: &str) -> Option<Vec<Node>> {
        let full = self.root.join(path);
        match fs::read_to_string(&full) {
            Ok(text) => {
                tracing::debug!("including {}", full.display());
                let mut nodes = self.parser.parse(&text).blocks;
                rewrite_uris(&mut nodes, &base_dir(path));
                Some(nodes)
            }
            Err(e) => {
                let message = format!("skipping include {}: {e}", full.display());
                tracing::warn!("{message}");
                self.warnings.push(message);
                None
            }
        }
    }
}

/// Raise every header one level, saturating at the deepest level.
fn promote_headers(nodes: &mut [Node]) {
    walk_all_mut(nodes, &mut |node| {
        if let Node::Header { level, .. } = node {
            *level = level.saturating_add(1).min(MAX_HEADER_LEVEL);
        }
    });
}

/// Filter expanding `mdinclude` code blocks.
pub struct IncludeFilter<P = MarkdownParser> {
    resolver: IncludeResolver<P>,
}

impl<P: DocumentParser> IncludeFilter<P> {
    #[must_use]
    pub fn new(resolver: IncludeResolver<P>) -> Self {
        Self { resolver }
    }
}

impl<P: DocumentParser> Filter for IncludeFilter<P> {
    fn name(&self) -> &'static str {
        "include"
    }

    fn apply(&mut self, node: &mut Node, _ctx: &Context<'_>) -> Result<FilterAction, FilterError> {
        let Some(block) = node.as_code_block().filter(|b| b.has_tag(VIRTUAL_INCLUDE)) else {
            return Ok(FilterAction::Unchanged);
        };
        let nodes = self
            .resolver
            .resolve(&block.text)
            .map_err(|e| FilterError::new("include", e))?;
        Ok(FilterAction::Splice(nodes))
    }

    fn warnings(&self) -> &[String] {
        self.resolver.warnings()
    }
}
