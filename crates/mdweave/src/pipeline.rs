//! Parse, filter and collect diagnostics for one document.

use std::path::Path;

use mdweave_ast::{Document, DocumentParser, MarkdownParser, TargetFormat};
use mdweave_cache::{ArtifactCache, FileCache, NullCache};
use mdweave_config::Config;
use mdweave_diagrams::{CommandRenderer, DiagramFilter, RendererKind};
use mdweave_filter::{FilterChain, FilterError, HeaderSpacingFilter, ListingFilter, prepare};
use mdweave_include::{AggregateFilter, IncludeFilter, IncludeResolver};

/// The configured filter chain together with the markdown parser.
pub(crate) struct Pipeline {
    parser: MarkdownParser,
    chain: FilterChain,
}

impl Pipeline {
    /// Build the standard chain.
    ///
    /// Include paths resolve against `include_root`. Diagram artifacts go to
    /// the configured cache directory and are embedded relative to the
    /// working directory when they live under it.
    pub(crate) fn new(config: &Config, include_root: &Path) -> Self {
        let diagrams = &config.diagrams_resolved;
        let cache: Box<dyn ArtifactCache> = if diagrams.cache_enabled {
            Box::new(FileCache::new(&diagrams.cache_dir))
        } else {
            Box::new(NullCache::new(&diagrams.cache_dir))
        };

        let link_root = std::env::current_dir().unwrap_or_else(|_| diagrams.cache_dir.clone());

        let resolver = IncludeResolver::new(include_root).max_depth(config.include.max_depth);
        let mermaid = CommandRenderer::mermaid(diagrams.mermaid_bin.clone())
            .scale(diagrams.mermaid_scale)
            .timeout(diagrams.timeout);
        let plantuml = CommandRenderer::plantuml(&diagrams.plantuml_bin).timeout(diagrams.timeout);

        let diagram_tags = RendererKind::ALL.map(RendererKind::tag);
        let chain = FilterChain::new()
            .with_filter(IncludeFilter::new(resolver))
            .with_filter(AggregateFilter::new(include_root))
            .with_filter(
                DiagramFilter::new(RendererKind::FlowChart, cache.as_ref(), mermaid)
                    .link_root(&link_root),
            )
            .with_filter(
                DiagramFilter::new(RendererKind::Uml, cache.as_ref(), plantuml)
                    .link_root(&link_root),
            )
            .with_filter(ListingFilter::new().skip_tags(diagram_tags))
            .with_filter(HeaderSpacingFilter);

        Self {
            parser: MarkdownParser::new(),
            chain,
        }
    }

    /// Parse `source` and run the chain for `format`.
    pub(crate) fn run(
        &mut self,
        source: &str,
        format: TargetFormat,
    ) -> Result<Document, FilterError> {
        let mut doc = self.parser.parse(source).with_format(format);
        prepare(&mut doc);
        tracing::info!("running {} filters", self.chain.len());
        self.chain.run(&mut doc)?;
        Ok(doc)
    }

    /// Non-fatal diagnostics from every filter, in chain order.
    pub(crate) fn warnings(&self) -> impl Iterator<Item = &str> + '_ {
        self.chain.warnings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdweave_ast::{MetaValue, Node};
    use mdweave_include::IncludeError;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn config(cache: &Path) -> Config {
        let mut config = Config::default();
        config.diagrams_resolved.cache_dir = cache.to_path_buf();
        config.diagrams_resolved.mermaid_bin = "mdweave-test-missing-mmdc".to_owned();
        config.diagrams_resolved.plantuml_bin = "mdweave-test-missing-plantuml".to_owned();
        config
    }

    #[test]
    fn test_includes_and_aggregates_from_input_dir() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("part")).unwrap();
        fs::write(dir.path().join("part/intro.md"), "# Intro\n\n![x](img/x.png)\n").unwrap();
        fs::write(dir.path().join("snippet.rs"), "fn main() {}\n").unwrap();

        let source = concat!(
            "```{.mdinclude}\npart/intro.md\n```\n\n",
            "```{.rust .codeblock-include}\nsnippet.rs\n```\n",
        );
        let mut pipeline = Pipeline::new(&config(&dir.path().join("cache")), dir.path());
        let doc = pipeline.run(source, TargetFormat::Hypertext).unwrap();

        assert_eq!(doc.blocks.len(), 3);
        assert!(matches!(doc.blocks[0], Node::Header { level: 1, .. }));
        let Node::Paragraph(children) = &doc.blocks[1] else {
            panic!("expected paragraph");
        };
        assert!(matches!(&children[0], Node::Image { url, .. } if url == "part/img/x.png"));
        let block = doc.blocks[2].as_code_block().unwrap();
        assert_eq!(block.tags, vec!["rust".to_owned()]);
        assert_eq!(block.text, "fn main() {}\n");
        assert_eq!(pipeline.warnings().count(), 0);
    }

    #[test]
    fn test_renderer_failure_keeps_block_and_warns() {
        let dir = TempDir::new().unwrap();
        let source = "```mermaid\ngraph TD; A-->B\n```\n";
        let mut pipeline = Pipeline::new(&config(&dir.path().join("cache")), dir.path());
        let doc = pipeline.run(source, TargetFormat::Hypertext).unwrap();

        assert!(doc.blocks[0].is_code_block_tagged("mermaid"));
        let warnings: Vec<_> = pipeline.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("mermaid diagram left as code"));
    }

    #[test]
    fn test_paper_target_gets_preamble_and_listings() {
        let dir = TempDir::new().unwrap();
        let source = "#### Detail\n\n```python\nprint(1)\n```\n";
        let mut pipeline = Pipeline::new(&config(&dir.path().join("cache")), dir.path());
        let doc = pipeline.run(source, TargetFormat::Paper).unwrap();

        assert!(matches!(
            doc.metadata.get("header-includes"),
            Some(MetaValue::Blocks(_))
        ));
        assert!(matches!(doc.blocks[0], Node::Header { level: 4, .. }));
        assert_eq!(doc.blocks[1], Node::raw("latex", r"\vspace{5pt}"));
        let Node::RawBlock { text, .. } = &doc.blocks[2] else {
            panic!("expected listing");
        };
        assert!(text.contains("[language=python]"));
    }

    #[test]
    fn test_include_cycle_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("loop.md"), "```mdinclude\nloop.md\n```\n").unwrap();

        let mut config = config(&dir.path().join("cache"));
        config.include.max_depth = 5;
        let mut pipeline = Pipeline::new(&config, dir.path());
        let err = pipeline
            .run("```mdinclude\nloop.md\n```\n", TargetFormat::Generic)
            .unwrap_err();

        assert_eq!(err.filter(), "include");
        assert!(err.inner().downcast_ref::<IncludeError>().is_some());
    }
}
