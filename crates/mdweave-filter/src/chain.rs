//! Filter chain executor.

use mdweave_ast::{Document, Node};

use crate::filter::{Context, Filter, FilterAction, FilterError};

/// Ordered list of filters applied to a [`Document`].
///
/// Each filter walks the entire tree, pre-order, before the next filter
/// starts. Replacement and spliced nodes are re-offered to the filter that
/// produced them, so a filter whose output may contain further work of its
/// own kind sees that work in the same pass.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter.
    #[must_use]
    pub fn with_filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Number of registered filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether no filter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply every filter to the document, in registration order.
    ///
    /// Stops at the first fatal error. Side effects of filters that already
    /// ran (files written, processes invoked) are not rolled back.
    pub fn run(&mut self, doc: &mut Document) -> Result<(), FilterError> {
        let mut blocks = std::mem::take(&mut doc.blocks);
        let ctx = Context {
            format: doc.format,
            metadata: &doc.metadata,
        };

        let mut result = Ok(());
        for filter in &mut self.filters {
            tracing::debug!("applying filter {}", filter.name());
            result = apply_to_sequence(filter.as_mut(), &mut blocks, &ctx);
            if result.is_err() {
                break;
            }
        }

        doc.blocks = blocks;
        result
    }

    /// Warnings from all filters, in chain order.
    pub fn warnings(&self) -> impl Iterator<Item = &str> + '_ {
        self.filters
            .iter()
            .flat_map(|f| f.warnings())
            .map(String::as_str)
    }
}

/// Apply one filter across a node sequence and, recursively, all descendants.
pub fn apply_to_sequence(
    filter: &mut dyn Filter,
    nodes: &mut Vec<Node>,
    ctx: &Context<'_>,
) -> Result<(), FilterError> {
    let mut index = 0;
    while index < nodes.len() {
        match filter.apply(&mut nodes[index], ctx)? {
            FilterAction::Unchanged => {
                descend(filter, &mut nodes[index], ctx)?;
                index += 1;
            }
            FilterAction::Replace(node) => {
                // Re-offer at the same position.
                nodes[index] = node;
            }
            FilterAction::Splice(replacement) => {
                // Re-offer from the first spliced node; an empty splice
                // shifts the next sibling into this position.
                nodes.splice(index..=index, replacement);
            }
            FilterAction::InsertAfter(extra) => {
                descend(filter, &mut nodes[index], ctx)?;
                index += 1;
                nodes.splice(index..index, extra);
            }
        }
    }
    Ok(())
}

fn descend(filter: &mut dyn Filter, node: &mut Node, ctx: &Context<'_>) -> Result<(), FilterError> {
    match node.children_mut() {
        Some(children) => apply_to_sequence(filter, children, ctx),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdweave_ast::{Metadata, Opaque, TargetFormat};
    use pretty_assertions::assert_eq;

    /// Replaces `expand` code blocks with their text split into paragraphs,
    /// where a line `expand` produces another `expand` block.
    struct Expand;

    impl Filter for Expand {
        fn name(&self) -> &'static str {
            "expand"
        }

        fn apply(&mut self, node: &mut Node, _ctx: &Context<'_>) -> Result<FilterAction, FilterError> {
            let Some(block) = node.as_code_block().filter(|b| b.has_tag("expand")) else {
                return Ok(FilterAction::Unchanged);
            };
            let nodes = block
                .text
                .lines()
                .map(|line| match line.strip_prefix("expand ") {
                    Some(rest) => Node::code_block(["expand"], rest.replace(',', "\n")),
                    None => Node::Paragraph(vec![Node::text(line)]),
                })
                .collect();
            Ok(FilterAction::Splice(nodes))
        }
    }

    /// Records the kind of every node it sees.
    struct Recorder {
        seen: Vec<String>,
    }

    impl Filter for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn apply(&mut self, node: &mut Node, _ctx: &Context<'_>) -> Result<FilterAction, FilterError> {
            let label = match node {
                Node::Header { level, .. } => format!("h{level}"),
                Node::Paragraph(_) => "p".to_owned(),
                Node::CodeBlock(_) => "code".to_owned(),
                Node::Image { url, .. } => format!("img:{url}"),
                Node::RawBlock { .. } => "raw".to_owned(),
                Node::Other(opaque) => opaque.kind.clone(),
            };
            self.seen.push(label);
            Ok(FilterAction::Unchanged)
        }
    }

    struct Fails;

    impl Filter for Fails {
        fn name(&self) -> &'static str {
            "fails"
        }

        fn apply(&mut self, node: &mut Node, _ctx: &Context<'_>) -> Result<FilterAction, FilterError> {
            if matches!(node, Node::RawBlock { .. }) {
                return Err(FilterError::new("fails", "raw blocks are not allowed"));
            }
            Ok(FilterAction::Unchanged)
        }
    }

    fn ctx(metadata: &Metadata) -> Context<'_> {
        Context {
            format: TargetFormat::Generic,
            metadata,
        }
    }

    #[test]
    fn test_splice_output_is_reoffered() {
        let metadata = Metadata::new();
        let mut nodes = vec![
            Node::text("before"),
            Node::code_block(["expand"], "one\nexpand two,three\nfour"),
            Node::text("after"),
        ];

        let mut filter = Expand;
        apply_to_sequence(&mut filter, &mut nodes, &ctx(&metadata)).unwrap();

        let para = |s: &str| Node::Paragraph(vec![Node::text(s)]);
        assert_eq!(
            nodes,
            vec![
                Node::text("before"),
                para("one"),
                para("two"),
                para("three"),
                para("four"),
                Node::text("after"),
            ]
        );
    }

    #[test]
    fn test_empty_splice_deletes_node() {
        let metadata = Metadata::new();
        let mut nodes = vec![
            Node::code_block(["expand"], ""),
            Node::code_block(["expand"], ""),
            Node::text("kept"),
        ];

        let mut filter = Expand;
        apply_to_sequence(&mut filter, &mut nodes, &ctx(&metadata)).unwrap();

        assert_eq!(nodes, vec![Node::text("kept")]);
    }

    #[test]
    fn test_traversal_is_pre_order() {
        let metadata = Metadata::new();
        let mut nodes = vec![
            Node::header(1, vec![Node::text("t")]),
            Node::Other(Opaque {
                kind: "blockquote".to_owned(),
                text: String::new(),
                children: vec![Node::Paragraph(vec![Node::image("a.png")])],
            }),
            Node::raw("latex", "x"),
        ];

        let mut filter = Recorder { seen: Vec::new() };
        apply_to_sequence(&mut filter, &mut nodes, &ctx(&metadata)).unwrap();

        assert_eq!(
            filter.seen,
            vec!["h1", "text", "blockquote", "p", "img:a.png", "raw"]
        );
    }

    #[test]
    fn test_insert_after_keeps_node_and_offers_inserted() {
        struct AfterHeader {
            seen: usize,
        }

        impl Filter for AfterHeader {
            fn name(&self) -> &'static str {
                "after-header"
            }

            fn apply(
                &mut self,
                node: &mut Node,
                _ctx: &Context<'_>,
            ) -> Result<FilterAction, FilterError> {
                self.seen += 1;
                match node {
                    Node::Header { .. } => {
                        Ok(FilterAction::InsertAfter(vec![Node::raw("latex", "gap")]))
                    }
                    _ => Ok(FilterAction::Unchanged),
                }
            }
        }

        let metadata = Metadata::new();
        let mut nodes = vec![Node::header(4, Vec::new()), Node::text("body")];
        let mut filter = AfterHeader { seen: 0 };
        apply_to_sequence(&mut filter, &mut nodes, &ctx(&metadata)).unwrap();

        assert_eq!(
            nodes,
            vec![
                Node::header(4, Vec::new()),
                Node::raw("latex", "gap"),
                Node::text("body"),
            ]
        );
        // header, inserted raw block, body
        assert_eq!(filter.seen, 3);
    }

    #[test]
    fn test_chain_runs_filters_in_order() {
        let mut doc = Document::new(
            TargetFormat::Generic,
            Metadata::new(),
            vec![Node::code_block(["expand"], "expand a")],
        );

        let mut chain = FilterChain::new()
            .with_filter(Expand)
            .with_filter(Expand);
        chain.run(&mut doc).unwrap();

        assert_eq!(doc.blocks, vec![Node::Paragraph(vec![Node::text("a")])]);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_chain_stops_on_fatal_error_and_keeps_tree() {
        let mut doc = Document::new(
            TargetFormat::Generic,
            Metadata::new(),
            vec![Node::text("a"), Node::raw("html", "<br>")],
        );

        let mut chain = FilterChain::new().with_filter(Fails);
        let err = chain.run(&mut doc).unwrap_err();

        assert_eq!(err.filter(), "fails");
        assert!(err.to_string().contains("raw blocks are not allowed"));
        assert_eq!(doc.blocks.len(), 2);
    }

    #[test]
    fn test_empty_chain_is_noop() {
        let mut doc = Document::default();
        let mut chain = FilterChain::new();
        assert!(chain.is_empty());
        chain.run(&mut doc).unwrap();
        assert_eq!(chain.warnings().count(), 0);
    }
}
