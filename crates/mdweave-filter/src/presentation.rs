//! Paper-target presentation filters.
//!
//! Cosmetic transformations applied only when the document is prepared for
//! LaTeX/PDF output: the preamble injected into `header-includes`, verbatim
//! code listings and extra spacing after level-4 headers.

use mdweave_ast::{Document, MetaValue, Node};

use crate::filter::{Context, Filter, FilterAction, FilterError};

/// Raw block format used for every paper-target block.
pub const LATEX: &str = "latex";

/// Metadata key receiving the preamble blocks.
pub const HEADER_INCLUDES: &str = "header-includes";

/// Languages the listings package is told about; others render unhighlighted.
const LISTING_LANGUAGES: &[&str] = &[
    "python",
    "java",
    "c",
    "cpp",
    "javascript",
    "bash",
    "html",
    "xml",
    "sql",
    "json",
    "yaml",
    "go",
    "ruby",
    "perl",
    "text",
];

const PACKAGES: &[&str] = &[
    r"\usepackage[utf8]{inputenc}",
    r"\usepackage[T1]{fontenc}",
    r"\usepackage{textcomp}",
    r"\usepackage{graphicx}",
    r"\usepackage{caption}",
    r"\usepackage{float}",
    r"\usepackage{listings}",
    r"\usepackage{capt-of}",
    r"\usepackage{xcolor}",
    r"\usepackage[a4paper, top=3cm, bottom=3cm, left=2.5cm, right=2.5cm]{geometry}",
];

const LISTING_STYLE: &str = r#"
% Define custom colors
\definecolor{background}{RGB}{250, 251, 254}
\definecolor{keyword}{RGB}{0, 0, 255}
\definecolor{identifier}{RGB}{0, 0, 0}
\definecolor{comment}{RGB}{58, 127, 179}
\definecolor{string}{RGB}{163, 21, 21}
\definecolor{border}{RGB}{230, 230, 230}

\lstset{
    basicstyle=\ttfamily\small\color{identifier},
    keywordstyle=\color{keyword},
    commentstyle=\itshape\color{comment},
    stringstyle=\color{string},
    showstringspaces=false,
    breaklines=true,
    frame=single,
    framerule=0.1pt,
    rulecolor=\color{border},
    backgroundcolor=\color{background},
    numbers=none,
    numberstyle=\tiny\color{gray},
    stepnumber=1,
    tabsize=4,
    aboveskip=10pt,
    belowskip=10pt,
    framexleftmargin=5pt,
    framexrightmargin=5pt,
    framexbottommargin=4pt,
    framextopmargin=4pt,
    frameround=tttt,
    abovecaptionskip=25pt,
    captionpos=t,
    floatplacement=t,
    float=t,
    literate={á}{{\'a}}1 {é}{{\'e}}1 {í}{{\'i}}1 {ó}{{\'o}}1 {ú}{{\'u}}1
             {Á}{{\'A}}1 {É}{{\'E}}1 {Í}{{\'I}}1 {Ó}{{\'O}}1 {Ú}{{\'U}}1
             {ñ}{{\~n}}1 {Ñ}{{\~N}}1 {ü}{{\"u}}1 {Ü}{{\"U}}1
}
"#;

/// Preamble blocks for paper targets.
#[must_use]
pub fn paper_preamble() -> Vec<Node> {
    PACKAGES
        .iter()
        .copied()
        .chain(std::iter::once(LISTING_STYLE))
        .map(|line| Node::raw(LATEX, line))
        .collect()
}

/// Prepare document metadata before the filter chain runs.
///
/// For paper targets, replaces `header-includes` with [`paper_preamble`].
/// Other targets are left untouched.
pub fn prepare(doc: &mut Document) {
    if doc.format.is_paper() {
        doc.metadata.insert(
            HEADER_INCLUDES.to_owned(),
            MetaValue::Blocks(paper_preamble()),
        );
    }
}

/// Renders code blocks as `lstlisting` environments for paper targets.
#[derive(Debug, Default)]
pub struct ListingFilter {
    skip_tags: Vec<String>,
}

impl ListingFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave code blocks carrying any of these tags alone.
    #[must_use]
    pub fn skip_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

impl Filter for ListingFilter {
    fn name(&self) -> &'static str {
        "listings"
    }

    fn apply(&mut self, node: &mut Node, ctx: &Context<'_>) -> Result<FilterAction, FilterError> {
        if !ctx.format.is_paper() {
            return Ok(FilterAction::Unchanged);
        }
        let Node::CodeBlock(block) = node else {
            return Ok(FilterAction::Unchanged);
        };
        if self.skip_tags.iter().any(|tag| block.has_tag(tag)) {
            return Ok(FilterAction::Unchanged);
        }

        let language = block.language().unwrap_or("text");
        let option = if LISTING_LANGUAGES.contains(&language) {
            format!("[language={language}]")
        } else {
            String::new()
        };
        let latex = format!(
            "\\vspace{{5pt}}\n\\noindent\n\\begin{{lstlisting}}{option}\n{}\n\\end{{lstlisting}}",
            block.text.trim_end_matches('\n')
        );
        Ok(FilterAction::Replace(Node::raw(LATEX, latex)))
    }
}

/// Adds vertical space after level-4 headers for paper targets.
#[derive(Debug, Default)]
pub struct HeaderSpacingFilter;

impl Filter for HeaderSpacingFilter {
    fn name(&self) -> &'static str {
        "header-spacing"
    }

    fn apply(&mut self, node: &mut Node, ctx: &Context<'_>) -> Result<FilterAction, FilterError> {
        match node {
            Node::Header { level: 4, .. } if ctx.format.is_paper() => Ok(
                FilterAction::InsertAfter(vec![Node::raw(LATEX, r"\vspace{5pt}")]),
            ),
            _ => Ok(FilterAction::Unchanged),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FilterChain;
    use mdweave_ast::{Metadata, TargetFormat};
    use pretty_assertions::assert_eq;

    fn doc(format: TargetFormat, blocks: Vec<Node>) -> Document {
        Document::new(format, Metadata::new(), blocks)
    }

    #[test]
    fn test_prepare_injects_preamble_for_paper() {
        let mut paper = doc(TargetFormat::Paper, Vec::new());
        prepare(&mut paper);

        let Some(MetaValue::Blocks(blocks)) = paper.metadata.get(HEADER_INCLUDES) else {
            panic!("header-includes missing");
        };
        assert_eq!(blocks.len(), PACKAGES.len() + 1);
        assert_eq!(blocks[0], Node::raw(LATEX, r"\usepackage[utf8]{inputenc}"));
    }

    #[test]
    fn test_prepare_leaves_other_targets_alone() {
        let mut html = doc(TargetFormat::Hypertext, Vec::new());
        prepare(&mut html);
        assert!(html.metadata.is_empty());
    }

    #[test]
    fn test_listing_filter_known_language() {
        let mut paper = doc(
            TargetFormat::Paper,
            vec![Node::code_block(["python"], "print(1)\n")],
        );
        FilterChain::new()
            .with_filter(ListingFilter::new())
            .run(&mut paper)
            .unwrap();

        assert_eq!(
            paper.blocks,
            vec![Node::raw(
                LATEX,
                "\\vspace{5pt}\n\\noindent\n\\begin{lstlisting}[language=python]\nprint(1)\n\\end{lstlisting}"
            )]
        );
    }

    #[test]
    fn test_listing_filter_unknown_language_has_no_option() {
        let mut paper = doc(TargetFormat::Paper, vec![Node::code_block(["haskell"], "x")]);
        FilterChain::new()
            .with_filter(ListingFilter::new())
            .run(&mut paper)
            .unwrap();

        let Node::RawBlock { text, .. } = &paper.blocks[0] else {
            panic!("expected raw block");
        };
        assert!(text.contains("\\begin{lstlisting}\nx\n"));
    }

    #[test]
    fn test_listing_filter_skips_tagged_and_non_paper() {
        let blocks = vec![
            Node::code_block(["mermaid"], "graph TD"),
            Node::code_block(["rust"], "fn main() {}"),
        ];
        let mut paper = doc(TargetFormat::Paper, blocks.clone());
        FilterChain::new()
            .with_filter(ListingFilter::new().skip_tags(["mermaid"]))
            .run(&mut paper)
            .unwrap();
        assert_eq!(paper.blocks[0], blocks[0]);
        assert!(matches!(paper.blocks[1], Node::RawBlock { .. }));

        let mut html = doc(TargetFormat::Hypertext, blocks.clone());
        FilterChain::new()
            .with_filter(ListingFilter::new())
            .run(&mut html)
            .unwrap();
        assert_eq!(html.blocks, blocks);
    }

    #[test]
    fn test_header_spacing_only_level_four() {
        let mut paper = doc(
            TargetFormat::Paper,
            vec![Node::header(3, Vec::new()), Node::header(4, Vec::new())],
        );
        FilterChain::new()
            .with_filter(HeaderSpacingFilter)
            .run(&mut paper)
            .unwrap();

        assert_eq!(
            paper.blocks,
            vec![
                Node::header(3, Vec::new()),
                Node::header(4, Vec::new()),
                Node::raw(LATEX, r"\vspace{5pt}"),
            ]
        );
    }
}
