//! Embedding nodes for rendered artifacts.

use mdweave_ast::{Node, TargetFormat};

use crate::kind::RendererKind;

/// Node referencing the artifact at `path`.
///
/// Paper targets get a LaTeX figure pinned in place with `[H]` at full text
/// width; other targets get a paragraph holding an image.
#[must_use]
pub fn embed(kind: RendererKind, path: &str, target: TargetFormat) -> Node {
    if target.is_paper() {
        let latex = format!(
            "\\noindent\n\\begin{{figure}}[H]\n    \\centering\n    \\includegraphics[width=\\textwidth]{{{path}}}\n    \\caption{{{}}}\n\\end{{figure}}",
            kind.caption()
        );
        Node::raw("latex", latex)
    } else {
        Node::Paragraph(vec![Node::image(path)])
    }
}
