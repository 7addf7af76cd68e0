//! Relative URI rewriting for included content.
//!
//! An included file refers to its images and nested includes relative to its
//! own location. Rewriting prefixes those references with the file's
//! directory so they stay valid relative to the include root.

use mdweave_ast::{Node, walk_all_mut};

use crate::VIRTUAL_INCLUDE;
use crate::directive::IncludeDirective;

/// Directory prefix for references inside the file at `path`.
///
/// Always ends with `/`. A file at the top level (or at the filesystem root)
/// yields the neutral prefix `./`.
#[must_use]
pub fn base_dir(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => format!("{dir}/"),
        _ => "./".to_owned(),
    }
}

/// Whether `url` must be left alone.
#[must_use]
pub fn is_absolute(url: &str) -> bool {
    url.starts_with('/') || url.starts_with("data:") || url.contains("://")
}

/// Prefix a relative `url` with `base`.
#[must_use]
pub fn rewrite_url(url: &str, base: &str) -> String {
    if is_absolute(url) {
        return url.to_owned();
    }
    let mut relative = url;
    while let Some(rest) = relative.strip_prefix("./") {
        relative = rest;
    }
    format!("{base}{relative}")
}

/// Rewrite images and nested include paths across `nodes`, at any depth.
pub fn rewrite_uris(nodes: &mut [Node], base: &str) {
    walk_all_mut(nodes, &mut |node| match node {
        Node::Image { url, .. } => *url = rewrite_url(url, base),
        Node::CodeBlock(block) if block.has_tag(VIRTUAL_INCLUDE) => {
            let mut directive = IncludeDirective::parse(&block.text);
            directive.map_paths(|path| rewrite_url(path, base));
            block.text = directive.render();
        }
        _ => {}
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdweave_ast::Opaque;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_base_dir() {
        assert_eq!(base_dir("docs/sub/readme.md"), "docs/sub/");
        assert_eq!(base_dir("readme.md"), "./");
        assert_eq!(base_dir("/readme.md"), "./");
        assert_eq!(base_dir("./chapter.md"), "./");
    }

    #[test]
    fn test_rewrite_url() {
        assert_eq!(rewrite_url("foo.png", "docs/sub/"), "docs/sub/foo.png");
        assert_eq!(rewrite_url("./foo.png", "docs/sub/"), "docs/sub/foo.png");
        assert_eq!(rewrite_url("./foo.png", "./"), "./foo.png");
        assert_eq!(rewrite_url("../img/a.png", "docs/"), "docs/../img/a.png");
    }

    #[test]
    fn test_absolute_urls_are_kept() {
        for url in [
            "/srv/img.png",
            "https://example.com/a.png",
            "data:image/png;base64,AAAA",
        ] {
            assert_eq!(rewrite_url(url, "docs/"), url);
        }
    }

    #[test]
    fn test_rewrite_uris_reaches_nested_nodes() {
        let mut nodes = vec![
            Node::Paragraph(vec![Node::image("foo.png")]),
            Node::Other(Opaque {
                kind: "blockquote".to_owned(),
                text: String::new(),
                children: vec![Node::code_block(
                    ["mdinclude"],
                    "# more\nincrease_headers=true\nc.md\n",
                )],
            }),
            Node::code_block(["python"], "a.md"),
        ];

        rewrite_uris(&mut nodes, "docs/sub/");

        assert_eq!(
            nodes,
            vec![
                Node::Paragraph(vec![Node::image("docs/sub/foo.png")]),
                Node::Other(Opaque {
                    kind: "blockquote".to_owned(),
                    text: String::new(),
                    children: vec![Node::code_block(
                        ["mdinclude"],
                        "# more\nincrease_headers=true\ndocs/sub/c.md",
                    )],
                }),
                Node::code_block(["python"], "a.md"),
            ]
        );
    }
}
